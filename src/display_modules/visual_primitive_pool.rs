use crate::display_modules::render_engine::{PrimitiveGeometry, PrimitiveHandle, PrimitiveStyle, RenderEngine, VisualPrimitiveKind};
use crate::utils::utils_console::trajviz_print_warning;
use crate::utils::utils_errors::TrajvizError;

/// A variable-length collection of same-kind primitives living in a render engine.
///
/// The pool exclusively owns its handles.  `resize`, `assign`, `update`, `restyle` and `clear` are the only
/// calls in the crate that create or destroy render engine resources.  A pool must be cleared
/// before it is dropped; a non-empty pool that is dropped leaks its primitives and says so.
#[derive(Debug)]
pub struct VisualPrimitivePool {
    kind: VisualPrimitiveKind,
    default_style: PrimitiveStyle,
    handles: Vec<PrimitiveHandle>
}
impl VisualPrimitivePool {
    pub fn new(kind: VisualPrimitiveKind, default_style: PrimitiveStyle) -> Self {
        Self {
            kind,
            default_style,
            handles: vec![]
        }
    }
    pub fn kind(&self) -> VisualPrimitiveKind {
        self.kind
    }
    pub fn len(&self) -> usize {
        self.handles.len()
    }
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
    pub fn handles(&self) -> &Vec<PrimitiveHandle> {
        &self.handles
    }
    pub fn default_style(&self) -> &PrimitiveStyle {
        &self.default_style
    }
    pub fn set_default_style(&mut self, default_style: PrimitiveStyle) {
        self.default_style = default_style;
    }
    /// Grows the pool with default-styled primitives or destroys trailing primitives until it
    /// holds `n`.  If the engine refuses a creation the pool keeps what it managed to create and
    /// the error is returned.
    pub fn resize(&mut self, n: usize, render_engine: &mut dyn RenderEngine) -> Result<(), TrajvizError> {
        while self.handles.len() > n {
            if let Some(handle) = self.handles.pop() {
                render_engine.destroy_primitive(handle);
            }
        }
        while self.handles.len() < n {
            let handle = render_engine.create_primitive(self.kind, &self.default_style)?;
            self.handles.push(handle);
        }
        Ok(())
    }
    pub fn update(&mut self, i: usize, geometry: &PrimitiveGeometry, style: &PrimitiveStyle, render_engine: &mut dyn RenderEngine) -> Result<(), TrajvizError> {
        TrajvizError::new_check_for_idx_out_of_bound_error(i, self.handles.len(), file!(), line!())?;
        if geometry.kind() != self.kind {
            return Err(TrajvizError::new_unsupported_operation_error("VisualPrimitivePool::update", &format!("Cannot place a {:?} into a pool of {:?}.", geometry.kind(), self.kind), file!(), line!()));
        }

        let handle = self.handles[i];
        render_engine.set_primitive_geometry(handle, geometry)?;
        render_engine.set_primitive_style(handle, style)?;
        Ok(())
    }
    /// Applies `style` to every element without touching geometry.  The style also becomes the
    /// default for primitives created later.
    pub fn restyle(&mut self, style: &PrimitiveStyle, render_engine: &mut dyn RenderEngine) -> Result<(), TrajvizError> {
        self.default_style = style.clone();
        for handle in &self.handles {
            render_engine.set_primitive_style(*handle, style)?;
        }
        Ok(())
    }
    /// Resizes to `geometries.len()` and places every geometry with `style`.
    ///
    /// Missing primitives are created before any live one is touched, so when the engine refuses
    /// a creation the pool keeps its previous contents and nothing new leaks.  If the engine
    /// fails later, while live primitives are being updated, the pool is cleared so it never
    /// holds a partially placed sequence.
    pub fn assign(&mut self, geometries: &[PrimitiveGeometry], style: &PrimitiveStyle, render_engine: &mut dyn RenderEngine) -> Result<(), TrajvizError> {
        if let Some(g) = geometries.iter().find(|g| g.kind() != self.kind) {
            return Err(TrajvizError::new_unsupported_operation_error("VisualPrimitivePool::assign", &format!("Cannot place a {:?} into a pool of {:?}.", g.kind(), self.kind), file!(), line!()));
        }

        let mut staged = vec![];
        while self.handles.len() + staged.len() < geometries.len() {
            match render_engine.create_primitive(self.kind, style) {
                Ok(handle) => { staged.push(handle); }
                Err(e) => {
                    for handle in staged { render_engine.destroy_primitive(handle); }
                    return Err(e);
                }
            }
        }
        self.handles.extend(staged);
        self.default_style = style.clone();

        for (i, geometry) in geometries.iter().enumerate() {
            if let Err(e) = self.update(i, geometry, style, render_engine) {
                self.clear(render_engine);
                return Err(e);
            }
        }
        self.resize(geometries.len(), render_engine)
    }
    pub fn clear(&mut self, render_engine: &mut dyn RenderEngine) {
        for handle in self.handles.drain(..) {
            render_engine.destroy_primitive(handle);
        }
    }
}
impl Drop for VisualPrimitivePool {
    fn drop(&mut self) {
        if !self.handles.is_empty() {
            trajviz_print_warning(&format!("WARNING: {:?} pool dropped while holding {} primitives.", self.kind, self.handles.len()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use crate::display_modules::recording_render_engine::RecordingRenderEngine;
    use crate::display_modules::render_engine::ColorRGBA;

    fn point(x: f64) -> PrimitiveGeometry {
        PrimitiveGeometry::Point { position: Vector3::new(x, 0.0, 0.0) }
    }

    #[test]
    fn resize_grows_and_shrinks_without_leaking() {
        let mut engine = RecordingRenderEngine::new();
        let mut pool = VisualPrimitivePool::new(VisualPrimitiveKind::Point, PrimitiveStyle::default());
        pool.resize(5, &mut engine).unwrap();
        assert_eq!(pool.len(), 5);
        assert_eq!(engine.live_primitive_count(), 5);

        let kept = pool.handles()[..2].to_vec();
        pool.resize(2, &mut engine).unwrap();
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.handles(), &kept);
        assert_eq!(engine.live_primitive_count(), 2);
        assert_eq!(engine.num_destroyed(), 3);

        pool.clear(&mut engine);
        assert!(pool.is_empty());
        assert_eq!(engine.live_primitive_count(), 0);
    }

    #[test]
    fn update_past_the_end_is_index_error() {
        let mut engine = RecordingRenderEngine::new();
        let mut pool = VisualPrimitivePool::new(VisualPrimitiveKind::Point, PrimitiveStyle::default());
        pool.resize(1, &mut engine).unwrap();
        let err = pool.update(1, &point(0.0), &PrimitiveStyle::default(), &mut engine).unwrap_err();
        assert!(matches!(err, TrajvizError::IdxOutOfBoundError(_)));
        pool.clear(&mut engine);
    }

    #[test]
    fn update_with_wrong_kind_is_rejected() {
        let mut engine = RecordingRenderEngine::new();
        let mut pool = VisualPrimitivePool::new(VisualPrimitiveKind::Line, PrimitiveStyle::default());
        pool.resize(1, &mut engine).unwrap();
        let err = pool.update(0, &point(0.0), &PrimitiveStyle::default(), &mut engine).unwrap_err();
        assert!(matches!(err, TrajvizError::UnsupportedOperationError(_)));
        pool.clear(&mut engine);
    }

    #[test]
    fn restyle_keeps_length_and_geometry() {
        let mut engine = RecordingRenderEngine::new();
        let mut pool = VisualPrimitivePool::new(VisualPrimitiveKind::Point, PrimitiveStyle::default());
        pool.assign(&[point(0.0), point(1.0)], &PrimitiveStyle::default(), &mut engine).unwrap();

        let red = PrimitiveStyle::new(ColorRGBA::new(1.0, 0.0, 0.0, 0.5), 0.1);
        pool.restyle(&red, &mut engine).unwrap();
        assert_eq!(pool.len(), 2);
        let recorded = engine.get_primitive(pool.handles()[1]).unwrap();
        assert_eq!(recorded.style(), &red);
        assert_eq!(recorded.geometry(), Some(&point(1.0)));
        pool.clear(&mut engine);
    }

    #[test]
    fn refused_growth_keeps_previous_contents() {
        let mut engine = RecordingRenderEngine::new_with_capacity(3);
        let mut pool = VisualPrimitivePool::new(VisualPrimitiveKind::Point, PrimitiveStyle::default());
        pool.assign(&[point(0.0), point(1.0)], &PrimitiveStyle::default(), &mut engine).unwrap();
        let handles_before = pool.handles().clone();

        let red = PrimitiveStyle::new(ColorRGBA::new(1.0, 0.0, 0.0, 1.0), 0.1);
        let err = pool.assign(&[point(5.0), point(6.0), point(7.0), point(8.0)], &red, &mut engine).unwrap_err();
        assert!(matches!(err, TrajvizError::RenderEngineError(_)));
        assert_eq!(pool.handles(), &handles_before);
        assert_eq!(engine.live_primitive_count(), 2);
        let recorded = engine.get_primitive(handles_before[1]).unwrap();
        assert_eq!(recorded.geometry(), Some(&point(1.0)));
        assert_eq!(recorded.style(), &PrimitiveStyle::default());
        pool.clear(&mut engine);
    }

    #[test]
    fn assign_shrinks_to_the_new_length() {
        let mut engine = RecordingRenderEngine::new();
        let mut pool = VisualPrimitivePool::new(VisualPrimitiveKind::Point, PrimitiveStyle::default());
        pool.assign(&[point(0.0), point(1.0), point(2.0)], &PrimitiveStyle::default(), &mut engine).unwrap();
        pool.assign(&[point(4.0)], &PrimitiveStyle::default(), &mut engine).unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(engine.live_primitive_count(), 1);
        assert_eq!(engine.get_primitive(pool.handles()[0]).unwrap().geometry(), Some(&point(4.0)));
        pool.clear(&mut engine);
    }

    #[test]
    fn assign_with_wrong_kind_touches_nothing() {
        let mut engine = RecordingRenderEngine::new();
        let mut pool = VisualPrimitivePool::new(VisualPrimitiveKind::Point, PrimitiveStyle::default());
        pool.assign(&[point(0.0)], &PrimitiveStyle::default(), &mut engine).unwrap();
        let line = PrimitiveGeometry::Line { start: Vector3::zeros(), end: Vector3::x() };
        let err = pool.assign(&[point(1.0), line], &PrimitiveStyle::default(), &mut engine).unwrap_err();
        assert!(matches!(err, TrajvizError::UnsupportedOperationError(_)));
        assert_eq!(engine.get_primitive(pool.handles()[0]).unwrap().geometry(), Some(&point(0.0)));
        pool.clear(&mut engine);
    }
}
