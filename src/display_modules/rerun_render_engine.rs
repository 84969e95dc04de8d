use std::collections::HashMap;
use nalgebra::Vector3;
use rerun::{RecordingStream, RecordingStreamBuilder};
use crate::display_modules::render_engine::{ArrowGeometry, PrimitiveGeometry, PrimitiveHandle, PrimitiveStyle, RenderEngine, RobotSkeleton, RobotSkeletonGeometry, RobotVisualStyle, VisualPrimitiveKind};
use crate::robot_modules::robot_kinematics_module::RobotFKResult;
use crate::robot_modules::robot_model_module::RobotModelModule;
use crate::utils::utils_console::trajviz_print_warning;
use crate::utils::utils_errors::TrajvizError;

const PRIMITIVE_ROOT: &str = "world/trajviz/primitives";
const ROBOT_ROOT: &str = "world/trajviz/robot";

/// A render engine that logs every primitive to a Rerun recording stream.
///
/// Each primitive is its own entity, so destroying it only clears that entity.  The robot visual
/// is drawn as a skeleton: one point per link origin, a segment from every link to its parent and
/// markers at the visual or collision element origins, depending on which of the two is enabled.
/// The last link poses are kept so a style change redraws the robot right away.
pub struct RerunRenderEngine {
    rec: RecordingStream,
    next_handle: u64,
    primitives: HashMap<PrimitiveHandle, (VisualPrimitiveKind, PrimitiveStyle, Option<PrimitiveGeometry>)>,
    robot_skeleton: Option<RobotSkeleton>,
    last_fk_result: Option<RobotFKResult>,
    last_logged_robot_geometry: Option<RobotSkeletonGeometry>,
    robot_visual_style: RobotVisualStyle
}
impl RerunRenderEngine {
    /// Spawns a Rerun viewer and streams to it.
    pub fn new(app_id: &str) -> Result<Self, TrajvizError> {
        let rec = RecordingStreamBuilder::new(app_id).spawn().map_err(|e| Self::to_trajviz_error(&e))?;
        Self::new_from_recording_stream(rec)
    }
    /// Writes the recording to an `.rrd` file instead of a live viewer.
    pub fn new_to_file(app_id: &str, path: &str) -> Result<Self, TrajvizError> {
        let rec = RecordingStreamBuilder::new(app_id).save(path).map_err(|e| Self::to_trajviz_error(&e))?;
        Self::new_from_recording_stream(rec)
    }
    pub fn new_from_recording_stream(rec: RecordingStream) -> Result<Self, TrajvizError> {
        rec.log_static("world", &rerun::ViewCoordinates::RIGHT_HAND_Z_UP()).map_err(|e| Self::to_trajviz_error(&e))?;
        Ok(Self {
            rec,
            next_handle: 0,
            primitives: HashMap::new(),
            robot_skeleton: None,
            last_fk_result: None,
            last_logged_robot_geometry: None,
            robot_visual_style: RobotVisualStyle::default()
        })
    }
    pub fn recording_stream(&self) -> &RecordingStream {
        &self.rec
    }
    /// The robot geometry most recently sent to the viewer.  Empty geometry means the robot was
    /// cleared.
    pub fn last_logged_robot_geometry(&self) -> Option<&RobotSkeletonGeometry> {
        self.last_logged_robot_geometry.as_ref()
    }

    fn to_trajviz_error<E: std::fmt::Display>(e: &E) -> TrajvizError {
        TrajvizError::new_render_engine_error(&format!("Rerun: {}", e), file!(), line!())
    }
    fn entity_path(handle: PrimitiveHandle) -> String {
        format!("{}/{}", PRIMITIVE_ROOT, handle.0)
    }
    fn log_primitive(&self, handle: PrimitiveHandle) -> Result<(), TrajvizError> {
        let (_, style, geometry) = match self.primitives.get(&handle) {
            Some(p) => { p }
            None => { return Err(TrajvizError::new_render_engine_error(&format!("Unknown primitive handle {:?}.", handle), file!(), line!())); }
        };
        let geometry = match geometry {
            Some(g) => { g }
            None => { return Ok(()); }
        };

        let path = Self::entity_path(handle);
        let color = style.color.to_u8_array();
        let res = match geometry {
            PrimitiveGeometry::Point { position } => {
                self.rec.log(path, &rerun::Points3D::new([to_f32_array(position)])
                    .with_colors([color])
                    .with_radii([(style.size * 0.5) as f32]))
            }
            PrimitiveGeometry::Line { start, end } => {
                // zero width is a hairline
                let radius = if style.size > 0.0 { (style.size * 0.5) as f32 } else { 0.002 };
                self.rec.log(path, &rerun::LineStrips3D::new([vec![to_f32_array(start), to_f32_array(end)]])
                    .with_colors([color])
                    .with_radii([radius]))
            }
            PrimitiveGeometry::Axes { pose } => {
                let origin = to_f32_array(pose.translation());
                let vectors: Vec<[f32; 3]> = [Vector3::x(), Vector3::y(), Vector3::z()].iter()
                    .map(|a| to_f32_array(&(pose.rotation() * a * style.size)))
                    .collect();
                self.rec.log(path, &rerun::Arrows3D::from_vectors(vectors)
                    .with_origins([origin, origin, origin])
                    .with_colors([[255, 0, 0, color[3]], [0, 255, 0, color[3]], [0, 0, 255, color[3]]]))
            }
            PrimitiveGeometry::Arrow { pose, length_scale } => {
                let arrow_geometry = style.arrow_geometry.unwrap_or_else(ArrowGeometry::default);
                let length = (arrow_geometry.shaft_length + arrow_geometry.head_length) * length_scale;
                let vector = pose.rotation() * Vector3::x() * length;
                self.rec.log(path, &rerun::Arrows3D::from_vectors([to_f32_array(&vector)])
                    .with_origins([to_f32_array(pose.translation())])
                    .with_colors([color])
                    .with_radii([arrow_geometry.shaft_radius as f32]))
            }
        };

        res.map_err(|e| Self::to_trajviz_error(&e))
    }
    /// Sends the posed skeleton under the current style.  Does nothing until both a robot and link
    /// poses are known.
    fn log_robot(&mut self) -> Result<(), TrajvizError> {
        let geometry = match (&self.robot_skeleton, &self.last_fk_result) {
            (Some(skeleton), Some(fk_result)) => { skeleton.geometry(fk_result, &self.robot_visual_style) }
            _ => { return Ok(()); }
        };

        let res = self.log_robot_geometry(&geometry);
        self.last_logged_robot_geometry = Some(geometry);
        res
    }
    fn log_robot_geometry(&self, geometry: &RobotSkeletonGeometry) -> Result<(), TrajvizError> {
        if geometry.is_empty() {
            return self.rec.log(ROBOT_ROOT, &rerun::Clear::recursive()).map_err(|e| Self::to_trajviz_error(&e));
        }

        let alpha = (geometry.alpha * 255.0).round() as u8;
        let points: Vec<[f32; 3]> = geometry.link_positions.iter().map(|(_, p)| to_f32_array(p)).collect();
        let labels: Vec<String> = geometry.link_positions.iter().map(|(n, _)| n.clone()).collect();
        let segments: Vec<Vec<[f32; 3]>> = geometry.bones.iter().map(|(a, b)| vec![to_f32_array(a), to_f32_array(b)]).collect();

        self.rec.log(format!("{}/links", ROBOT_ROOT), &rerun::Points3D::new(points)
            .with_colors([[200, 200, 200, alpha]])
            .with_radii([0.02])
            .with_labels(labels))
            .map_err(|e| Self::to_trajviz_error(&e))?;
        self.rec.log(format!("{}/skeleton", ROBOT_ROOT), &rerun::LineStrips3D::new(segments)
            .with_colors([[200, 200, 200, alpha]]))
            .map_err(|e| Self::to_trajviz_error(&e))?;
        self.log_origin_markers("visual_origins", &geometry.visual_origins, [90, 160, 255, alpha])?;
        self.log_origin_markers("collision_origins", &geometry.collision_origins, [255, 160, 40, alpha])
    }
    fn log_origin_markers(&self, name: &str, origins: &[Vector3<f64>], color: [u8; 4]) -> Result<(), TrajvizError> {
        let path = format!("{}/{}", ROBOT_ROOT, name);
        let res = if origins.is_empty() {
            self.rec.log(path, &rerun::Clear::flat())
        } else {
            self.rec.log(path, &rerun::Points3D::new(origins.iter().map(to_f32_array))
                .with_colors([color])
                .with_radii([0.03]))
        };
        res.map_err(|e| Self::to_trajviz_error(&e))
    }
}
impl RenderEngine for RerunRenderEngine {
    fn create_primitive(&mut self, kind: VisualPrimitiveKind, style: &PrimitiveStyle) -> Result<PrimitiveHandle, TrajvizError> {
        let handle = PrimitiveHandle(self.next_handle);
        self.next_handle += 1;
        self.primitives.insert(handle, (kind, style.clone(), None));
        Ok(handle)
    }
    fn destroy_primitive(&mut self, handle: PrimitiveHandle) {
        if self.primitives.remove(&handle).is_some() {
            let _ = self.rec.log(Self::entity_path(handle), &rerun::Clear::flat());
        }
    }
    fn set_primitive_geometry(&mut self, handle: PrimitiveHandle, geometry: &PrimitiveGeometry) -> Result<(), TrajvizError> {
        match self.primitives.get_mut(&handle) {
            Some((kind, _, g)) => {
                if *kind != geometry.kind() {
                    return Err(TrajvizError::new_render_engine_error(&format!("Primitive {:?} is a {:?}, not a {:?}.", handle, kind, geometry.kind()), file!(), line!()));
                }
                *g = Some(geometry.clone());
            }
            None => { return Err(TrajvizError::new_render_engine_error(&format!("Unknown primitive handle {:?}.", handle), file!(), line!())); }
        }
        self.log_primitive(handle)
    }
    fn set_primitive_style(&mut self, handle: PrimitiveHandle, style: &PrimitiveStyle) -> Result<(), TrajvizError> {
        match self.primitives.get_mut(&handle) {
            Some((_, s, _)) => { *s = style.clone(); }
            None => { return Err(TrajvizError::new_render_engine_error(&format!("Unknown primitive handle {:?}.", handle), file!(), line!())); }
        }
        self.log_primitive(handle)
    }
    fn load_robot_visual(&mut self, robot_model_module: &RobotModelModule) -> Result<(), TrajvizError> {
        self.robot_skeleton = Some(RobotSkeleton::new(robot_model_module));
        self.last_fk_result = None;
        Ok(())
    }
    fn set_robot_link_poses(&mut self, fk_result: &RobotFKResult) -> Result<(), TrajvizError> {
        if self.robot_skeleton.is_none() {
            return Err(TrajvizError::new_render_engine_error("No robot visual is loaded.", file!(), line!()));
        }
        self.last_fk_result = Some(fk_result.clone());
        self.log_robot()
    }
    fn set_robot_visual_style(&mut self, style: &RobotVisualStyle) {
        self.robot_visual_style = style.clone();
        if let Err(e) = self.log_robot() {
            trajviz_print_warning(&format!("Could not redraw the robot visual.  {}", e));
        }
    }
    fn clear_robot_visual(&mut self) {
        self.robot_skeleton = None;
        self.last_fk_result = None;
        self.last_logged_robot_geometry = None;
        let _ = self.rec.log(ROBOT_ROOT, &rerun::Clear::recursive());
    }
}

fn to_f32_array(v: &Vector3<f64>) -> [f32; 3] {
    [v[0] as f32, v[1] as f32, v[2] as f32]
}
