use std::collections::BTreeMap;
use crate::display_modules::render_engine::{PrimitiveGeometry, PrimitiveHandle, PrimitiveStyle, RenderEngine, RobotSkeleton, RobotSkeletonGeometry, RobotVisualStyle, VisualPrimitiveKind};
use crate::robot_modules::robot_kinematics_module::RobotFKResult;
use crate::robot_modules::robot_model_module::RobotModelModule;
use crate::utils::utils_errors::TrajvizError;
use crate::utils::utils_se3::implicit_dual_quaternion::ImplicitDualQuaternion;

/// A render engine that keeps the scene in memory instead of drawing it.
///
/// Useful headless and for inspecting exactly which primitives a display holds.  An optional
/// capacity makes `create_primitive` fail once that many primitives are alive, which is how an
/// exhausted renderer is simulated.
#[derive(Clone, Debug, Default)]
pub struct RecordingRenderEngine {
    next_handle: u64,
    primitives: BTreeMap<PrimitiveHandle, RecordedPrimitive>,
    num_created: usize,
    num_destroyed: usize,
    capacity: Option<usize>,
    robot_visual: Option<RecordedRobotVisual>,
    robot_visual_style: RobotVisualStyle
}
impl RecordingRenderEngine {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn new_with_capacity(capacity: usize) -> Self {
        let mut out_self = Self::default();
        out_self.capacity = Some(capacity);
        out_self
    }
    pub fn set_capacity(&mut self, capacity: Option<usize>) {
        self.capacity = capacity;
    }
    pub fn live_primitive_count(&self) -> usize {
        self.primitives.len()
    }
    pub fn num_created(&self) -> usize {
        self.num_created
    }
    pub fn num_destroyed(&self) -> usize {
        self.num_destroyed
    }
    pub fn get_primitive(&self, handle: PrimitiveHandle) -> Option<&RecordedPrimitive> {
        self.primitives.get(&handle)
    }
    pub fn primitives_of_kind(&self, kind: VisualPrimitiveKind) -> Vec<&RecordedPrimitive> {
        self.primitives.values().filter(|p| p.kind == kind).collect()
    }
    pub fn robot_visual(&self) -> Option<&RecordedRobotVisual> {
        self.robot_visual.as_ref()
    }
    pub fn robot_visual_style(&self) -> &RobotVisualStyle {
        &self.robot_visual_style
    }
    /// What the robot visual currently shows given the last link poses and the current style.
    pub fn robot_visual_geometry(&self) -> Option<RobotSkeletonGeometry> {
        let robot_visual = self.robot_visual.as_ref()?;
        let fk_result = robot_visual.fk_result.as_ref()?;
        Some(robot_visual.skeleton.geometry(fk_result, &self.robot_visual_style))
    }
    fn get_primitive_mut(&mut self, handle: PrimitiveHandle) -> Result<&mut RecordedPrimitive, TrajvizError> {
        self.primitives.get_mut(&handle).ok_or_else(|| {
            TrajvizError::new_render_engine_error(&format!("Unknown primitive handle {:?}.", handle), file!(), line!())
        })
    }
}
impl RenderEngine for RecordingRenderEngine {
    fn create_primitive(&mut self, kind: VisualPrimitiveKind, style: &PrimitiveStyle) -> Result<PrimitiveHandle, TrajvizError> {
        if let Some(capacity) = self.capacity {
            if self.primitives.len() >= capacity {
                return Err(TrajvizError::new_render_engine_error(&format!("Capacity of {} primitives reached.", capacity), file!(), line!()));
            }
        }

        let handle = PrimitiveHandle(self.next_handle);
        self.next_handle += 1;
        self.num_created += 1;
        self.primitives.insert(handle, RecordedPrimitive { kind, geometry: None, style: style.clone() });

        Ok(handle)
    }
    fn destroy_primitive(&mut self, handle: PrimitiveHandle) {
        if self.primitives.remove(&handle).is_some() {
            self.num_destroyed += 1;
        }
    }
    fn set_primitive_geometry(&mut self, handle: PrimitiveHandle, geometry: &PrimitiveGeometry) -> Result<(), TrajvizError> {
        let primitive = self.get_primitive_mut(handle)?;
        if primitive.kind != geometry.kind() {
            return Err(TrajvizError::new_render_engine_error(&format!("Primitive {:?} is a {:?}, not a {:?}.", handle, primitive.kind, geometry.kind()), file!(), line!()));
        }
        primitive.geometry = Some(geometry.clone());
        Ok(())
    }
    fn set_primitive_style(&mut self, handle: PrimitiveHandle, style: &PrimitiveStyle) -> Result<(), TrajvizError> {
        let primitive = self.get_primitive_mut(handle)?;
        primitive.style = style.clone();
        Ok(())
    }
    fn load_robot_visual(&mut self, robot_model_module: &RobotModelModule) -> Result<(), TrajvizError> {
        let skeleton = RobotSkeleton::new(robot_model_module);
        self.robot_visual = Some(RecordedRobotVisual {
            link_names: skeleton.link_names(),
            skeleton,
            link_poses: vec![],
            fk_result: None
        });
        Ok(())
    }
    fn set_robot_link_poses(&mut self, fk_result: &RobotFKResult) -> Result<(), TrajvizError> {
        let robot_visual = self.robot_visual.as_mut().ok_or_else(|| {
            TrajvizError::new_render_engine_error("No robot visual is loaded.", file!(), line!())
        })?;
        robot_visual.link_poses = fk_result.link_entries().iter()
            .filter(|e| robot_visual.link_names.iter().any(|n| n == e.link_name()))
            .filter_map(|e| e.pose().as_ref().map(|p| (e.link_name().to_string(), p.clone())))
            .collect();
        robot_visual.fk_result = Some(fk_result.clone());
        Ok(())
    }
    fn set_robot_visual_style(&mut self, style: &RobotVisualStyle) {
        self.robot_visual_style = style.clone();
    }
    fn clear_robot_visual(&mut self) {
        self.robot_visual = None;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedPrimitive {
    kind: VisualPrimitiveKind,
    geometry: Option<PrimitiveGeometry>,
    style: PrimitiveStyle
}
impl RecordedPrimitive {
    pub fn kind(&self) -> VisualPrimitiveKind {
        self.kind
    }
    pub fn geometry(&self) -> Option<&PrimitiveGeometry> {
        self.geometry.as_ref()
    }
    pub fn style(&self) -> &PrimitiveStyle {
        &self.style
    }
}

#[derive(Clone, Debug)]
pub struct RecordedRobotVisual {
    skeleton: RobotSkeleton,
    link_names: Vec<String>,
    link_poses: Vec<(String, ImplicitDualQuaternion)>,
    fk_result: Option<RobotFKResult>
}
impl RecordedRobotVisual {
    pub fn robot_name(&self) -> &str {
        self.skeleton.robot_name()
    }
    pub fn link_names(&self) -> &Vec<String> {
        &self.link_names
    }
    pub fn link_poses(&self) -> &Vec<(String, ImplicitDualQuaternion)> {
        &self.link_poses
    }
    pub fn get_link_pose(&self, link_name: &str) -> Option<&ImplicitDualQuaternion> {
        self.link_poses.iter().find(|(n, _)| n == link_name).map(|(_, p)| p)
    }
}
