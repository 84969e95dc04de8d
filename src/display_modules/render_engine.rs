use nalgebra::{UnitQuaternion, Vector3};
use serde::{Serialize, Deserialize};
use strum_macros::EnumIter;
use crate::robot_modules::robot_kinematics_module::RobotFKResult;
use crate::robot_modules::robot_model_module::RobotModelModule;
use crate::utils::utils_errors::TrajvizError;
use crate::utils::utils_se3::implicit_dual_quaternion::ImplicitDualQuaternion;

/// The boundary to the host rendering engine.
///
/// Everything the display draws goes through this trait: free primitives (points, lines,
/// coordinate axes, arrows) that are created, updated and destroyed one by one by a
/// `VisualPrimitivePool`, and the articulated robot visual whose link poses are set from forward
/// kinematics.  Frame handling and camera control stay on the engine side.
pub trait RenderEngine {
    fn create_primitive(&mut self, kind: VisualPrimitiveKind, style: &PrimitiveStyle) -> Result<PrimitiveHandle, TrajvizError>;
    fn destroy_primitive(&mut self, handle: PrimitiveHandle);
    fn set_primitive_geometry(&mut self, handle: PrimitiveHandle, geometry: &PrimitiveGeometry) -> Result<(), TrajvizError>;
    fn set_primitive_style(&mut self, handle: PrimitiveHandle, style: &PrimitiveStyle) -> Result<(), TrajvizError>;

    fn load_robot_visual(&mut self, robot_model_module: &RobotModelModule) -> Result<(), TrajvizError>;
    fn set_robot_link_poses(&mut self, fk_result: &RobotFKResult) -> Result<(), TrajvizError>;
    fn set_robot_visual_style(&mut self, style: &RobotVisualStyle);
    fn clear_robot_visual(&mut self);
}

/// Opaque id of a primitive living inside a render engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PrimitiveHandle(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum VisualPrimitiveKind {
    Point,
    /// A straight segment.  Drawn as a hairline when the style size is zero and as a camera
    /// facing billboard of that width otherwise.
    Line,
    Axes,
    Arrow
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PrimitiveGeometry {
    Point { position: Vector3<f64> },
    Line { start: Vector3<f64>, end: Vector3<f64> },
    Axes { pose: ImplicitDualQuaternion },
    /// The arrow points along the local x axis of `pose`; `length_scale` multiplies the style's
    /// shaft and head lengths.
    Arrow { pose: ImplicitDualQuaternion, length_scale: f64 }
}
impl PrimitiveGeometry {
    pub fn kind(&self) -> VisualPrimitiveKind {
        match self {
            PrimitiveGeometry::Point { .. } => { VisualPrimitiveKind::Point }
            PrimitiveGeometry::Line { .. } => { VisualPrimitiveKind::Line }
            PrimitiveGeometry::Axes { .. } => { VisualPrimitiveKind::Axes }
            PrimitiveGeometry::Arrow { .. } => { VisualPrimitiveKind::Arrow }
        }
    }
    /// An arrow starting at `origin` and pointing along `direction`.  A zero direction keeps the
    /// identity orientation.
    pub fn new_arrow(origin: Vector3<f64>, direction: &Vector3<f64>, length_scale: f64) -> Self {
        let rotation = if direction.norm() > 0.0 {
            UnitQuaternion::rotation_between(&Vector3::x(), direction)
                .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::PI))
        } else {
            UnitQuaternion::identity()
        };
        PrimitiveGeometry::Arrow { pose: ImplicitDualQuaternion::new(rotation, origin), length_scale }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorRGBA {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32
}
impl ColorRGBA {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
    pub fn to_u8_array(&self) -> [u8; 4] {
        let f = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [f(self.r), f(self.g), f(self.b), f(self.a)]
    }
}

/// Dimensions of a force arrow, in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrowGeometry {
    pub head_radius: f64,
    pub head_length: f64,
    pub shaft_radius: f64,
    pub shaft_length: f64
}
impl Default for ArrowGeometry {
    fn default() -> Self {
        Self {
            head_radius: 0.02,
            head_length: 0.08,
            shaft_radius: 0.01,
            shaft_length: 0.4
        }
    }
}

/// Per-primitive appearance.  `size` is the point diameter, the line width (zero for a
/// hairline) or the axes length depending on the primitive kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveStyle {
    pub color: ColorRGBA,
    pub size: f64,
    pub arrow_geometry: Option<ArrowGeometry>
}
impl PrimitiveStyle {
    pub fn new(color: ColorRGBA, size: f64) -> Self {
        Self { color, size, arrow_geometry: None }
    }
    pub fn new_arrow(color: ColorRGBA, arrow_geometry: ArrowGeometry) -> Self {
        Self { color, size: arrow_geometry.shaft_radius, arrow_geometry: Some(arrow_geometry) }
    }
}
impl Default for PrimitiveStyle {
    fn default() -> Self {
        Self::new(ColorRGBA::new(1.0, 1.0, 1.0, 1.0), 0.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotVisualStyle {
    pub visible: bool,
    pub visual_enabled: bool,
    pub collision_enabled: bool,
    pub alpha: f32
}
impl Default for RobotVisualStyle {
    fn default() -> Self {
        Self {
            visible: true,
            visual_enabled: true,
            collision_enabled: false,
            alpha: 1.0
        }
    }
}

/// The links of a robot model reduced to what a stick figure visual needs: one joint marker per
/// link origin, a bone from every link to its parent, and the origins of the first visual and
/// collision element of each link.  The virtual world link of a floating base is left out.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotSkeleton {
    robot_name: String,
    links: Vec<RobotSkeletonLink>
}
impl RobotSkeleton {
    pub fn new(robot_model_module: &RobotModelModule) -> Self {
        let all_links = robot_model_module.links();
        let links = all_links.iter()
            .filter(|l| !l.is_virtual_base_link())
            .map(|l| RobotSkeletonLink {
                name: l.name().to_string(),
                link_idx: l.link_idx(),
                parent_link_idx: l.preceding_link_idx().filter(|p| all_links.get(*p).map_or(false, |parent| !parent.is_virtual_base_link())),
                visual_origin: l.urdf_link().visual_origin().cloned(),
                collision_origin: l.urdf_link().collision_origin().cloned()
            })
            .collect();

        Self {
            robot_name: robot_model_module.robot_name().to_string(),
            links
        }
    }
    pub fn robot_name(&self) -> &str {
        &self.robot_name
    }
    pub fn link_names(&self) -> Vec<String> {
        self.links.iter().map(|l| l.name.clone()).collect()
    }
    /// World-space geometry of the skeleton posed by `fk_result`.  Empty when `style` hides the
    /// robot or enables neither the visual nor the collision representation.
    pub fn geometry(&self, fk_result: &RobotFKResult, style: &RobotVisualStyle) -> RobotSkeletonGeometry {
        let mut out = RobotSkeletonGeometry::default();
        out.alpha = style.alpha.clamp(0.0, 1.0);
        if !style.visible || !(style.visual_enabled || style.collision_enabled) { return out; }

        for link in &self.links {
            let pose = match fk_result.get_pose_from_link_idx(link.link_idx) {
                Some(p) => { p }
                None => { continue; }
            };
            out.link_positions.push((link.name.clone(), *pose.translation()));
            if let Some(parent_pose) = link.parent_link_idx.and_then(|i| fk_result.get_pose_from_link_idx(i)) {
                out.bones.push((*parent_pose.translation(), *pose.translation()));
            }
            if style.visual_enabled {
                if let Some(origin) = &link.visual_origin { out.visual_origins.push(*pose.multiply(origin).translation()); }
            }
            if style.collision_enabled {
                if let Some(origin) = &link.collision_origin { out.collision_origins.push(*pose.multiply(origin).translation()); }
            }
        }

        out
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RobotSkeletonLink {
    name: String,
    link_idx: usize,
    parent_link_idx: Option<usize>,
    visual_origin: Option<ImplicitDualQuaternion>,
    collision_origin: Option<ImplicitDualQuaternion>
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RobotSkeletonGeometry {
    pub link_positions: Vec<(String, Vector3<f64>)>,
    pub bones: Vec<(Vector3<f64>, Vector3<f64>)>,
    pub visual_origins: Vec<Vector3<f64>>,
    pub collision_origins: Vec<Vector3<f64>>,
    pub alpha: f32
}
impl RobotSkeletonGeometry {
    pub fn is_empty(&self) -> bool {
        self.link_positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::DVector;
    use crate::robot_modules::robot_kinematics_module::RobotKinematicsModule;
    use crate::robot_modules::robot_model_module::BaseMobilityMode;

    #[test]
    fn arrow_points_along_direction() {
        let geometry = PrimitiveGeometry::new_arrow(Vector3::new(1.0, 0.0, 0.0), &Vector3::new(0.0, 0.0, 5.0), 0.5);
        match geometry {
            PrimitiveGeometry::Arrow { pose, length_scale } => {
                assert_relative_eq!(pose.rotation() * Vector3::x(), Vector3::z(), epsilon = 1e-12);
                assert_relative_eq!(pose.translation(), &Vector3::new(1.0, 0.0, 0.0));
                assert_relative_eq!(length_scale, 0.5);
            }
            _ => { panic!("expected an arrow") }
        }
    }

    #[test]
    fn opposite_direction_arrow_is_flipped() {
        let geometry = PrimitiveGeometry::new_arrow(Vector3::zeros(), &Vector3::new(-2.0, 0.0, 0.0), 1.0);
        if let PrimitiveGeometry::Arrow { pose, .. } = geometry {
            assert_relative_eq!(pose.rotation() * Vector3::x(), -Vector3::x(), epsilon = 1e-9);
        }
    }

    const LEG_URDF: &str = r#"<robot name="leg">
        <link name="pelvis">
            <inertial><mass value="5.0"/><inertia ixx="1" ixy="0" ixz="0" iyy="1" iyz="0" izz="1"/></inertial>
            <visual><origin xyz="0 0 0.1" rpy="0 0 0"/><geometry><box size="0.2 0.2 0.2"/></geometry></visual>
        </link>
        <link name="shin">
            <inertial><mass value="2.0"/><inertia ixx="1" ixy="0" ixz="0" iyy="1" iyz="0" izz="1"/></inertial>
            <visual><origin xyz="0 0 -0.2" rpy="0 0 0"/><geometry><cylinder radius="0.05" length="0.4"/></geometry></visual>
            <collision><origin xyz="0 0 -0.25" rpy="0 0 0"/><geometry><cylinder radius="0.05" length="0.5"/></geometry></collision>
        </link>
        <joint name="knee" type="fixed">
            <parent link="pelvis"/><child link="shin"/><origin xyz="0 0 -0.5" rpy="0 0 0"/>
        </joint>
    </robot>"#;

    fn posed_leg() -> (RobotSkeleton, RobotFKResult) {
        let robot_model_module = RobotModelModule::new_from_urdf_string(LEG_URDF, BaseMobilityMode::Floating).unwrap();
        let skeleton = RobotSkeleton::new(&robot_model_module);
        let robot_kinematics_module = RobotKinematicsModule::new(robot_model_module);
        let fk_result = robot_kinematics_module.compute_fk(&DVector::from_vec(vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.0])).unwrap();
        (skeleton, fk_result)
    }

    #[test]
    fn skeleton_leaves_out_floating_base_world_link() {
        let (skeleton, fk_result) = posed_leg();
        assert_eq!(skeleton.link_names(), vec!["pelvis".to_string(), "shin".to_string()]);

        let geometry = skeleton.geometry(&fk_result, &RobotVisualStyle::default());
        assert_eq!(geometry.link_positions.len(), 2);
        assert_eq!(geometry.bones.len(), 1);
        assert_relative_eq!(geometry.bones[0].0, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
        assert_relative_eq!(geometry.bones[0].1, Vector3::new(0.0, 0.0, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn skeleton_draws_visual_or_collision_origins_per_toggle() {
        let (skeleton, fk_result) = posed_leg();

        let visual_only = skeleton.geometry(&fk_result, &RobotVisualStyle::default());
        assert_eq!(visual_only.visual_origins.len(), 2);
        assert!(visual_only.collision_origins.is_empty());
        assert_relative_eq!(visual_only.visual_origins[1], Vector3::new(0.0, 0.0, 0.3), epsilon = 1e-12);

        let collision_only = skeleton.geometry(&fk_result, &RobotVisualStyle { visible: true, visual_enabled: false, collision_enabled: true, alpha: 0.5 });
        assert!(collision_only.visual_origins.is_empty());
        assert_eq!(collision_only.collision_origins.len(), 1);
        assert_relative_eq!(collision_only.collision_origins[0], Vector3::new(0.0, 0.0, 0.25), epsilon = 1e-12);
        assert_eq!(collision_only.alpha, 0.5);

        let hidden = skeleton.geometry(&fk_result, &RobotVisualStyle { visible: false, ..RobotVisualStyle::default() });
        assert!(hidden.is_empty());
    }

    #[test]
    fn color_quantization_clamps() {
        assert_eq!(ColorRGBA::new(1.5, 0.0, 0.5, 1.0).to_u8_array(), [255, 0, 128, 255]);
    }
}
