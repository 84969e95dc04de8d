use nalgebra::{Vector3, Unit};
use serde::{Serialize, Deserialize};
use crate::utils::utils_console::{trajviz_print, trajviz_print_new_line, PrintColor, PrintMode};
use crate::utils::utils_errors::TrajvizError;
use crate::utils::utils_robot::urdf_joint::{JointTypeWrapper, URDFJoint};
use crate::utils::utils_se3::implicit_dual_quaternion::ImplicitDualQuaternion;

/// A Joint holds all necessary information about a robot joint (specified by a robot URDF file)
/// in order to do kinematic computations on a robot model.
/// Each joint can contain multiple JointAxis objects.  A JointAxis encodes a possible degree of freedom
/// in a robot model.  A single joint axis can  characterize either a rotation around the axis or a
/// translation along a given axis.  A Joint can contain multiple joint axes, meaning that a single
/// "joint" may have more than one degree of freedom (e.g., in the case of a floating joint,
/// it will have 6 DOFs).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Joint {
    name: String,
    joint_idx: usize,
    preceding_link_idx: Option<usize>,
    child_link_idx: Option<usize>,
    origin_offset_pose: ImplicitDualQuaternion,
    has_origin_offset: bool,
    joint_axes: Vec<JointAxis>,
    is_floating_base_connector_joint: bool,
    urdf_joint: URDFJoint
}
impl Joint {
    /// Returns a joint corresponding to the given URDFJoint.  This will be automatically called
    /// by the RobotModelModule.
    pub fn new(urdf_joint: URDFJoint, joint_idx: usize) -> Result<Self, TrajvizError> {
        let name = urdf_joint.name().to_string();

        let rpy = urdf_joint.origin_rpy();
        let xyz = urdf_joint.origin_xyz();

        let mut out_self = Self {
            name,
            joint_idx,
            preceding_link_idx: None,
            child_link_idx: None,
            origin_offset_pose: ImplicitDualQuaternion::new_from_euler_angles(rpy[0], rpy[1], rpy[2], xyz[0], xyz[1], xyz[2]),
            has_origin_offset: rpy.norm() != 0.0 || xyz.norm() != 0.0,
            joint_axes: vec![],
            is_floating_base_connector_joint: false,
            urdf_joint
        };
        out_self.set_dof_axes()?;

        Ok(out_self)
    }
    /// Returns the virtual 6-DOF joint that connects the world to the root link of a floating base
    /// robot.  Its axes are translation along x, y, z followed by rotation about x, y, z.
    pub fn new_floating_base_connector_joint(joint_idx: usize, world_link_idx: usize, root_link_idx: usize) -> Self {
        Self {
            name: "__floating_base_joint".to_string(),
            joint_idx,
            preceding_link_idx: Some(world_link_idx),
            child_link_idx: Some(root_link_idx),
            origin_offset_pose: ImplicitDualQuaternion::new_identity(),
            has_origin_offset: false,
            joint_axes: Self::six_dof_axes(),
            is_floating_base_connector_joint: true,
            urdf_joint: URDFJoint::new_empty()
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn joint_idx(&self) -> usize {
        self.joint_idx
    }
    pub fn preceding_link_idx(&self) -> Option<usize> {
        self.preceding_link_idx
    }
    pub fn child_link_idx(&self) -> Option<usize> {
        self.child_link_idx
    }
    pub fn has_origin_offset(&self) -> bool {
        self.has_origin_offset
    }
    pub fn num_dofs(&self) -> usize {
        self.joint_axes.len()
    }
    pub fn urdf_joint(&self) -> &URDFJoint {
        &self.urdf_joint
    }
    pub fn origin_offset_pose(&self) -> &ImplicitDualQuaternion {
        &self.origin_offset_pose
    }
    pub fn joint_axes(&self) -> &Vec<JointAxis> {
        &self.joint_axes
    }
    pub fn is_floating_base_connector_joint(&self) -> bool {
        self.is_floating_base_connector_joint
    }
    pub fn set_preceding_link_idx(&mut self, preceding_link_idx: Option<usize>) {
        self.preceding_link_idx = preceding_link_idx;
    }
    pub fn set_child_link_idx(&mut self, child_link_idx: Option<usize>) {
        self.child_link_idx = child_link_idx;
    }
    pub fn print_summary(&self) {
        trajviz_print(&format!(">> Joint index: "), PrintMode::Print, PrintColor::Blue, true);
        trajviz_print(&format!(" {} ", self.joint_idx), PrintMode::Print, PrintColor::None, false);
        trajviz_print(&format!("  Joint name: "), PrintMode::Print, PrintColor::Blue, true);
        trajviz_print(&format!(" {} ", self.name), PrintMode::Print, PrintColor::None, false);
        trajviz_print(&format!("  Num dofs: "), PrintMode::Print, PrintColor::Blue, true);
        trajviz_print(&format!(" {} ", self.num_dofs()), PrintMode::Print, PrintColor::None, false);
        for (i, a) in self.joint_axes().iter().enumerate() {
            trajviz_print_new_line();
            trajviz_print(&format!("      -- Joint sub idx {}: ", i), PrintMode::Print, PrintColor::Cyan, false);
            trajviz_print(&format!(" {:?} about axis {:?}", a.axis_primitive_type, a.axis), PrintMode::Print, PrintColor::None, false);
        }
        trajviz_print_new_line();
    }
    fn set_dof_axes(&mut self) -> Result<(), TrajvizError> {
        let joint_type = self.urdf_joint.joint_type().clone();
        let axis = self.urdf_joint.axis();

        match joint_type {
            JointTypeWrapper::Revolute | JointTypeWrapper::Continuous => {
                self.joint_axes.push(JointAxis::new(&self.name, axis, JointAxisPrimitiveType::Rotation)?);
            }
            JointTypeWrapper::Prismatic => {
                self.joint_axes.push(JointAxis::new(&self.name, axis, JointAxisPrimitiveType::Translation)?);
            }
            JointTypeWrapper::Fixed => {
                /* Do Nothing */
            }
            JointTypeWrapper::Floating => {
                self.joint_axes = Self::six_dof_axes();
            }
            JointTypeWrapper::Spherical => {
                for a in [Vector3::x_axis(), Vector3::y_axis(), Vector3::z_axis()] {
                    self.joint_axes.push(JointAxis::new_from_unit(a, JointAxisPrimitiveType::Rotation));
                }
            }
            JointTypeWrapper::Planar => {
                return Err(TrajvizError::new_malformed_model_description_error(&format!("Joint {:?} is planar, which is not supported.", self.name), file!(), line!()));
            }
        }

        Ok(())
    }
    fn six_dof_axes() -> Vec<JointAxis> {
        let standard_axes = [Vector3::x_axis(), Vector3::y_axis(), Vector3::z_axis()];
        let mut out_vec = vec![];
        for a in standard_axes.iter() {
            out_vec.push(JointAxis::new_from_unit(*a, JointAxisPrimitiveType::Translation));
        }
        for a in standard_axes.iter() {
            out_vec.push(JointAxis::new_from_unit(*a, JointAxisPrimitiveType::Rotation));
        }
        out_vec
    }
}

/// A JointAxis encodes a single degree of freedom in a robot model.  A single joint axis can
/// characterize either a rotation around the axis or a translation along a given axis.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JointAxis {
    axis_as_unit: Unit<Vector3<f64>>,
    axis: Vector3<f64>,
    axis_primitive_type: JointAxisPrimitiveType
}
impl JointAxis {
    pub fn new(joint_name: &str, axis: Vector3<f64>, axis_primitive_type: JointAxisPrimitiveType) -> Result<Self, TrajvizError> {
        let axis_as_unit = Unit::try_new(axis, 1e-12).ok_or_else(|| {
            TrajvizError::new_malformed_model_description_error(&format!("Joint axis {:?} of joint {:?} has zero length.", axis, joint_name), file!(), line!())
        })?;
        Ok(Self::new_from_unit(axis_as_unit, axis_primitive_type))
    }
    pub fn new_from_unit(axis_as_unit: Unit<Vector3<f64>>, axis_primitive_type: JointAxisPrimitiveType) -> Self {
        Self {
            axis_as_unit,
            axis: axis_as_unit.into_inner(),
            axis_primitive_type
        }
    }
    pub fn axis(&self) -> Vector3<f64> {
        self.axis
    }
    pub fn axis_primitive_type(&self) -> &JointAxisPrimitiveType {
        &self.axis_primitive_type
    }
    /// The transform this axis contributes when its configuration value is `joint_value`.
    pub fn pose_at(&self, joint_value: f64) -> ImplicitDualQuaternion {
        match self.axis_primitive_type {
            JointAxisPrimitiveType::Rotation => {
                ImplicitDualQuaternion::new_from_axis_angle(&self.axis_as_unit, joint_value)
            }
            JointAxisPrimitiveType::Translation => {
                ImplicitDualQuaternion::new_from_translation(joint_value * self.axis)
            }
        }
    }
}

/// Specifies the transform type for a JointAxis Object.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum JointAxisPrimitiveType {
    Rotation,
    Translation
}
