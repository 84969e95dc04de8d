use nalgebra::{DVector, Vector3};
use serde::{Serialize, Deserialize};
use crate::robot_modules::robot_model_module::{BaseMobilityMode, RobotModelModule};
use crate::utils::utils_console::{trajviz_print, trajviz_print_new_line, PrintColor, PrintMode};
use crate::utils::utils_errors::TrajvizError;
use crate::utils::utils_se3::implicit_dual_quaternion::ImplicitDualQuaternion;

pub const GRAVITY_MAGNITUDE: f64 = 9.81;

/// The `RobotKinematicsModule` performs operations related to a robot's kinematics.
/// Its main subroutines are forward kinematics, which takes a configuration vector and outputs
/// the SE(3) poses of all links on the robot, and center of mass computation, which is the
/// mass-weighted average of every link's inertial origin after forward kinematics.
///
/// The module is read-only once loaded except for a scratch pose buffer that `compute_com`
/// reuses between calls.
///
/// # Example
/// ```
/// use nalgebra::DVector;
/// use trajviz::robot_modules::robot_kinematics_module::RobotKinematicsModule;
/// use trajviz::robot_modules::robot_model_module::BaseMobilityMode;
///
/// let urdf = r#"<robot name="point_mass">
///     <link name="base"><inertial><origin xyz="0 0 0.5" rpy="0 0 0"/><mass value="2.0"/><inertia ixx="0" ixy="0" ixz="0" iyy="0" iyz="0" izz="0"/></inertial></link>
/// </robot>"#;
///
/// let mut robot_kinematics_module = RobotKinematicsModule::new_from_urdf_string(urdf, BaseMobilityMode::Floating).expect("error");
/// let q = DVector::from_vec(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
/// let com = robot_kinematics_module.compute_com(&q).expect("error");
/// assert!((com.position()[0] - 1.0).abs() < 1e-9);
/// assert!((com.position()[2] - 0.5).abs() < 1e-9);
/// assert!((com.total_mass() - 2.0).abs() < 1e-9);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotKinematicsModule {
    robot_model_module: RobotModelModule,
    starter_result: RobotFKResult,
    #[serde(skip)]
    scratch_poses: Vec<Option<ImplicitDualQuaternion>>
}
impl RobotKinematicsModule {
    pub fn new(robot_model_module: RobotModelModule) -> Self {
        let mut starter_result = RobotFKResult { link_entries: vec![] };
        for (i, link) in robot_model_module.links().iter().enumerate() {
            starter_result.link_entries.push(RobotFKResultLinkEntry {
                link_idx: i,
                link_name: link.name().to_string(),
                pose: None
            });
        }
        let scratch_poses = vec![None; robot_model_module.links().len()];

        Self {
            robot_model_module,
            starter_result,
            scratch_poses
        }
    }
    pub fn new_from_urdf_string(robot_description: &str, base_mobility_mode: BaseMobilityMode) -> Result<Self, TrajvizError> {
        let robot_model_module = RobotModelModule::new_from_urdf_string(robot_description, base_mobility_mode)?;
        return Ok(Self::new(robot_model_module));
    }
    pub fn robot_model_module(&self) -> &RobotModelModule {
        &self.robot_model_module
    }
    pub fn num_dofs(&self) -> usize {
        self.robot_model_module.num_dofs()
    }
    /// Robot weight in newtons.
    pub fn total_weight(&self) -> f64 {
        self.robot_model_module.total_mass() * GRAVITY_MAGNITUDE
    }
    pub fn compute_fk(&self, configuration: &DVector<f64>) -> Result<RobotFKResult, TrajvizError> {
        let mut poses = vec![None; self.robot_model_module.links().len()];
        self.compute_fk_into(configuration, &mut poses)?;

        let mut output = self.starter_result.clone();
        for (entry, pose) in output.link_entries.iter_mut().zip(poses.into_iter()) {
            entry.pose = pose;
        }

        return Ok(output);
    }
    pub fn compute_com(&mut self, configuration: &DVector<f64>) -> Result<RobotCoMResult, TrajvizError> {
        let mut poses = std::mem::take(&mut self.scratch_poses);
        poses.resize(self.robot_model_module.links().len(), None);
        let res = self.compute_fk_into(configuration, &mut poses);
        let out = res.and_then(|_| self.com_from_poses(&poses));
        self.scratch_poses = poses;
        out
    }
    fn com_from_poses(&self, poses: &Vec<Option<ImplicitDualQuaternion>>) -> Result<RobotCoMResult, TrajvizError> {
        let mut weighted_sum = Vector3::zeros();
        let mut total_mass = 0.0;

        for (link, pose) in self.robot_model_module.links().iter().zip(poses.iter()) {
            let mass = link.mass();
            if mass <= 0.0 { continue; }
            if let Some(pose) = pose {
                let link_com = pose.multiply_by_vector3(&link.urdf_link().inertial_origin_xyz());
                weighted_sum += mass * link_com;
                total_mass += mass;
            }
        }

        if total_mass <= 0.0 {
            return Err(TrajvizError::new_generic_error_str(&format!("Robot {:?} has zero total mass, so its center of mass is undefined.", self.robot_model_module.robot_name()), file!(), line!()));
        }

        Ok(RobotCoMResult {
            position: weighted_sum / total_mass,
            total_mass
        })
    }
    fn compute_fk_into(&self, configuration: &DVector<f64>, out_vec: &mut Vec<Option<ImplicitDualQuaternion>>) -> Result<(), TrajvizError> {
        if configuration.len() != self.robot_model_module.num_dofs() {
            return Err(TrajvizError::new_dimension_mismatch_error("compute_fk", configuration.len(), self.robot_model_module.num_dofs(), file!(), line!()));
        }

        for pose in out_vec.iter_mut() { *pose = None; }

        for link_tree_traversal_layer in self.robot_model_module.link_tree_traversal_layers() {
            for link_idx in link_tree_traversal_layer {
                self.compute_fk_on_single_link(configuration, *link_idx, out_vec)?;
            }
        }

        Ok(())
    }
    fn compute_fk_on_single_link(&self, configuration: &DVector<f64>, link_idx: usize, out_vec: &mut Vec<Option<ImplicitDualQuaternion>>) -> Result<(), TrajvizError> {
        let link = self.robot_model_module.get_link_by_idx(link_idx)?;
        let (preceding_link_idx, preceding_joint_idx) = match (link.preceding_link_idx(), link.preceding_joint_idx()) {
            (Some(l), Some(j)) => { (l, j) }
            _ => {
                out_vec[link_idx] = Some(ImplicitDualQuaternion::new_identity());
                return Ok(());
            }
        };

        let preceding_joint = &self.robot_model_module.joints()[preceding_joint_idx];
        let configuration_idxs = self.robot_model_module.map_joint_idx_to_configuration_idxs(preceding_joint_idx)?;

        let mut out_pose = out_vec[preceding_link_idx].clone().ok_or_else(|| {
            TrajvizError::new_generic_error_str(&format!("Link {} was visited before its parent link {}.", link_idx, preceding_link_idx), file!(), line!())
        })?;

        if preceding_joint.has_origin_offset() {
            out_pose = out_pose.multiply_shortcircuit(preceding_joint.origin_offset_pose());
        }

        for (joint_axis, configuration_idx) in preceding_joint.joint_axes().iter().zip(configuration_idxs.iter()) {
            let axis_pose = joint_axis.pose_at(configuration[*configuration_idx]);
            out_pose = out_pose.multiply_shortcircuit(&axis_pose);
        }

        out_vec[link_idx] = Some(out_pose);

        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotFKResult {
    link_entries: Vec<RobotFKResultLinkEntry>
}
impl RobotFKResult {
    pub fn link_entries(&self) -> &Vec<RobotFKResultLinkEntry> {
        &self.link_entries
    }
    pub fn get_pose_from_link_idx(&self, link_idx: usize) -> Option<&ImplicitDualQuaternion> {
        self.link_entries.get(link_idx).and_then(|e| e.pose.as_ref())
    }
    pub fn print_summary(&self) {
        for e in self.link_entries() {
            trajviz_print(&format!("Link {} {} ---> ", e.link_idx, e.link_name), PrintMode::Print, PrintColor::Blue, true);
            trajviz_print(&format!("{:?}", e.pose.as_ref().map(|p| p.translation())), PrintMode::Print, PrintColor::None, false);
            trajviz_print_new_line();
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotFKResultLinkEntry {
    link_idx: usize,
    link_name: String,
    pose: Option<ImplicitDualQuaternion>
}
impl RobotFKResultLinkEntry {
    pub fn link_idx(&self) -> usize {
        self.link_idx
    }
    pub fn link_name(&self) -> &str {
        &self.link_name
    }
    pub fn pose(&self) -> &Option<ImplicitDualQuaternion> {
        &self.pose
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RobotCoMResult {
    position: Vector3<f64>,
    total_mass: f64
}
impl RobotCoMResult {
    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }
    pub fn total_mass(&self) -> f64 {
        self.total_mass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    const ARM_URDF: &str = r#"<robot name="arm">
        <link name="base"><inertial><mass value="2.0"/><inertia ixx="1" ixy="0" ixz="0" iyy="1" iyz="0" izz="1"/></inertial></link>
        <link name="upper"><inertial><origin xyz="0.5 0 0" rpy="0 0 0"/><mass value="2.0"/><inertia ixx="1" ixy="0" ixz="0" iyy="1" iyz="0" izz="1"/></inertial></link>
        <joint name="shoulder" type="revolute">
            <parent link="base"/><child link="upper"/><origin xyz="0 0 1" rpy="0 0 0"/><axis xyz="0 0 1"/>
            <limit lower="-3" upper="3" effort="1" velocity="1"/>
        </joint>
    </robot>"#;

    #[test]
    fn fk_rotates_child_link() {
        let robot_kinematics_module = RobotKinematicsModule::new_from_urdf_string(ARM_URDF, BaseMobilityMode::Fixed).unwrap();
        let fk_res = robot_kinematics_module.compute_fk(&DVector::from_vec(vec![FRAC_PI_2])).unwrap();
        let upper_idx = robot_kinematics_module.robot_model_module().get_link_idx_from_name("upper").unwrap();
        let pose = fk_res.get_pose_from_link_idx(upper_idx).unwrap();
        assert_relative_eq!(pose.translation(), &Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-12);
        assert_relative_eq!(pose.multiply_by_vector3(&Vector3::new(0.5, 0.0, 0.0)), Vector3::new(0.0, 0.5, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn com_is_mass_weighted_average() {
        let mut robot_kinematics_module = RobotKinematicsModule::new_from_urdf_string(ARM_URDF, BaseMobilityMode::Fixed).unwrap();
        let com = robot_kinematics_module.compute_com(&DVector::from_vec(vec![0.0])).unwrap();
        assert_relative_eq!(com.position(), &Vector3::new(0.25, 0.0, 0.5), epsilon = 1e-12);
        assert_relative_eq!(com.total_mass(), 4.0);

        let com = robot_kinematics_module.compute_com(&DVector::from_vec(vec![FRAC_PI_2])).unwrap();
        assert_relative_eq!(com.position(), &Vector3::new(0.0, 0.25, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn floating_base_translates_com() {
        let mut robot_kinematics_module = RobotKinematicsModule::new_from_urdf_string(ARM_URDF, BaseMobilityMode::Floating).unwrap();
        assert_eq!(robot_kinematics_module.num_dofs(), 7);
        let q = DVector::from_vec(vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0]);
        let com = robot_kinematics_module.compute_com(&q).unwrap();
        assert_relative_eq!(com.position(), &Vector3::new(1.25, 2.0, 3.5), epsilon = 1e-12);
    }

    #[test]
    fn wrong_length_is_dimension_mismatch() {
        let mut robot_kinematics_module = RobotKinematicsModule::new_from_urdf_string(ARM_URDF, BaseMobilityMode::Floating).unwrap();
        let err = robot_kinematics_module.compute_com(&DVector::zeros(6)).unwrap_err();
        assert!(matches!(err, TrajvizError::DimensionMismatch(_)));
        // scratch buffer survives a failed call
        assert!(robot_kinematics_module.compute_com(&DVector::zeros(7)).is_ok());
    }

    #[test]
    fn massless_model_has_no_com() {
        let urdf = r#"<robot name="ghost"><link name="a"/></robot>"#;
        let mut robot_kinematics_module = RobotKinematicsModule::new_from_urdf_string(urdf, BaseMobilityMode::Fixed).unwrap();
        let err = robot_kinematics_module.compute_com(&DVector::zeros(0)).unwrap_err();
        assert!(matches!(err, TrajvizError::GenericError(_)));
    }
}
