use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use strum_macros::EnumIter;
use crate::utils::utils_console::{trajviz_print, trajviz_print_new_line, PrintColor, PrintMode};
use crate::utils::utils_errors::TrajvizError;
use crate::utils::utils_robot::joint::Joint;
use crate::utils::utils_robot::link::Link;
use crate::utils::utils_robot::urdf_joint::URDFJoint;
use crate::utils::utils_robot::urdf_link::URDFLink;

/// The `RobotModelModule` is the parsed link/joint tree of a robot description.
///
/// It is built from URDF text together with a base convention: a `Fixed` base hangs the
/// description's root link at the world origin, while a `Floating` base inserts a virtual world
/// link and a 6-DOF connector joint whose axes take the first six entries of every configuration
/// vector.  The remaining entries follow the joints in the order they appear in the description.
///
/// # Example
/// ```
/// use trajviz::robot_modules::robot_model_module::{BaseMobilityMode, RobotModelModule};
///
/// let urdf = r#"<robot name="stick">
///     <link name="base"><inertial><mass value="1.0"/><inertia ixx="0" ixy="0" ixz="0" iyy="0" iyz="0" izz="0"/></inertial></link>
///     <link name="tip"/>
///     <joint name="j0" type="revolute">
///         <parent link="base"/><child link="tip"/><axis xyz="0 0 1"/>
///         <limit lower="-1" upper="1" effort="1" velocity="1"/>
///     </joint>
/// </robot>"#;
///
/// let model = RobotModelModule::new_from_urdf_string(urdf, BaseMobilityMode::Floating).expect("error");
/// assert_eq!(model.num_dofs(), 7);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RobotModelModule {
    robot_name: String,
    links: Vec<Link>,
    joints: Vec<Joint>,
    world_link_idx: usize,
    robot_base_link_idx: usize,
    base_mobility_mode: BaseMobilityMode,
    link_tree_traversal_layers: Vec<Vec<usize>>,
    joint_idx_to_configuration_idxs: Vec<Vec<usize>>,
    num_dofs: usize,
    link_name_to_idx_hashmap: HashMap<String, usize>,
    joint_name_to_idx_hashmap: HashMap<String, usize>
}
impl RobotModelModule {
    pub fn new_from_urdf_string(robot_description: &str, base_mobility_mode: BaseMobilityMode) -> Result<Self, TrajvizError> {
        let urdf_robot = urdf_rs::read_from_string(robot_description).map_err(|e| {
            TrajvizError::new_malformed_model_description_error(&format!("Error when parsing urdf: {}", e), file!(), line!())
        })?;

        let mut links = vec![];
        let mut joints = vec![];
        let mut link_name_to_idx_hashmap = HashMap::new();
        let mut joint_name_to_idx_hashmap = HashMap::new();

        for (i, l) in urdf_robot.links.iter().enumerate() {
            if link_name_to_idx_hashmap.insert(l.name.clone(), i).is_some() {
                return Err(TrajvizError::new_malformed_model_description_error(&format!("Link name {:?} appears more than once.", l.name), file!(), line!()));
            }
            links.push(Link::new(URDFLink::new_from_urdf_link(l), i));
        }
        for (i, j) in urdf_robot.joints.iter().enumerate() {
            if joint_name_to_idx_hashmap.insert(j.name.clone(), i).is_some() {
                return Err(TrajvizError::new_malformed_model_description_error(&format!("Joint name {:?} appears more than once.", j.name), file!(), line!()));
            }
            joints.push(Joint::new(URDFJoint::new_from_urdf_joint(j), i)?);
        }

        if links.is_empty() {
            return Err(TrajvizError::new_malformed_model_description_error("Robot description has no links.", file!(), line!()));
        }

        let mut out_self = Self {
            robot_name: urdf_robot.name.clone(),
            links,
            joints,
            world_link_idx: 0,
            robot_base_link_idx: 0,
            base_mobility_mode,
            link_tree_traversal_layers: vec![],
            joint_idx_to_configuration_idxs: vec![],
            num_dofs: 0,
            link_name_to_idx_hashmap,
            joint_name_to_idx_hashmap
        };

        out_self.assign_all_connections()?;
        out_self.set_world_link_idx()?;
        out_self.set_link_tree_traversal_info()?;
        out_self.set_configuration_idxs();

        Ok(out_self)
    }
    fn assign_all_connections(&mut self) -> Result<(), TrajvizError> {
        for joint_idx in 0..self.joints.len() {
            let parent_name = self.joints[joint_idx].urdf_joint().parent_link().to_string();
            let child_name = self.joints[joint_idx].urdf_joint().child_link().to_string();

            let parent_idx = self.get_link_idx_from_name(&parent_name).ok_or_else(|| {
                TrajvizError::new_malformed_model_description_error(&format!("Joint {:?} names unknown parent link {:?}.", self.joints[joint_idx].name(), parent_name), file!(), line!())
            })?;
            let child_idx = self.get_link_idx_from_name(&child_name).ok_or_else(|| {
                TrajvizError::new_malformed_model_description_error(&format!("Joint {:?} names unknown child link {:?}.", self.joints[joint_idx].name(), child_name), file!(), line!())
            })?;

            if self.links[child_idx].preceding_link_idx().is_some() {
                return Err(TrajvizError::new_malformed_model_description_error(&format!("Link {:?} is the child of more than one joint.", child_name), file!(), line!()));
            }

            self.joints[joint_idx].set_preceding_link_idx(Some(parent_idx));
            self.joints[joint_idx].set_child_link_idx(Some(child_idx));
            self.links[child_idx].set_preceding_link_idx(Some(parent_idx));
            self.links[child_idx].set_preceding_joint_idx(Some(joint_idx));
            self.links[parent_idx].add_child_link_idx(child_idx);
            self.links[parent_idx].add_child_joint_idx(joint_idx);
        }

        Ok(())
    }
    fn set_world_link_idx(&mut self) -> Result<(), TrajvizError> {
        let roots: Vec<usize> = self.links.iter().filter(|l| l.preceding_link_idx().is_none()).map(|l| l.link_idx()).collect();
        if roots.len() != 1 {
            return Err(TrajvizError::new_malformed_model_description_error(&format!("Expected exactly one root link, found {}.", roots.len()), file!(), line!()));
        }
        let root_link_idx = roots[0];
        self.robot_base_link_idx = root_link_idx;

        match self.base_mobility_mode {
            BaseMobilityMode::Fixed => {
                self.world_link_idx = root_link_idx;
            }
            BaseMobilityMode::Floating => {
                let world_link_idx = self.links.len();
                let connector_joint_idx = self.joints.len();

                let mut world_link = Link::new_virtual_base_link(world_link_idx);
                world_link.add_child_link_idx(root_link_idx);
                world_link.add_child_joint_idx(connector_joint_idx);
                self.links.push(world_link);
                self.joints.push(Joint::new_floating_base_connector_joint(connector_joint_idx, world_link_idx, root_link_idx));

                self.links[root_link_idx].set_preceding_link_idx(Some(world_link_idx));
                self.links[root_link_idx].set_preceding_joint_idx(Some(connector_joint_idx));
                self.world_link_idx = world_link_idx;
            }
        }

        Ok(())
    }
    fn set_link_tree_traversal_info(&mut self) -> Result<(), TrajvizError> {
        self.link_tree_traversal_layers = vec![ vec![ self.world_link_idx ] ];

        let mut num_visited = 1;
        loop {
            let mut next_layer = vec![];
            if let Some(curr_layer) = self.link_tree_traversal_layers.last() {
                for link_idx in curr_layer {
                    next_layer.extend(self.links[*link_idx].children_link_idxs().iter().copied());
                }
            }
            if next_layer.is_empty() { break; }
            num_visited += next_layer.len();
            self.link_tree_traversal_layers.push(next_layer);
        }

        if num_visited != self.links.len() {
            return Err(TrajvizError::new_malformed_model_description_error("Link tree contains a cycle.", file!(), line!()));
        }

        Ok(())
    }
    fn set_configuration_idxs(&mut self) {
        self.joint_idx_to_configuration_idxs = vec![vec![]; self.joints.len()];

        let mut ordered_joint_idxs: Vec<usize> = self.joints.iter().filter(|j| j.is_floating_base_connector_joint()).map(|j| j.joint_idx()).collect();
        ordered_joint_idxs.extend(self.joints.iter().filter(|j| !j.is_floating_base_connector_joint()).map(|j| j.joint_idx()));

        let mut count = 0;
        for joint_idx in ordered_joint_idxs {
            for _ in 0..self.joints[joint_idx].num_dofs() {
                self.joint_idx_to_configuration_idxs[joint_idx].push(count);
                count += 1;
            }
        }
        self.num_dofs = count;
    }
    pub fn robot_name(&self) -> &str {
        &self.robot_name
    }
    pub fn links(&self) -> &Vec<Link> {
        &self.links
    }
    pub fn joints(&self) -> &Vec<Joint> {
        &self.joints
    }
    pub fn world_link_idx(&self) -> usize {
        self.world_link_idx
    }
    pub fn robot_base_link_idx(&self) -> usize {
        self.robot_base_link_idx
    }
    pub fn base_mobility_mode(&self) -> &BaseMobilityMode {
        &self.base_mobility_mode
    }
    pub fn link_tree_traversal_layers(&self) -> &Vec<Vec<usize>> {
        &self.link_tree_traversal_layers
    }
    /// Number of entries a configuration vector for this model must have.
    pub fn num_dofs(&self) -> usize {
        self.num_dofs
    }
    pub fn total_mass(&self) -> f64 {
        self.links.iter().map(|l| l.mass()).sum()
    }
    pub fn get_link_by_idx(&self, link_idx: usize) -> Result<&Link, TrajvizError> {
        TrajvizError::new_check_for_idx_out_of_bound_error(link_idx, self.links.len(), file!(), line!())?;
        Ok(&self.links[link_idx])
    }
    pub fn map_joint_idx_to_configuration_idxs(&self, joint_idx: usize) -> Result<&Vec<usize>, TrajvizError> {
        TrajvizError::new_check_for_idx_out_of_bound_error(joint_idx, self.joint_idx_to_configuration_idxs.len(), file!(), line!())?;
        Ok(&self.joint_idx_to_configuration_idxs[joint_idx])
    }
    pub fn get_link_idx_from_name(&self, link_name: &str) -> Option<usize> {
        self.link_name_to_idx_hashmap.get(link_name).copied()
    }
    pub fn get_joint_idx_from_name(&self, joint_name: &str) -> Option<usize> {
        self.joint_name_to_idx_hashmap.get(joint_name).copied()
    }
    pub fn print_summary(&self) {
        trajviz_print(&format!("Robot {:?}: {} links, {} dofs, {:?} base, total mass {:.3} kg", self.robot_name, self.links.len(), self.num_dofs, self.base_mobility_mode, self.total_mass()), PrintMode::Println, PrintColor::Cyan, true);
        for joint in &self.joints {
            joint.print_summary();
        }
        trajviz_print_new_line();
    }
}

/// Base convention used when building a model from a robot description.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, EnumIter)]
pub enum BaseMobilityMode {
    /// The description's root link sits at the world origin.
    Fixed,
    /// The root link is attached to the world through a 6-DOF virtual joint.
    Floating
}
impl Default for BaseMobilityMode {
    fn default() -> Self {
        Self::Floating
    }
}
