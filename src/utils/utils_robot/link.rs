use serde::{Serialize, Deserialize};
use crate::utils::utils_robot::urdf_link::URDFLink;

/// A Link holds all necessary information about a robot link (specified by a robot URDF file)
/// in order to do kinematic and mass computations on a robot model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Link {
    name: String,
    link_idx: usize,
    preceding_link_idx: Option<usize>,
    children_link_idxs: Vec<usize>,
    preceding_joint_idx: Option<usize>,
    children_joint_idxs: Vec<usize>,
    is_virtual_base_link: bool,
    urdf_link: URDFLink,
}
impl Link {
    pub fn new(urdf_link: URDFLink, link_idx: usize) -> Self {
        Self {
            name: urdf_link.name().to_string(),
            link_idx,
            preceding_link_idx: None,
            children_link_idxs: vec![],
            preceding_joint_idx: None,
            children_joint_idxs: vec![],
            is_virtual_base_link: false,
            urdf_link
        }
    }
    /// Returns the massless world link that a floating base hangs from.
    pub fn new_virtual_base_link(link_idx: usize) -> Self {
        let mut out_self = Self::new(URDFLink::new_empty("__floating_base_world"), link_idx);
        out_self.is_virtual_base_link = true;
        out_self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn link_idx(&self) -> usize {
        self.link_idx
    }
    pub fn preceding_link_idx(&self) -> Option<usize> {
        self.preceding_link_idx
    }
    pub fn children_link_idxs(&self) -> &Vec<usize> {
        &self.children_link_idxs
    }
    pub fn preceding_joint_idx(&self) -> Option<usize> {
        self.preceding_joint_idx
    }
    pub fn children_joint_idxs(&self) -> &Vec<usize> {
        &self.children_joint_idxs
    }
    pub fn is_virtual_base_link(&self) -> bool {
        self.is_virtual_base_link
    }
    pub fn urdf_link(&self) -> &URDFLink {
        &self.urdf_link
    }
    pub fn mass(&self) -> f64 {
        self.urdf_link.inertial_mass()
    }
    pub fn set_preceding_link_idx(&mut self, preceding_link_idx: Option<usize>) {
        self.preceding_link_idx = preceding_link_idx;
    }
    pub fn set_preceding_joint_idx(&mut self, preceding_joint_idx: Option<usize>) {
        self.preceding_joint_idx = preceding_joint_idx;
    }
    pub fn add_child_joint_idx(&mut self, idx: usize) {
        self.children_joint_idxs.push(idx);
    }
    pub fn add_child_link_idx(&mut self, idx: usize) {
        self.children_link_idxs.push(idx);
    }
}
