use itertools::Itertools;
use nalgebra::{DVector, UnitQuaternion, Vector3};
use serde::{Serialize, Deserialize};

/// A whole-body trajectory: an ordered sequence of time-stamped whole-body states.
///
/// The last sample is treated as the target posture.  A message is immutable once it is handed
/// to a display.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct WholeBodyTrajectory {
    trajectory: Vec<WholeBodyState>
}
impl WholeBodyTrajectory {
    pub fn new(trajectory: Vec<WholeBodyState>) -> Self {
        Self { trajectory }
    }
    pub fn trajectory(&self) -> &Vec<WholeBodyState> {
        &self.trajectory
    }
    pub fn latest_state(&self) -> Option<&WholeBodyState> {
        self.trajectory.last()
    }
    pub fn num_samples(&self) -> usize {
        self.trajectory.len()
    }
    /// Names of every contact that appears anywhere in the trajectory, in order of first appearance.
    pub fn contact_names(&self) -> Vec<String> {
        self.trajectory.iter()
            .flat_map(|s| s.contacts().iter().map(|c| c.name().to_string()))
            .unique()
            .collect()
    }
}

/// The state of the whole body at one instant.
///
/// `posture` is the full configuration vector, floating base degrees of freedom first.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WholeBodyState {
    time: f64,
    posture: DVector<f64>,
    #[serde(default)]
    com_position: Option<Vector3<f64>>,
    #[serde(default)]
    base_orientation: Option<UnitQuaternion<f64>>,
    #[serde(default)]
    contacts: Vec<ContactState>
}
impl WholeBodyState {
    pub fn new(time: f64, posture: DVector<f64>) -> Self {
        Self {
            time,
            posture,
            com_position: None,
            base_orientation: None,
            contacts: vec![]
        }
    }
    pub fn with_com_position(mut self, com_position: Vector3<f64>) -> Self {
        self.com_position = Some(com_position);
        self
    }
    pub fn with_base_orientation(mut self, base_orientation: UnitQuaternion<f64>) -> Self {
        self.base_orientation = Some(base_orientation);
        self
    }
    pub fn with_contact(mut self, contact: ContactState) -> Self {
        self.contacts.push(contact);
        self
    }
    pub fn time(&self) -> f64 {
        self.time
    }
    pub fn posture(&self) -> &DVector<f64> {
        &self.posture
    }
    pub fn com_position(&self) -> Option<&Vector3<f64>> {
        self.com_position.as_ref()
    }
    pub fn base_orientation(&self) -> Option<&UnitQuaternion<f64>> {
        self.base_orientation.as_ref()
    }
    pub fn contacts(&self) -> &Vec<ContactState> {
        &self.contacts
    }
    pub fn get_contact(&self, name: &str) -> Option<&ContactState> {
        self.contacts.iter().find(|c| c.name() == name)
    }
}

/// A point of interaction between the body and the environment at one instant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ContactState {
    name: String,
    position: Vector3<f64>,
    #[serde(default)]
    orientation: Option<UnitQuaternion<f64>>,
    active: bool,
    #[serde(default)]
    force: Option<Vector3<f64>>
}
impl ContactState {
    pub fn new(name: &str, position: Vector3<f64>, active: bool) -> Self {
        Self {
            name: name.to_string(),
            position,
            orientation: None,
            active,
            force: None
        }
    }
    pub fn with_orientation(mut self, orientation: UnitQuaternion<f64>) -> Self {
        self.orientation = Some(orientation);
        self
    }
    pub fn with_force(mut self, force: Vector3<f64>) -> Self {
        self.force = Some(force);
        self
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn position(&self) -> &Vector3<f64> {
        &self.position
    }
    pub fn orientation(&self) -> Option<&UnitQuaternion<f64>> {
        self.orientation.as_ref()
    }
    pub fn active(&self) -> bool {
        self.active
    }
    pub fn force(&self) -> Option<&Vector3<f64>> {
        self.force.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::utils_traits::ToAndFromJsonString;

    #[test]
    fn contact_names_keep_first_appearance_order() {
        let t = WholeBodyTrajectory::new(vec![
            WholeBodyState::new(0.0, DVector::zeros(6)).with_contact(ContactState::new("rf", Vector3::zeros(), true)),
            WholeBodyState::new(0.1, DVector::zeros(6))
                .with_contact(ContactState::new("lf", Vector3::zeros(), true))
                .with_contact(ContactState::new("rf", Vector3::zeros(), false)),
        ]);
        assert_eq!(t.contact_names(), vec!["rf".to_string(), "lf".to_string()]);
        assert_eq!(t.latest_state().unwrap().time(), 0.1);
    }

    #[test]
    fn json_transport_preserves_contacts_and_forces() {
        let t = WholeBodyTrajectory::new(vec![
            WholeBodyState::new(0.0, DVector::from_vec(vec![0.0, 0.1, 0.2, 0.0, 0.0, 0.0]))
                .with_com_position(Vector3::new(0.0, 0.0, 0.9))
                .with_contact(ContactState::new("lf", Vector3::new(0.0, 0.1, 0.0), true).with_force(Vector3::new(0.0, 0.0, 300.0))),
        ]);
        let loaded = WholeBodyTrajectory::load_from_json_string(&t.to_json_string()).unwrap();
        assert_eq!(loaded, t);
        assert_eq!(loaded.latest_state().unwrap().get_contact("lf").unwrap().force(), Some(&Vector3::new(0.0, 0.0, 300.0)));
    }
}
