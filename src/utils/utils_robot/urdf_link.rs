use urdf_rs::*;
use nalgebra::Vector3;
use serde::{Serialize, Deserialize};
use crate::utils::utils_se3::implicit_dual_quaternion::ImplicitDualQuaternion;

/// This struct holds the information provided by a URDF file on a Link when parsed by urdf_rs
/// that the display needs: inertial data for center of mass computation and the origin of the
/// first visual and collision element, relative to the link frame, for the robot visual.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct URDFLink {
    name: String,
    inertial_origin_xyz: Vector3<f64>,
    inertial_mass: f64,
    visual_origin: Option<ImplicitDualQuaternion>,
    collision_origin: Option<ImplicitDualQuaternion>
}
impl URDFLink {
    pub fn new_from_urdf_link(link: &Link) -> Self {
        Self {
            name: link.name.clone(),
            inertial_origin_xyz: vector3_from(&link.inertial.origin.xyz),
            inertial_mass: link.inertial.mass.value,
            visual_origin: link.visual.first().map(|v| pose_from(&v.origin)),
            collision_origin: link.collision.first().map(|c| pose_from(&c.origin))
        }
    }
    /// A massless link without geometry.  Used for the virtual world link of a floating base.
    pub fn new_empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inertial_origin_xyz: Default::default(),
            inertial_mass: 0.0,
            visual_origin: None,
            collision_origin: None
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn inertial_origin_xyz(&self) -> Vector3<f64> {
        self.inertial_origin_xyz
    }
    pub fn inertial_mass(&self) -> f64 {
        self.inertial_mass
    }
    pub fn visual_origin(&self) -> Option<&ImplicitDualQuaternion> {
        self.visual_origin.as_ref()
    }
    pub fn collision_origin(&self) -> Option<&ImplicitDualQuaternion> {
        self.collision_origin.as_ref()
    }
}

fn vector3_from(v: &[f64]) -> Vector3<f64> {
    Vector3::new(v[0], v[1], v[2])
}

fn pose_from(pose: &Pose) -> ImplicitDualQuaternion {
    ImplicitDualQuaternion::new_from_euler_angles(pose.rpy[0], pose.rpy[1], pose.rpy[2], pose.xyz[0], pose.xyz[1], pose.xyz[2])
}
