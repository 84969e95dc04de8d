use nalgebra::{Unit, UnitQuaternion, Vector3};
use serde::{Serialize, Deserialize};

const IDENTITY_TOLERANCE: f64 = 0.000001;

/// A representation for an SE(3) transform (translation and rotation) proposed by Neil Dantam.
/// For more details, see the IJRR paper Robust and Efficient Forward, Differential, and Inverse
/// Kinematics using Dual Quaternions.
///
/// This is the pose type used for link placements in forward kinematics and for every visual
/// primitive handed to a render engine.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ImplicitDualQuaternion {
    rotation: UnitQuaternion<f64>,
    translation: Vector3<f64>,
    is_identity: bool,
    rot_is_identity: bool,
    translation_is_zeros: bool
}
impl ImplicitDualQuaternion {
    pub fn new(rotation: UnitQuaternion<f64>, translation: Vector3<f64>) -> Self {
        let mut out_self = Self {
            rotation,
            translation,
            is_identity: false,
            rot_is_identity: false,
            translation_is_zeros: false
        };
        out_self.decide_if_identity();

        return out_self;
    }
    pub fn new_from_euler_angles(rx: f64, ry: f64, rz: f64, x: f64, y: f64, z: f64) -> Self {
        let r = UnitQuaternion::from_euler_angles(rx, ry, rz);
        let t = Vector3::new(x, y, z);
        return Self::new(r, t);
    }
    pub fn new_from_axis_angle(axis: &Unit<Vector3<f64>>, angle: f64) -> Self {
        return Self::new(UnitQuaternion::from_axis_angle(axis, angle), Vector3::zeros());
    }
    pub fn new_from_translation(translation: Vector3<f64>) -> Self {
        return Self::new(UnitQuaternion::identity(), translation);
    }
    pub fn new_identity() -> Self {
        return Self::new(UnitQuaternion::identity(), Vector3::zeros());
    }
    fn decide_if_identity(&mut self) {
        let q = self.rotation.quaternion();
        self.rot_is_identity = (q.w.abs() - 1.0).abs() < IDENTITY_TOLERANCE && q.i.abs() < IDENTITY_TOLERANCE && q.j.abs() < IDENTITY_TOLERANCE && q.k.abs() < IDENTITY_TOLERANCE;
        self.translation_is_zeros = self.translation.iter().all(|t| t.abs() < IDENTITY_TOLERANCE);
        self.is_identity = self.rot_is_identity && self.translation_is_zeros;
    }
    ////////////////////////////////////////////////////////////////////////////////////////////////
    /// Returns a reference to the rotation component of the implicit dual quaternion.
    pub fn rotation(&self) -> &UnitQuaternion<f64> { &self.rotation }
    /// Returns a reference to the translation component of the implicit dual quaternion.
    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }
    pub fn is_identity(&self) -> bool {
        self.is_identity
    }
    ////////////////////////////////////////////////////////////////////////////////////////////////
    pub fn multiply(&self, other: &ImplicitDualQuaternion) -> ImplicitDualQuaternion {
        let out_rot = self.rotation * other.rotation;
        let out_translation = self.rotation * other.translation + self.translation;
        return ImplicitDualQuaternion::new(out_rot, out_translation);
    }
    /// Same result as `multiply`, skipping the quaternion products that identity parts make
    /// unnecessary.  Forward kinematics composes mostly pure rotations and pure translations.
    pub fn multiply_shortcircuit(&self, other: &ImplicitDualQuaternion) -> ImplicitDualQuaternion {
        if self.is_identity { return other.clone(); }
        if other.is_identity { return self.clone(); }

        let out_rot = if self.rot_is_identity {
            other.rotation
        } else if other.rot_is_identity {
            self.rotation
        } else {
            self.rotation * other.rotation
        };

        let out_translation = if other.translation_is_zeros {
            self.translation
        } else if self.rot_is_identity {
            self.translation + other.translation
        } else {
            self.rotation * other.translation + self.translation
        };

        return ImplicitDualQuaternion::new(out_rot, out_translation);
    }
    pub fn multiply_by_vector3(&self, point: &Vector3<f64>) -> Vector3<f64> {
        return self.rotation * point + self.translation;
    }
    pub fn multiply_by_vector3_shortcircuit(&self, point: &Vector3<f64>) -> Vector3<f64> {
        if self.is_identity { return point.clone(); }
        if self.rot_is_identity { return point + self.translation; }
        if self.translation_is_zeros { return self.rotation * point; }
        return self.rotation * point + self.translation;
    }
    pub fn inverse(&self) -> ImplicitDualQuaternion {
        let new_quat = self.rotation.inverse();
        let new_translation = new_quat * -self.translation;
        return ImplicitDualQuaternion::new(new_quat, new_translation);
    }
}
impl Default for ImplicitDualQuaternion {
    fn default() -> Self {
        Self::new_identity()
    }
}
