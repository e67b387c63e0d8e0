use crate::math::{Quaternion, Vector3};

use crate::common::axis_angle;

#[derive(Clone, Copy)]
pub struct Transform3D {
    pub position: Vector3,
    pub scale: Vector3,
    pub rotation: Quaternion
}

impl Transform3D {
    pub fn default() -> Transform3D {
        Transform3D {
            position: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            rotation: Quaternion::identity()
        }
    }

    pub fn with_position(self: &Self, new_position: Vector3) -> Transform3D {
        Transform3D { position: new_position, ..*self }
    }

    pub fn with_rotation(self: &Self, new_rotation: Quaternion) -> Transform3D {
        Transform3D { rotation: new_rotation, ..*self }
    }

    /// Rotate about one of the transform's local axes
    pub fn rotate_local(self: &mut Self, axis: Vector3, degrees: f32) {
        self.rotation = self.rotation * axis_angle(axis, degrees);
    }
}
