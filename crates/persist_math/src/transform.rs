//! Transform and physics snapshots.
//!
//! [`Transform`] is the position and rotation of an entity. [`PhysicsState`]
//! is the optional rigid-body state (linear and angular velocity) of an
//! entity that carries a physics body. Both are plain values: the engine
//! copies them out of the live scene when saving and writes them back when
//! loading.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and rotation of an entity.
///
/// The game is 2D, but positions keep a `z` for draw ordering and rotations
/// are full quaternions so that saved data does not depend on the renderer's
/// conventions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Transform {
    /// World-space position.
    #[serde(default)]
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    #[serde(default = "identity_rotation")]
    pub rotation: Quat,
}

fn identity_rotation() -> Quat {
    Quat::IDENTITY
}

impl Transform {
    /// The identity transform: origin, no rotation.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    /// Create a new transform at the given position with no rotation.
    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Create a new transform with position and rotation.
    #[must_use]
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Rigid-body state of an entity with a physics body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct PhysicsState {
    /// Linear velocity in world units per second.
    pub linear_velocity: Vec3,
    /// Angular velocity around the view axis, in radians per second.
    pub angular_velocity: f32,
}

impl PhysicsState {
    /// A body at rest.
    pub const ZERO: Self = Self {
        linear_velocity: Vec3::ZERO,
        angular_velocity: 0.0,
    };

    /// Create a new physics state.
    #[must_use]
    pub fn new(linear_velocity: Vec3, angular_velocity: f32) -> Self {
        Self {
            linear_velocity,
            angular_velocity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_transform() {
        let t = Transform::IDENTITY;
        assert_eq!(t.position, Vec3::ZERO);
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(Transform::default(), t);
    }

    #[test]
    fn test_from_position() {
        let t = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_from_position_rotation() {
        let quarter = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let t = Transform::from_position_rotation(Vec3::new(5.0, 0.0, 0.0), quarter);
        assert_eq!(t.position, Vec3::new(5.0, 0.0, 0.0));
        assert!(t.rotation.abs_diff_eq(quarter, 1e-6));
    }

    #[test]
    fn test_transform_from_authored_json() {
        // Scene layouts omit rotation for unrotated entities.
        let t: Transform = serde_json::from_str(r#"{ "position": [1.0, -2.0, 0.0] }"#).unwrap();
        assert_eq!(t.position, Vec3::new(1.0, -2.0, 0.0));
        assert_eq!(t.rotation, Quat::IDENTITY);
    }
}
