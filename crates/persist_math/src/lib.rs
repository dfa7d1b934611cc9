//! # persist_math
//!
//! Spatial types for the persistence engine. Re-exports [`glam`] for linear
//! algebra and defines the per-entity state the engine reads from and writes
//! back to the physics/transform collaborators.

pub mod transform;

pub use glam::{Quat, Vec3};

pub use transform::{PhysicsState, Transform};
