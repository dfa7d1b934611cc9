//! # persist_scene
//!
//! Drives the persistence engine across scene boundaries.
//!
//! This crate provides:
//!
//! - [`SceneOrchestrator`]: the scene state machine: fresh starts, scene
//!   switches, moving entities between scenes, and whole-game save/load.
//! - [`SnapshotCache`]: snapshots of every inactive scene, keyed by name.
//! - [`SceneHost`]: the boundary to the runtime that actually loads and
//!   unloads scenes, with [`MemoryHost`] as an in-process implementation.
//! - [`SceneLayout`]: the entities a scene places by itself.
//!
//! ## Save file
//!
//! ```text
//! [u16 version][string active_scene][u16 scene_count]
//!   { [string scene][u16 root_count] { snapshot } x root_count } x scene_count
//! ```

pub mod cache;
pub mod error;
pub mod host;
pub mod layout;
pub mod orchestrator;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::SnapshotCache;
pub use error::{HostError, SceneError};
pub use host::{MemoryHost, SceneHost};
pub use layout::{AuthoredEntity, SceneLayout};
pub use orchestrator::SceneOrchestrator;
pub use state::SceneState;
