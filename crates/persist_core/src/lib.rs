//! # persist_core
//!
//! The object model of the persistence engine: what can be saved, how a
//! saved type is identified, and how a live entity graph is turned into
//! snapshots and back.
//!
//! This crate provides:
//!
//! - [`PersistableComponent`]: mutable behaviour state attached to an entity.
//! - [`PersistableValue`]: immutable tagged data embedded in component state.
//! - [`Registry`]: stable string tags for both, built once at start-up.
//! - [`TemplateCatalog`]: the named blueprints entities are instantiated from.
//! - [`World`]: the arena of live entities, their components and hierarchy.
//! - [`Snapshot`]: the recursive serialized form of an entity subtree.

pub mod any;
pub mod component;
pub mod entity;
pub mod error;
pub mod registry;
pub mod snapshot;
pub mod template;
pub mod value;
pub mod world;

#[cfg(test)]
pub(crate) mod testing;

pub use any::AsAny;
pub use component::PersistableComponent;
pub use entity::{EntityAllocator, EntityId};
pub use error::PersistError;
pub use registry::{Registry, RegistryBuilder};
pub use snapshot::Snapshot;
pub use template::{Template, TemplateCatalog};
pub use value::PersistableValue;
pub use world::World;

pub use persist_codec::{CodecError, MAJOR_VERSION, Reader, Writer};
