//! Object-model error types.

use persist_codec::CodecError;

use crate::entity::EntityId;

/// Errors raised while registering, saving, loading, or restructuring
/// persistable state.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The underlying byte stream could not be read or written.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A component tag was registered twice.
    #[error("component tag '{0}' is already registered")]
    DuplicateComponentTag(&'static str),

    /// A component type was registered twice.
    #[error("component type {0} is already registered")]
    DuplicateComponentType(&'static str),

    /// A value tag was registered twice.
    #[error("value tag '{0}' is already registered")]
    DuplicateValueTag(&'static str),

    /// A value type was registered twice.
    #[error("value type {0} is already registered")]
    DuplicateValueType(&'static str),

    /// A component type was used without being registered.
    #[error("type {0} is not registered as a persistable component")]
    UnregisteredComponent(&'static str),

    /// A value type was used without being registered.
    #[error("type {0} is not registered as a persistable value")]
    UnregisteredValue(&'static str),

    /// A stream named a component tag this build does not know.
    #[error("unknown component tag '{0}'")]
    UnknownComponentTag(String),

    /// A stream named a value tag this build does not know.
    #[error("unknown value tag '{0}'")]
    UnknownValueTag(String),

    /// A value was decoded but is not of the type the caller asked for.
    #[error("value tagged '{tag}' is not a {expected}")]
    ValueTypeMismatch {
        /// The tag found in the stream.
        tag: &'static str,
        /// The type the caller expected.
        expected: &'static str,
    },

    /// Two templates share an id.
    #[error("template '{0}' is already defined")]
    DuplicateTemplate(String),

    /// A template catalog could not be parsed.
    #[error("invalid template catalog: {0}")]
    InvalidCatalog(#[from] serde_json::Error),

    /// The entity handle does not refer to a live entity.
    #[error("{0} does not exist")]
    UnknownEntity(EntityId),

    /// The entity already has a parent and must be detached first.
    #[error("{0} already has a parent; detach it first")]
    AlreadyParented(EntityId),

    /// The operation requires a root entity.
    #[error("{0} is not a root entity")]
    NotRoot(EntityId),

    /// Attaching would make an entity its own ancestor.
    #[error("attaching {child} to {parent} would create a cycle")]
    Cycle {
        /// The entity being attached.
        child: EntityId,
        /// The requested parent.
        parent: EntityId,
    },

    /// Another live entity already uses this stable id.
    #[error("stable id '{0}' is already used in this scene")]
    DuplicateStableId(String),
}
