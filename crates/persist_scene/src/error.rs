//! Scene-layer error types.

use persist_codec::CodecError;
use persist_core::PersistError;

use crate::state::SceneState;

/// Errors reported by a [`crate::SceneHost`].
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// No scene with this name exists.
    #[error("unknown scene '{0}'")]
    UnknownScene(String),

    /// The scene is not loaded, so it cannot be unloaded.
    #[error("scene '{0}' is not loaded")]
    NotLoaded(String),

    /// Scene layouts could not be parsed.
    #[error("invalid scene layouts: {0}")]
    InvalidLayouts(#[from] serde_json::Error),
}

/// Errors raised by the [`crate::SceneOrchestrator`].
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The scene runtime failed to load or unload a scene.
    #[error("scene host error: {0}")]
    Host(#[from] HostError),

    /// The operation is not valid in the orchestrator's current state.
    #[error("cannot {operation} with {state}")]
    InvalidState {
        operation: &'static str,
        state: SceneState,
    },

    /// An entity cannot be moved into the scene it is already in.
    #[error("entity is already in scene '{0}'")]
    SameScene(String),
}
