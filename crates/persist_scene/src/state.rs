//! Scene lifecycle state.

use std::fmt;

/// Where the orchestrator is in the scene lifecycle.
///
/// ```text
/// NoActiveScene -> Loading -> Active -> Closing -> NoActiveScene
/// ```
///
/// `Loading` and `Closing` are only observable while a transition is
/// suspended on the scene host.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SceneState {
    #[default]
    NoActiveScene,
    Loading(String),
    Active(String),
    Closing(String),
}

impl SceneState {
    /// The scene this state refers to, if any.
    #[must_use]
    pub fn scene(&self) -> Option<&str> {
        match self {
            Self::NoActiveScene => None,
            Self::Loading(name) | Self::Active(name) | Self::Closing(name) => Some(name),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

impl fmt::Display for SceneState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActiveScene => write!(f, "no active scene"),
            Self::Loading(name) => write!(f, "scene '{name}' loading"),
            Self::Active(name) => write!(f, "scene '{name}' active"),
            Self::Closing(name) => write!(f, "scene '{name}' closing"),
        }
    }
}
