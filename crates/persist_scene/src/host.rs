//! The boundary to the scene runtime.
//!
//! Loading and unloading a scene are long-running operations owned by the
//! game runtime. The orchestrator awaits them one at a time through
//! [`SceneHost`].

use std::collections::{BTreeSet, HashMap};

use futures::FutureExt;
use futures::future::BoxFuture;
use tracing::debug;

use crate::error::HostError;
use crate::layout::SceneLayout;

/// Loads and unloads named scenes.
pub trait SceneHost: Send {
    /// Load a scene and report the entities it places by itself.
    fn load_scene<'a>(&'a mut self, name: &'a str) -> BoxFuture<'a, Result<SceneLayout, HostError>>;

    /// Unload a previously loaded scene.
    fn unload_scene<'a>(&'a mut self, name: &'a str) -> BoxFuture<'a, Result<(), HostError>>;
}

/// An in-process scene host over a fixed set of layouts.
///
/// Each operation yields to the runtime once before completing, like a real
/// scene load would.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    layouts: HashMap<String, SceneLayout>,
    loaded: BTreeSet<String>,
}

impl MemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse layouts from a JSON object mapping scene names to layouts.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidLayouts`] for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, HostError> {
        Ok(Self {
            layouts: serde_json::from_str(json)?,
            loaded: BTreeSet::new(),
        })
    }

    /// Add or replace a scene.
    pub fn insert_scene(&mut self, name: impl Into<String>, layout: SceneLayout) {
        self.layouts.insert(name.into(), layout);
    }

    #[must_use]
    pub fn is_loaded(&self, name: &str) -> bool {
        self.loaded.contains(name)
    }

    /// Names of the scenes currently loaded.
    pub fn loaded_scenes(&self) -> impl Iterator<Item = &str> {
        self.loaded.iter().map(String::as_str)
    }
}

impl SceneHost for MemoryHost {
    fn load_scene<'a>(&'a mut self, name: &'a str) -> BoxFuture<'a, Result<SceneLayout, HostError>> {
        async move {
            tokio::task::yield_now().await;
            let Some(layout) = self.layouts.get(name).cloned() else {
                return Err(HostError::UnknownScene(name.to_owned()));
            };
            self.loaded.insert(name.to_owned());
            debug!(scene = name, entities = layout.entity_count(), "host loaded scene");
            Ok(layout)
        }
        .boxed()
    }

    fn unload_scene<'a>(&'a mut self, name: &'a str) -> BoxFuture<'a, Result<(), HostError>> {
        async move {
            tokio::task::yield_now().await;
            if !self.loaded.remove(name) {
                return Err(HostError::NotLoaded(name.to_owned()));
            }
            debug!(scene = name, "host unloaded scene");
            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_and_unload() {
        let mut host = MemoryHost::from_json(r#"{ "cave": { "entities": [] } }"#).unwrap();
        host.load_scene("cave").await.unwrap();
        assert!(host.is_loaded("cave"));
        host.unload_scene("cave").await.unwrap();
        assert!(!host.is_loaded("cave"));
    }

    #[tokio::test]
    async fn test_unknown_scene() {
        let mut host = MemoryHost::new();
        assert!(matches!(
            host.load_scene("atlantis").await,
            Err(HostError::UnknownScene(name)) if name == "atlantis"
        ));
        assert_eq!(host.loaded_scenes().count(), 0);
    }

    #[tokio::test]
    async fn test_unload_requires_load() {
        let mut host = MemoryHost::new();
        host.insert_scene("cave", SceneLayout::default());
        assert!(matches!(
            host.unload_scene("cave").await,
            Err(HostError::NotLoaded(_))
        ));
    }

    #[test]
    fn test_invalid_layouts() {
        assert!(matches!(
            MemoryHost::from_json("[]"),
            Err(HostError::InvalidLayouts(_))
        ));
    }
}
