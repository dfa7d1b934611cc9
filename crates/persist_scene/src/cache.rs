//! Snapshots of inactive scenes.

use std::collections::BTreeMap;
use std::sync::Arc;

use persist_codec::{CodecError, Reader, Writer};
use persist_core::{PersistError, Registry, Snapshot};

/// Root snapshots per scene name.
///
/// Scenes are kept in name order, which is also the order they are written
/// in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotCache {
    scenes: BTreeMap<String, Vec<Snapshot>>,
}

impl SnapshotCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cached roots of a scene.
    pub fn store(&mut self, scene: impl Into<String>, roots: Vec<Snapshot>) {
        self.scenes.insert(scene.into(), roots);
    }

    /// Add one root to a scene, creating its entry if needed.
    pub fn append(&mut self, scene: impl Into<String>, snapshot: Snapshot) {
        self.scenes.entry(scene.into()).or_default().push(snapshot);
    }

    /// Remove and return a scene's roots. Empty if nothing was cached.
    pub fn take(&mut self, scene: &str) -> Vec<Snapshot> {
        self.scenes.remove(scene).unwrap_or_default()
    }

    #[must_use]
    pub fn get(&self, scene: &str) -> Option<&[Snapshot]> {
        self.scenes.get(scene).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, scene: &str) -> bool {
        self.scenes.contains_key(scene)
    }

    pub fn scenes(&self) -> impl Iterator<Item = &str> {
        self.scenes.keys().map(String::as_str)
    }

    /// Whether an entry of `scene`, at any depth, carries `stable_id`.
    #[must_use]
    pub fn holds_stable_id(&self, scene: &str, stable_id: &str) -> bool {
        self.scenes.get(scene).is_some_and(|roots| {
            roots
                .iter()
                .any(|root| root.stable_ids().contains(&stable_id))
        })
    }

    /// Number of scenes with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// # Errors
    ///
    /// Returns [`CodecError::TooLong`] if a count or string does not fit.
    pub fn write_to(&self, writer: &mut Writer) -> Result<(), CodecError> {
        writer.write_len("scene count", self.scenes.len())?;
        for (scene, roots) in &self.scenes {
            writer.write_string(scene)?;
            writer.write_len("root count", roots.len())?;
            for root in roots {
                root.write_to(writer)?;
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Any decode error. Entity bodies are not decoded; see
    /// [`validate`](Self::validate).
    pub fn read_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let mut cache = Self::new();
        for _ in 0..reader.read_len()? {
            let scene = reader.read_string()?;
            let count = reader.read_len()?;
            let mut roots = Vec::with_capacity(count);
            for _ in 0..count {
                roots.push(Snapshot::read_from(reader)?);
            }
            cache.scenes.insert(scene, roots);
        }
        Ok(cache)
    }

    /// Decode every entity body in the cache without touching live state.
    ///
    /// # Errors
    ///
    /// The first decode error found.
    pub fn validate(&self, registry: &Arc<Registry>) -> Result<(), PersistError> {
        self.scenes
            .values()
            .flatten()
            .try_for_each(|snapshot| snapshot.validate(registry))
    }
}
