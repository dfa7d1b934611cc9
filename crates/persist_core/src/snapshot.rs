//! Serialized entity subtrees.
//!
//! A [`Snapshot`] is what survives an entity leaving the live world: moved to
//! another scene, cached when its scene closes, or written to a save file. It
//! holds the entity's identity, its body (see [`World::save_body`]) as an
//! opaque versioned blob, and the snapshots of its children.

use std::sync::Arc;

use persist_codec::{CodecError, Reader, Writer};
use tracing::{debug, warn};

use crate::entity::EntityId;
use crate::error::PersistError;
use crate::registry::Registry;
use crate::template::TemplateCatalog;
use crate::world::World;

/// A recursive, serializable representation of an entity subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub template_id: String,
    pub stable_id: Option<String>,
    /// The entity body, including its own version header.
    pub data: Vec<u8>,
    pub children: Vec<Snapshot>,
}

impl Snapshot {
    /// Capture `id` and all of its descendants, depth-first.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnknownEntity`], or any error raised while
    /// saving a component.
    pub fn capture(world: &World, id: EntityId) -> Result<Self, PersistError> {
        let template_id = world
            .template_id(id)
            .ok_or(PersistError::UnknownEntity(id))?
            .to_owned();
        let children = world
            .children(id)
            .iter()
            .map(|&child| Self::capture(world, child))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            template_id,
            stable_id: world.stable_id(id).map(str::to_owned),
            data: world.save_body(id)?,
            children,
        })
    }

    /// Recreate the subtree in `world`, as a root or under `parent`.
    ///
    /// Returns `Ok(None)` if the entry's template is unknown; the entry's
    /// descendants are skipped with it. Child entries whose stable id names a
    /// live entity re-home and refresh that entity instead of creating a
    /// second one, as in [`apply_to`](Self::apply_to).
    ///
    /// # Errors
    ///
    /// Any decode error. The entry that failed is despawned; entries
    /// instantiated before it are kept.
    pub fn instantiate(
        &self,
        world: &mut World,
        parent: Option<EntityId>,
    ) -> Result<Option<EntityId>, PersistError> {
        let mut reader = Reader::new(&self.data)?;
        let Some(id) =
            world.instantiate_from(&self.template_id, self.stable_id.clone(), &mut reader, parent)?
        else {
            return Ok(None);
        };
        if let Err(err) = reader.finish() {
            world.despawn(id);
            return Err(err.into());
        }

        self.restore_children(world, id)?;
        Ok(Some(id))
    }

    /// Refresh the live entity `id` in place from this entry.
    ///
    /// Child entries whose stable id names a live entity refresh that entity,
    /// moving it under `id` if it lives elsewhere; the others are
    /// instantiated under `id`.
    ///
    /// # Errors
    ///
    /// Any decode error.
    pub fn apply_to(&self, world: &mut World, id: EntityId) -> Result<(), PersistError> {
        if world.template_id(id) != Some(self.template_id.as_str()) {
            warn!(
                entity = %id,
                live = ?world.template_id(id),
                saved = %self.template_id,
                "template mismatch while applying snapshot"
            );
        }

        let mut reader = Reader::new(&self.data)?;
        world.load_into(id, &mut reader)?;
        reader.finish()?;
        debug!(entity = %id, stable_id = ?self.stable_id, "applied snapshot in place");
        self.restore_children(world, id)
    }

    fn restore_children(&self, world: &mut World, id: EntityId) -> Result<(), PersistError> {
        for child in &self.children {
            match child
                .stable_id
                .as_deref()
                .and_then(|stable_id| world.find_by_stable_id(stable_id))
            {
                Some(existing) => {
                    if world.parent(existing) != Some(id) {
                        world.detach(existing)?;
                        world.attach(existing, id)?;
                    }
                    child.apply_to(world, existing)?;
                }
                None => {
                    child.instantiate(world, Some(id))?;
                }
            }
        }
        Ok(())
    }

    /// Decode every body in the subtree into a scratch world.
    ///
    /// Catches version mismatches, unknown tags, and truncated or
    /// over-long bodies without touching any live state. Template ids are
    /// not checked; unknown templates are skipped at instantiation.
    ///
    /// # Errors
    ///
    /// The first decode error found.
    pub fn validate(&self, registry: &Arc<Registry>) -> Result<(), PersistError> {
        let mut scratch = World::new(Arc::clone(registry), Arc::new(TemplateCatalog::new()));
        self.validate_into(&mut scratch, None)
    }

    fn validate_into(
        &self,
        scratch: &mut World,
        parent: Option<EntityId>,
    ) -> Result<(), PersistError> {
        let id = scratch.spawn(self.template_id.as_str(), None, parent)?;
        let mut reader = Reader::new(&self.data)?;
        scratch.load_into(id, &mut reader)?;
        reader.finish()?;
        for child in &self.children {
            child.validate_into(scratch, Some(id))?;
        }
        Ok(())
    }

    /// Stable ids carried by the subtree, depth-first.
    #[must_use]
    pub fn stable_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.collect_stable_ids(&mut ids);
        ids
    }

    fn collect_stable_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        ids.extend(self.stable_id.as_deref());
        for child in &self.children {
            child.collect_stable_ids(ids);
        }
    }

    /// Number of entries in the subtree, this one included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// # Errors
    ///
    /// Returns [`CodecError::TooLong`] for an over-long id, body, or child
    /// list.
    pub fn write_to(&self, writer: &mut Writer) -> Result<(), CodecError> {
        writer.write_string(&self.template_id)?;
        match &self.stable_id {
            Some(stable_id) => {
                writer.write_bool(true);
                writer.write_string(stable_id)?;
            }
            None => writer.write_bool(false),
        }
        writer.write_bytes(&self.data)?;
        writer.write_len("child count", self.children.len())?;
        for child in &self.children {
            child.write_to(writer)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Any decode error. Bodies are not decoded; see [`validate`](Self::validate).
    pub fn read_from(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let template_id = reader.read_string()?;
        let stable_id = if reader.read_bool()? {
            Some(reader.read_string()?)
        } else {
            None
        };
        let data = reader.read_bytes()?;
        let count = reader.read_len()?;
        let mut children = Vec::with_capacity(count);
        for _ in 0..count {
            children.push(Self::read_from(reader)?);
        }
        Ok(Self {
            template_id,
            stable_id,
            data,
            children,
        })
    }
}
