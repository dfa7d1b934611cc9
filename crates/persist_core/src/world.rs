//! The arena of live entities.
//!
//! The [`World`] holds every persistable entity of the active scene: its
//! identity (template id, optional stable id), transform and physics
//! snapshot, components, and place in the hierarchy.
//!
//! ## Hierarchy
//!
//! Every entity is either a root, listed in [`World::roots`], or a child,
//! listed in exactly one parent's [`World::children`]. All mutating
//! operations keep the two memberships consistent.
//!
//! ## Components
//!
//! Components live in one arena keyed by `(EntityId, tag)`. The key makes a
//! second component of the same type on one entity impossible and fixes the
//! order components are saved in, so saving the same state twice produces
//! the same bytes.
//!
//! ## Entity body
//!
//! [`World::save_body`] and [`World::load_into`] use the following layout:
//!
//! ```text
//! [u16 version][vec3 position][quat rotation]
//! [bool has_physics]([vec3 linear_velocity][float angular_velocity])?
//! [u16 component_count]{ [string tag][bool enabled]<fields> }
//! ```

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use persist_codec::{Reader, Writer};
use persist_math::{PhysicsState, Transform};
use tracing::{debug, error};

use crate::component::PersistableComponent;
use crate::entity::{EntityAllocator, EntityId};
use crate::error::PersistError;
use crate::registry::Registry;
use crate::template::TemplateCatalog;

/// A component together with the engine-owned `enabled` flag.
#[derive(Debug)]
struct ComponentSlot {
    enabled: bool,
    component: Box<dyn PersistableComponent>,
}

impl ComponentSlot {
    fn new(component: Box<dyn PersistableComponent>) -> Self {
        Self {
            enabled: true,
            component,
        }
    }

    fn component(&self) -> &dyn PersistableComponent {
        &*self.component
    }

    fn downcast_ref<T: PersistableComponent>(&self) -> Option<&T> {
        self.component().as_any().downcast_ref::<T>()
    }

    fn downcast_mut<T: PersistableComponent>(&mut self) -> Option<&mut T> {
        let component: &mut dyn PersistableComponent = &mut *self.component;
        component.as_any_mut().downcast_mut::<T>()
    }
}

#[derive(Debug)]
struct EntityRecord {
    template_id: String,
    stable_id: Option<String>,
    transform: Transform,
    physics: Option<PhysicsState>,
    parent: Option<EntityId>,
    children: Vec<EntityId>,
}

/// Live persistable entities of one scene.
#[derive(Debug)]
pub struct World {
    registry: Arc<Registry>,
    templates: Arc<TemplateCatalog>,
    allocator: EntityAllocator,
    entities: HashMap<EntityId, EntityRecord>,
    components: BTreeMap<(EntityId, &'static str), ComponentSlot>,
    roots: Vec<EntityId>,
    stable_ids: HashMap<String, EntityId>,
}

impl World {
    /// Create an empty world.
    #[must_use]
    pub fn new(registry: Arc<Registry>, templates: Arc<TemplateCatalog>) -> Self {
        Self {
            registry,
            templates,
            allocator: EntityAllocator::new(),
            entities: HashMap::new(),
            components: BTreeMap::new(),
            roots: Vec::new(),
            stable_ids: HashMap::new(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    #[must_use]
    pub fn templates(&self) -> &Arc<TemplateCatalog> {
        &self.templates
    }

    // -- Lifecycle ---------------------------------------------------------

    /// Register a bare entity, as a root or as a child of `parent`.
    ///
    /// No template lookup happens and no components are attached.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnknownEntity`] if `parent` is not live, or
    /// [`PersistError::DuplicateStableId`] if `stable_id` is taken.
    pub fn spawn(
        &mut self,
        template_id: impl Into<String>,
        stable_id: Option<String>,
        parent: Option<EntityId>,
    ) -> Result<EntityId, PersistError> {
        if let Some(parent) = parent {
            if !self.entities.contains_key(&parent) {
                return Err(PersistError::UnknownEntity(parent));
            }
        }
        if let Some(stable_id) = &stable_id {
            if self.stable_ids.contains_key(stable_id) {
                return Err(PersistError::DuplicateStableId(stable_id.clone()));
            }
        }

        let id = self.allocator.allocate();
        let template_id = template_id.into();
        debug!(entity = %id, template = %template_id, stable_id = ?stable_id, parent = ?parent, "spawned entity");

        if let Some(stable_id) = &stable_id {
            self.stable_ids.insert(stable_id.clone(), id);
        }
        match parent.and_then(|parent| self.entities.get_mut(&parent)) {
            Some(parent_record) => parent_record.children.push(id),
            None => self.roots.push(id),
        }
        self.entities.insert(
            id,
            EntityRecord {
                template_id,
                stable_id,
                transform: Transform::IDENTITY,
                physics: None,
                parent,
                children: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Instantiate a template: spawn the entity and attach the template's
    /// default components and physics body.
    ///
    /// An unknown template or a `parent` that is not a live entity is logged
    /// and yields `Ok(None)`; the caller is expected to carry on without the
    /// entity.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnknownComponentTag`] if the template names an
    /// unregistered component, or [`PersistError::DuplicateStableId`].
    pub fn instantiate(
        &mut self,
        template_id: &str,
        stable_id: Option<String>,
        parent: Option<EntityId>,
    ) -> Result<Option<EntityId>, PersistError> {
        let templates = Arc::clone(&self.templates);
        let Some(template) = templates.get(template_id) else {
            error!(template = template_id, stable_id = ?stable_id, "template does not exist; entity skipped");
            return Ok(None);
        };
        if let Some(parent) = parent {
            if !self.entities.contains_key(&parent) {
                error!(
                    template = template_id,
                    parent = %parent,
                    "every persistable entity must be a root or have a persistable parent; entity skipped"
                );
                return Ok(None);
            }
        }

        let id = self.spawn(template.id.clone(), stable_id, parent)?;
        for tag in &template.components {
            match self.registry.create_component(tag) {
                Ok((tag, component)) => {
                    self.components.insert((id, tag), ComponentSlot::new(component));
                }
                Err(err) => {
                    self.despawn(id);
                    return Err(err);
                }
            }
        }
        if template.physics {
            if let Some(record) = self.entities.get_mut(&id) {
                record.physics = Some(PhysicsState::ZERO);
            }
        }
        Ok(Some(id))
    }

    /// Instantiate a template and overwrite its state from an entity body.
    ///
    /// Returns `Ok(None)` in the same recoverable cases as
    /// [`instantiate`](Self::instantiate).
    ///
    /// # Errors
    ///
    /// Any decode error from [`load_into`](Self::load_into); the half-built
    /// entity is despawned first.
    pub fn instantiate_from(
        &mut self,
        template_id: &str,
        stable_id: Option<String>,
        reader: &mut Reader<'_>,
        parent: Option<EntityId>,
    ) -> Result<Option<EntityId>, PersistError> {
        let Some(id) = self.instantiate(template_id, stable_id, parent)? else {
            return Ok(None);
        };
        if let Err(err) = self.load_into(id, reader) {
            self.despawn(id);
            return Err(err);
        }
        Ok(Some(id))
    }

    /// Destroy an entity and its whole subtree.
    ///
    /// Returns `true` if the entity existed.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        let Some(record) = self.entities.remove(&id) else {
            return false;
        };

        if let Some(stable_id) = &record.stable_id {
            self.stable_ids.remove(stable_id);
        }
        match record.parent.and_then(|parent| self.entities.get_mut(&parent)) {
            Some(parent_record) => parent_record.children.retain(|&child| child != id),
            None => self.roots.retain(|&root| root != id),
        }

        let keys: Vec<_> = self.component_range(id).map(|(key, _)| *key).collect();
        for key in keys {
            self.components.remove(&key);
        }

        for child in record.children {
            self.despawn(child);
        }
        debug!(entity = %id, "despawned entity");
        true
    }

    /// Destroy every entity. Returns how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.entities.len();
        self.entities.clear();
        self.components.clear();
        self.roots.clear();
        self.stable_ids.clear();
        count
    }

    // -- Hierarchy ---------------------------------------------------------

    /// Make the root `child` a child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::AlreadyParented`] if `child` is not a root
    /// (detach it first), [`PersistError::Cycle`] if `parent` is `child` or
    /// one of its descendants, or [`PersistError::UnknownEntity`].
    pub fn attach(&mut self, child: EntityId, parent: EntityId) -> Result<(), PersistError> {
        if self.record(child)?.parent.is_some() {
            return Err(PersistError::AlreadyParented(child));
        }
        self.record(parent)?;

        let mut cursor = Some(parent);
        while let Some(ancestor) = cursor {
            if ancestor == child {
                return Err(PersistError::Cycle { child, parent });
            }
            cursor = self.entities.get(&ancestor).and_then(|record| record.parent);
        }

        self.roots.retain(|&root| root != child);
        self.record_mut(child)?.parent = Some(parent);
        self.record_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Turn a child back into a root. Detaching a root does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnknownEntity`].
    pub fn detach(&mut self, child: EntityId) -> Result<(), PersistError> {
        let Some(parent) = self.record_mut(child)?.parent.take() else {
            return Ok(());
        };
        if let Some(parent_record) = self.entities.get_mut(&parent) {
            parent_record.children.retain(|&id| id != child);
        }
        self.roots.push(child);
        Ok(())
    }

    /// Root entities, in registration order.
    #[must_use]
    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    /// Children of `id`, in registration order. Empty for unknown entities.
    #[must_use]
    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.entities
            .get(&id)
            .map(|record| record.children.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.entities.get(&id).and_then(|record| record.parent)
    }

    #[must_use]
    pub fn is_root(&self, id: EntityId) -> bool {
        self.entities
            .get(&id)
            .is_some_and(|record| record.parent.is_none())
    }

    // -- Identity and spatial state -----------------------------------------

    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of live entities, roots and children alike.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[must_use]
    pub fn template_id(&self, id: EntityId) -> Option<&str> {
        self.entities
            .get(&id)
            .map(|record| record.template_id.as_str())
    }

    #[must_use]
    pub fn stable_id(&self, id: EntityId) -> Option<&str> {
        self.entities
            .get(&id)
            .and_then(|record| record.stable_id.as_deref())
    }

    /// Find the live entity carrying a stable id.
    #[must_use]
    pub fn find_by_stable_id(&self, stable_id: &str) -> Option<EntityId> {
        self.stable_ids.get(stable_id).copied()
    }

    #[must_use]
    pub fn transform(&self, id: EntityId) -> Option<Transform> {
        self.entities.get(&id).map(|record| record.transform)
    }

    /// # Errors
    ///
    /// Returns [`PersistError::UnknownEntity`].
    pub fn set_transform(&mut self, id: EntityId, transform: Transform) -> Result<(), PersistError> {
        self.record_mut(id)?.transform = transform;
        Ok(())
    }

    #[must_use]
    pub fn physics(&self, id: EntityId) -> Option<PhysicsState> {
        self.entities.get(&id).and_then(|record| record.physics)
    }

    /// Replace the physics state; `None` removes the physics body.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnknownEntity`].
    pub fn set_physics(
        &mut self,
        id: EntityId,
        physics: Option<PhysicsState>,
    ) -> Result<(), PersistError> {
        self.record_mut(id)?.physics = physics;
        Ok(())
    }

    // -- Components --------------------------------------------------------

    /// Attach a component, replacing the state of an existing one of the
    /// same type. There is deliberately no way to remove one.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnregisteredComponent`] or
    /// [`PersistError::UnknownEntity`].
    pub fn insert_component<T: PersistableComponent>(
        &mut self,
        id: EntityId,
        component: T,
    ) -> Result<(), PersistError> {
        self.record(id)?;
        let tag = self.registry.component_tag::<T>()?;
        match self.components.entry((id, tag)) {
            Entry::Occupied(mut entry) => entry.get_mut().component = Box::new(component),
            Entry::Vacant(entry) => {
                entry.insert(ComponentSlot::new(Box::new(component)));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn component<T: PersistableComponent>(&self, id: EntityId) -> Option<&T> {
        let tag = self.registry.component_tag::<T>().ok()?;
        self.components.get(&(id, tag))?.downcast_ref::<T>()
    }

    #[must_use]
    pub fn component_mut<T: PersistableComponent>(&mut self, id: EntityId) -> Option<&mut T> {
        let tag = self.registry.component_tag::<T>().ok()?;
        self.components.get_mut(&(id, tag))?.downcast_mut::<T>()
    }

    /// Returns `None` if the entity has no `T`.
    #[must_use]
    pub fn is_enabled<T: PersistableComponent>(&self, id: EntityId) -> Option<bool> {
        let tag = self.registry.component_tag::<T>().ok()?;
        self.components.get(&(id, tag)).map(|slot| slot.enabled)
    }

    /// Enable or disable the entity's `T`. Returns `false` if it has none.
    pub fn set_enabled<T: PersistableComponent>(&mut self, id: EntityId, enabled: bool) -> bool {
        let Ok(tag) = self.registry.component_tag::<T>() else {
            return false;
        };
        match self.components.get_mut(&(id, tag)) {
            Some(slot) => {
                slot.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// Tags of the entity's components, in save order.
    #[must_use]
    pub fn component_tags(&self, id: EntityId) -> Vec<&'static str> {
        self.component_range(id).map(|((_, tag), _)| *tag).collect()
    }

    fn component_range(
        &self,
        id: EntityId,
    ) -> impl Iterator<Item = (&(EntityId, &'static str), &ComponentSlot)> {
        self.components
            .range((id, "")..)
            .take_while(move |((owner, _), _)| *owner == id)
    }

    // -- Save / load -------------------------------------------------------

    /// Encode the entity's own state (transform, physics, components) as a
    /// self-contained, versioned body. Children are not included.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnknownEntity`], or any error raised while
    /// writing a component.
    pub fn save_body(&self, id: EntityId) -> Result<Vec<u8>, PersistError> {
        let record = self.record(id)?;
        let mut writer = Writer::new();

        writer.write_vec3(record.transform.position);
        writer.write_quat(record.transform.rotation);
        match record.physics {
            Some(physics) => {
                writer.write_bool(true);
                writer.write_vec3(physics.linear_velocity);
                writer.write_float(physics.angular_velocity);
            }
            None => writer.write_bool(false),
        }

        let slots: Vec<_> = self.component_range(id).map(|(_, slot)| slot).collect();
        writer.write_len("component count", slots.len())?;
        for slot in slots {
            self.registry
                .write_component(&mut writer, slot.enabled, slot.component())?;
        }
        Ok(writer.into_bytes())
    }

    /// Overwrite the entity's state from a body written by
    /// [`save_body`](Self::save_body).
    ///
    /// A physics body in the stream is added if the entity lacks one; an
    /// entity's existing physics body is left alone if the stream has none.
    /// Components are loaded with [`load_component_onto`](Self::load_component_onto).
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnknownEntity`] or any decode error. State
    /// applied before the error is kept.
    pub fn load_into(&mut self, id: EntityId, reader: &mut Reader<'_>) -> Result<(), PersistError> {
        self.record(id)?;

        let position = reader.read_vec3()?;
        let rotation = reader.read_quat()?;
        let physics = if reader.read_bool()? {
            Some(PhysicsState::new(reader.read_vec3()?, reader.read_float()?))
        } else {
            None
        };

        let record = self.record_mut(id)?;
        record.transform = Transform::from_position_rotation(position, rotation);
        if physics.is_some() {
            record.physics = physics;
        }

        let count = reader.read_len()?;
        for _ in 0..count {
            self.load_component_onto(id, reader)?;
        }
        Ok(())
    }

    /// Read one component record and apply it to the entity: find the
    /// component with the record's tag or create it, then overwrite its
    /// `enabled` flag and fields. Returns the tag.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnknownComponentTag`],
    /// [`PersistError::UnknownEntity`], or any decode error.
    pub fn load_component_onto(
        &mut self,
        id: EntityId,
        reader: &mut Reader<'_>,
    ) -> Result<&'static str, PersistError> {
        self.record(id)?;
        let registry = Arc::clone(&self.registry);

        let tag = registry.resolve_component_tag(&reader.read_string()?)?;
        let slot = match self.components.entry((id, tag)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let (_, component) = registry.create_component(tag)?;
                entry.insert(ComponentSlot::new(component))
            }
        };
        slot.enabled = reader.read_bool()?;
        slot.component.load(reader, &registry)?;
        Ok(tag)
    }

    fn record(&self, id: EntityId) -> Result<&EntityRecord, PersistError> {
        self.entities
            .get(&id)
            .ok_or(PersistError::UnknownEntity(id))
    }

    fn record_mut(&mut self, id: EntityId) -> Result<&mut EntityRecord, PersistError> {
        self.entities
            .get_mut(&id)
            .ok_or(PersistError::UnknownEntity(id))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use persist_math::{Quat, Vec3};

    use super::*;
    use crate::testing::{Chest, Damage, Health, Projectile, Unregistered};

    #[test]
    fn test_spawn_root_and_child() {
        let mut world = crate::testing::world();
        let root = world.spawn("Knight", None, None).unwrap();
        let child = world.spawn("Marker", None, Some(root)).unwrap();

        assert_eq!(world.roots(), &[root]);
        assert_eq!(world.children(root), &[child]);
        assert_eq!(world.parent(child), Some(root));
        assert!(world.is_root(root));
        assert!(!world.is_root(child));
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_spawn_rejects_unknown_parent_and_duplicate_stable_id() {
        let mut world = crate::testing::world();
        assert!(matches!(
            world.spawn("Marker", None, Some(EntityId(99))),
            Err(PersistError::UnknownEntity(EntityId(99)))
        ));

        world
            .spawn("Chest", Some("chest_01".into()), None)
            .unwrap();
        assert!(matches!(
            world.spawn("Chest", Some("chest_01".into()), None),
            Err(PersistError::DuplicateStableId(id)) if id == "chest_01"
        ));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_instantiate_applies_template() {
        let mut world = crate::testing::world();
        let knight = world.instantiate("Knight", None, None).unwrap().unwrap();
        assert_eq!(world.template_id(knight), Some("Knight"));
        assert_eq!(world.component::<Health>(knight), Some(&Health::default()));
        assert_eq!(world.is_enabled::<Health>(knight), Some(true));
        assert_eq!(world.physics(knight), Some(PhysicsState::ZERO));

        let marker = world.instantiate("Marker", None, None).unwrap().unwrap();
        assert!(world.component_tags(marker).is_empty());
        assert_eq!(world.physics(marker), None);
    }

    #[test]
    fn test_instantiate_unknown_template_is_skipped() {
        let mut world = crate::testing::world();
        assert_eq!(world.instantiate("Dragon", None, None).unwrap(), None);
        assert!(world.is_empty());
    }

    #[test]
    fn test_instantiate_missing_parent_is_skipped() {
        let mut world = crate::testing::world();
        assert_eq!(
            world.instantiate("Marker", None, Some(EntityId(7))).unwrap(),
            None
        );
        assert!(world.is_empty());
    }

    #[test]
    fn test_despawn_removes_subtree_and_bookkeeping() {
        let mut world = crate::testing::world();
        let root = world
            .instantiate("Knight", Some("knight".into()), None)
            .unwrap()
            .unwrap();
        let child = world.instantiate("Chest", None, Some(root)).unwrap().unwrap();
        let grandchild = world.instantiate("Marker", None, Some(child)).unwrap().unwrap();
        let other = world.instantiate("Marker", None, None).unwrap().unwrap();

        assert!(world.despawn(root));
        assert!(!world.contains(child));
        assert!(!world.contains(grandchild));
        assert_eq!(world.roots(), &[other]);
        assert_eq!(world.find_by_stable_id("knight"), None);
        assert!(world.component::<Chest>(child).is_none());
        assert!(!world.despawn(root));
    }

    #[test]
    fn test_despawn_child_deregisters_from_parent() {
        let mut world = crate::testing::world();
        let root = world.spawn("Marker", None, None).unwrap();
        let a = world.spawn("Marker", None, Some(root)).unwrap();
        let b = world.spawn("Marker", None, Some(root)).unwrap();
        world.despawn(a);
        assert_eq!(world.children(root), &[b]);
        assert_eq!(world.roots(), &[root]);
    }

    #[test]
    fn test_attach_and_detach() {
        let mut world = crate::testing::world();
        let parent = world.spawn("Marker", None, None).unwrap();
        let child = world.spawn("Marker", None, None).unwrap();

        world.attach(child, parent).unwrap();
        assert_eq!(world.roots(), &[parent]);
        assert_eq!(world.children(parent), &[child]);

        world.detach(child).unwrap();
        assert_eq!(world.roots(), &[parent, child]);
        assert!(world.children(parent).is_empty());
        assert_eq!(world.parent(child), None);
    }

    #[test]
    fn test_reparenting_requires_detach() {
        let mut world = crate::testing::world();
        let a = world.spawn("Marker", None, None).unwrap();
        let b = world.spawn("Marker", None, None).unwrap();
        let child = world.spawn("Marker", None, Some(a)).unwrap();

        assert!(matches!(
            world.attach(child, b),
            Err(PersistError::AlreadyParented(id)) if id == child
        ));
        world.detach(child).unwrap();
        world.attach(child, b).unwrap();
        assert_eq!(world.parent(child), Some(b));
    }

    #[test]
    fn test_attach_rejects_cycles() {
        let mut world = crate::testing::world();
        let root = world.spawn("Marker", None, None).unwrap();
        let child = world.spawn("Marker", None, Some(root)).unwrap();

        assert!(matches!(world.attach(root, child), Err(PersistError::Cycle { .. })));
        assert!(matches!(world.attach(root, root), Err(PersistError::Cycle { .. })));
        assert_eq!(world.roots(), &[root]);
    }

    #[test]
    fn test_insert_component_is_upsert() {
        let mut world = crate::testing::world();
        let id = world.instantiate("Knight", None, None).unwrap().unwrap();
        world.set_enabled::<Health>(id, false);
        world
            .insert_component(
                id,
                Health {
                    current: 5.0,
                    ..Health::default()
                },
            )
            .unwrap();

        assert_eq!(world.component_tags(id), vec!["Health"]);
        assert_eq!(world.component::<Health>(id).unwrap().current, 5.0);
        assert_eq!(world.is_enabled::<Health>(id), Some(false));
    }

    #[test]
    fn test_insert_unregistered_component_fails() {
        let mut world = crate::testing::world();
        let id = world.spawn("Marker", None, None).unwrap();
        assert!(matches!(
            world.insert_component(id, Unregistered),
            Err(PersistError::UnregisteredComponent(_))
        ));
        assert!(world.component_tags(id).is_empty());
    }

    #[test]
    fn test_body_roundtrip() {
        let mut world = crate::testing::world();
        let source = world.instantiate("Arrow", None, None).unwrap().unwrap();
        world
            .set_transform(
                source,
                Transform::from_position_rotation(
                    Vec3::new(3.5, -1.25, 0.0),
                    Quat::from_rotation_z(0.75),
                ),
            )
            .unwrap();
        world
            .set_physics(source, Some(PhysicsState::new(Vec3::new(6.0, 0.0, 0.0), 1.5)))
            .unwrap();
        world.component_mut::<Projectile>(source).unwrap().time_to_live = 1.25;
        world.component_mut::<Projectile>(source).unwrap().payload =
            Some(Arc::new(Damage { amount: 12.5 }));
        world
            .insert_component(
                source,
                Health {
                    current: 3.0,
                    regen: 0.5,
                    hits_taken: 9,
                },
            )
            .unwrap();
        world.set_enabled::<Health>(source, false);

        let body = world.save_body(source).unwrap();
        let target = world.instantiate("Arrow", None, None).unwrap().unwrap();
        let mut reader = Reader::new(&body).unwrap();
        world.load_into(target, &mut reader).unwrap();
        reader.finish().unwrap();

        assert_eq!(world.transform(target), world.transform(source));
        assert_eq!(world.physics(target), world.physics(source));
        assert_eq!(world.component_tags(target), vec!["Health", "Projectile"]);
        assert_eq!(world.is_enabled::<Health>(target), Some(false));
        assert_eq!(world.is_enabled::<Projectile>(target), Some(true));

        let health = world.component::<Health>(target).unwrap();
        assert_eq!((health.current, health.regen), (3.0, 0.5));
        assert_eq!(health.hits_taken, 0);

        let projectile = world.component::<Projectile>(target).unwrap();
        assert_eq!(projectile.time_to_live, 1.25);
        let payload = projectile.payload.as_deref().unwrap();
        assert_eq!(
            payload.as_any().downcast_ref::<Damage>(),
            Some(&Damage { amount: 12.5 })
        );
    }

    #[test]
    fn test_load_onto_keeps_unsaved_fields() {
        let mut world = crate::testing::world();
        let id = world.instantiate("Knight", None, None).unwrap().unwrap();
        world.component_mut::<Health>(id).unwrap().current = 8.0;
        let body = world.save_body(id).unwrap();

        world.component_mut::<Health>(id).unwrap().hits_taken = 4;
        world.component_mut::<Health>(id).unwrap().current = 1.0;
        let mut reader = Reader::new(&body).unwrap();
        world.load_into(id, &mut reader).unwrap();

        let health = world.component::<Health>(id).unwrap();
        assert_eq!(health.current, 8.0);
        assert_eq!(health.hits_taken, 4);
    }

    #[test]
    fn test_load_keeps_physics_when_stream_has_none() {
        let mut world = crate::testing::world();
        let marker = world.spawn("Marker", None, None).unwrap();
        let body = world.save_body(marker).unwrap();

        let knight = world.instantiate("Knight", None, None).unwrap().unwrap();
        let moving = PhysicsState::new(Vec3::Y, 0.0);
        world.set_physics(knight, Some(moving)).unwrap();
        let mut reader = Reader::new(&body).unwrap();
        world.load_into(knight, &mut reader).unwrap();
        assert_eq!(world.physics(knight), Some(moving));
    }

    #[test]
    fn test_save_body_is_deterministic() {
        let mut world = crate::testing::world();
        let id = world.instantiate("Knight", None, None).unwrap().unwrap();
        world
            .insert_component(
                id,
                Chest {
                    opened: true,
                    label: "loot".into(),
                },
            )
            .unwrap();
        assert_eq!(world.save_body(id).unwrap(), world.save_body(id).unwrap());
    }

    #[test]
    fn test_load_unknown_component_tag_fails() {
        let mut world = crate::testing::world();
        let id = world.spawn("Marker", None, None).unwrap();

        let mut writer = Writer::new();
        writer.write_vec3(Vec3::ZERO);
        writer.write_quat(Quat::IDENTITY);
        writer.write_bool(false);
        writer.write_u16(1);
        writer.write_string("Teleporter").unwrap();
        writer.write_bool(true);
        let body = writer.into_bytes();

        let mut reader = Reader::new(&body).unwrap();
        assert!(matches!(
            world.load_into(id, &mut reader),
            Err(PersistError::UnknownComponentTag(tag)) if tag == "Teleporter"
        ));
    }

    #[test]
    fn test_clear() {
        let mut world = crate::testing::world();
        let root = world
            .instantiate("Knight", Some("k".into()), None)
            .unwrap()
            .unwrap();
        world.instantiate("Marker", None, Some(root)).unwrap();
        assert_eq!(world.clear(), 2);
        assert!(world.is_empty());
        assert!(world.roots().is_empty());
        assert_eq!(world.find_by_stable_id("k"), None);

        let next = world.instantiate("Marker", None, None).unwrap().unwrap();
        assert_ne!(next, root);
        assert!(!world.contains(root));
    }
}
