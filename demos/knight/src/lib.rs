//! # knight
//!
//! Knight Quest's persistable game types and the data the persistence
//! engine needs to run the game's scenes:
//!
//! - [`registry`]: every persistable component and value, under its tag.
//! - [`templates`]: the entity templates, from `assets/templates.json`.
//! - [`host`]: the game's scenes, from `assets/scenes.json`.

pub mod components;
pub mod values;

use std::sync::Arc;

use persist_core::{EntityId, PersistError, PersistableValue, Registry, TemplateCatalog, World};
use persist_math::{PhysicsState, Quat, Transform, Vec3};
use persist_scene::{HostError, MemoryHost};

use crate::components::{Arrow, ArrowRemains, Chest, CombatStats};
use crate::values::{ArrowDamage, SimpleDamage};

const TEMPLATES_JSON: &str = include_str!("../assets/templates.json");
const SCENES_JSON: &str = include_str!("../assets/scenes.json");

/// How long a freshly fired arrow stays alive, in seconds.
pub const ARROW_TIME_TO_LIVE: f32 = 1.25;

/// Register every persistable type of the game.
///
/// # Errors
///
/// Returns a duplicate-registration error; this is a bug in the game.
pub fn registry() -> Result<Arc<Registry>, PersistError> {
    let mut builder = Registry::builder();
    builder
        .register_component::<CombatStats>("CombatStats")?
        .register_component::<Arrow>("Arrow")?
        .register_component::<ArrowRemains>("ArrowRemains")?
        .register_component::<Chest>("Chest")?
        .register_value::<ArrowDamage>("ArrowDamage")?
        .register_value::<SimpleDamage>("SimpleDamage")?;
    Ok(Arc::new(builder.build()))
}

/// Load the template catalog.
///
/// # Errors
///
/// Returns an error if the embedded catalog is malformed.
pub fn templates() -> Result<Arc<TemplateCatalog>, PersistError> {
    Ok(Arc::new(TemplateCatalog::from_json(TEMPLATES_JSON)?))
}

/// An empty world, with the templates checked against the registry.
///
/// # Errors
///
/// Returns an error if registration fails, the catalog is malformed, or a
/// template names an unregistered component.
pub fn world() -> Result<World, PersistError> {
    let registry = registry()?;
    let templates = templates()?;
    templates.validate(&registry)?;
    Ok(World::new(registry, templates))
}

/// The game's scenes.
///
/// # Errors
///
/// Returns [`HostError::InvalidLayouts`] if the embedded layouts are
/// malformed.
pub fn host() -> Result<MemoryHost, HostError> {
    MemoryHost::from_json(SCENES_JSON)
}

/// Launch the arrow entity `id` along `direction`.
///
/// # Errors
///
/// Returns [`PersistError::UnknownEntity`] or, if `Arrow` is not registered,
/// [`PersistError::UnregisteredComponent`].
pub fn fire_arrow(
    world: &mut World,
    id: EntityId,
    direction: Vec3,
    speed: f32,
    damage: Arc<dyn PersistableValue>,
) -> Result<(), PersistError> {
    let position = world
        .transform(id)
        .ok_or(PersistError::UnknownEntity(id))?
        .position;
    let direction = direction.normalize_or_zero();
    let rotation = if direction == Vec3::ZERO {
        Quat::IDENTITY
    } else {
        Quat::from_rotation_arc(Vec3::X, direction)
    };

    world.set_transform(id, Transform::from_position_rotation(position, rotation))?;
    world.set_physics(id, Some(PhysicsState::new(direction * speed, 0.0)))?;
    world.insert_component(
        id,
        Arrow {
            time_to_live: ARROW_TIME_TO_LIVE,
            initial_speed: speed,
            damage: Some(damage),
        },
    )
}
