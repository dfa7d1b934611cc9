//! Persistable game components.

use std::sync::Arc;

use persist_codec::{Reader, Writer};
use persist_core::{PersistError, PersistableComponent, PersistableValue, Registry};

/// Health of a character.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatStats {
    pub current_health: f32,
    /// Health regained per second.
    pub health_regen: f32,
    /// Comes from the template, not from save data.
    pub maximum_health: f32,
}

impl Default for CombatStats {
    fn default() -> Self {
        Self::with_health(100.0)
    }
}

impl CombatStats {
    /// Full health, no regeneration.
    #[must_use]
    pub fn with_health(maximum_health: f32) -> Self {
        Self {
            current_health: maximum_health,
            health_regen: 0.0,
            maximum_health,
        }
    }

    pub fn take_direct_damage(&mut self, amount: f32) {
        self.current_health -= amount;
    }

    pub fn regenerate(&mut self, dt: f32) {
        self.current_health = (self.current_health + self.health_regen * dt).min(self.maximum_health);
    }

    #[must_use]
    pub fn is_dead(&self) -> bool {
        self.current_health <= 0.0
    }
}

impl PersistableComponent for CombatStats {
    fn save(&self, writer: &mut Writer, _registry: &Registry) -> Result<(), PersistError> {
        writer.write_float(self.current_health);
        writer.write_float(self.health_regen);
        Ok(())
    }

    fn load(&mut self, reader: &mut Reader<'_>, _registry: &Registry) -> Result<(), PersistError> {
        self.current_health = reader.read_float()?;
        self.health_regen = reader.read_float()?;
        Ok(())
    }
}

/// An arrow in flight.
#[derive(Debug, Default)]
pub struct Arrow {
    /// Seconds until the arrow despawns.
    pub time_to_live: f32,
    /// Speed at launch; impact damage scales with the current speed relative
    /// to this.
    pub initial_speed: f32,
    /// What the arrow does on impact. Shared with whatever fired it.
    pub damage: Option<Arc<dyn PersistableValue>>,
}

impl Arrow {
    /// Count down the arrow's lifetime. Returns `true` once it has expired.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.time_to_live -= dt;
        self.time_to_live <= 0.0
    }
}

impl PersistableComponent for Arrow {
    fn save(&self, writer: &mut Writer, registry: &Registry) -> Result<(), PersistError> {
        writer.write_float(self.time_to_live);
        writer.write_float(self.initial_speed);
        registry.write_optional_value(writer, self.damage.as_deref())
    }

    fn load(&mut self, reader: &mut Reader<'_>, registry: &Registry) -> Result<(), PersistError> {
        self.time_to_live = reader.read_float()?;
        self.initial_speed = reader.read_float()?;
        self.damage = registry.read_optional_value(reader)?;
        Ok(())
    }
}

/// What is left of an arrow after it hits something.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ArrowRemains {
    pub time_to_live: f32,
}

impl PersistableComponent for ArrowRemains {
    fn save(&self, writer: &mut Writer, _registry: &Registry) -> Result<(), PersistError> {
        writer.write_float(self.time_to_live);
        Ok(())
    }

    fn load(&mut self, reader: &mut Reader<'_>, _registry: &Registry) -> Result<(), PersistError> {
        self.time_to_live = reader.read_float()?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Chest {
    pub opened: bool,
    pub gold: f32,
}

impl PersistableComponent for Chest {
    fn save(&self, writer: &mut Writer, _registry: &Registry) -> Result<(), PersistError> {
        writer.write_bool(self.opened);
        writer.write_float(self.gold);
        Ok(())
    }

    fn load(&mut self, reader: &mut Reader<'_>, _registry: &Registry) -> Result<(), PersistError> {
        self.opened = reader.read_bool()?;
        self.gold = reader.read_float()?;
        Ok(())
    }
}
