//! Damage descriptions carried by attacks.

use persist_codec::{Reader, Writer};
use persist_core::{PersistError, PersistableValue, Registry};

use crate::components::CombatStats;

/// Damage delivered by an arrow on impact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowDamage {
    pub damage: f32,
    /// Extra damage when the arrow was set on fire. Zero for a plain arrow.
    pub fire_damage: f32,
}

impl ArrowDamage {
    #[must_use]
    pub fn new(damage: f32) -> Self {
        Self {
            damage,
            fire_damage: 0.0,
        }
    }

    /// Scale the impact damage by how fast the arrow is flying relative to
    /// its launch speed. Fire damage is unaffected.
    #[must_use]
    pub fn with_speed_multiplier(self, multiplier: f32) -> Self {
        Self {
            damage: self.damage * multiplier,
            ..self
        }
    }

    #[must_use]
    pub fn with_fire_damage(self, fire_damage: f32) -> Self {
        Self {
            fire_damage,
            ..self
        }
    }

    pub fn apply(&self, target: &mut CombatStats) {
        target.take_direct_damage(self.damage + self.fire_damage);
    }
}

impl PersistableValue for ArrowDamage {
    fn save(&self, writer: &mut Writer, _registry: &Registry) -> Result<(), PersistError> {
        writer.write_float(self.damage);
        writer.write_float(self.fire_damage);
        Ok(())
    }

    fn load(reader: &mut Reader<'_>, _registry: &Registry) -> Result<Self, PersistError> {
        Ok(Self {
            damage: reader.read_float()?,
            fire_damage: reader.read_float()?,
        })
    }
}

/// Flat damage, e.g. from a sword swing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimpleDamage {
    pub damage: f32,
}

impl SimpleDamage {
    #[must_use]
    pub fn with_damage_multiplier(self, multiplier: f32) -> Self {
        Self {
            damage: self.damage * multiplier,
        }
    }

    pub fn apply(&self, target: &mut CombatStats) {
        target.take_direct_damage(self.damage);
    }
}

impl PersistableValue for SimpleDamage {
    fn save(&self, writer: &mut Writer, _registry: &Registry) -> Result<(), PersistError> {
        writer.write_float(self.damage);
        Ok(())
    }

    fn load(reader: &mut Reader<'_>, _registry: &Registry) -> Result<Self, PersistError> {
        Ok(Self {
            damage: reader.read_float()?,
        })
    }
}
