//! Components, values, and templates shared by the unit tests.

use std::sync::Arc;

use persist_codec::{Reader, Writer};

use crate::{
    PersistError, PersistableComponent, PersistableValue, Registry, Template, TemplateCatalog,
    World,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Health {
    pub current: f32,
    pub regen: f32,
    /// Runtime-only; never saved.
    pub hits_taken: u32,
}

impl PersistableComponent for Health {
    fn save(&self, writer: &mut Writer, _registry: &Registry) -> Result<(), PersistError> {
        writer.write_float(self.current);
        writer.write_float(self.regen);
        Ok(())
    }

    fn load(&mut self, reader: &mut Reader<'_>, _registry: &Registry) -> Result<(), PersistError> {
        self.current = reader.read_float()?;
        self.regen = reader.read_float()?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Chest {
    pub opened: bool,
    pub label: String,
}

impl PersistableComponent for Chest {
    fn save(&self, writer: &mut Writer, _registry: &Registry) -> Result<(), PersistError> {
        writer.write_bool(self.opened);
        writer.write_string(&self.label)?;
        Ok(())
    }

    fn load(&mut self, reader: &mut Reader<'_>, _registry: &Registry) -> Result<(), PersistError> {
        self.opened = reader.read_bool()?;
        self.label = reader.read_string()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Projectile {
    pub time_to_live: f32,
    pub payload: Option<Arc<dyn PersistableValue>>,
}

impl PersistableComponent for Projectile {
    fn save(&self, writer: &mut Writer, registry: &Registry) -> Result<(), PersistError> {
        writer.write_float(self.time_to_live);
        registry.write_optional_value(writer, self.payload.as_deref())
    }

    fn load(&mut self, reader: &mut Reader<'_>, registry: &Registry) -> Result<(), PersistError> {
        self.time_to_live = reader.read_float()?;
        self.payload = registry.read_optional_value(reader)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Damage {
    pub amount: f32,
}

impl PersistableValue for Damage {
    fn save(&self, writer: &mut Writer, _registry: &Registry) -> Result<(), PersistError> {
        writer.write_float(self.amount);
        Ok(())
    }

    fn load(reader: &mut Reader<'_>, _registry: &Registry) -> Result<Self, PersistError> {
        Ok(Self {
            amount: reader.read_float()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heal {
    pub amount: f32,
}

impl PersistableValue for Heal {
    fn save(&self, writer: &mut Writer, _registry: &Registry) -> Result<(), PersistError> {
        writer.write_float(self.amount);
        Ok(())
    }

    fn load(reader: &mut Reader<'_>, _registry: &Registry) -> Result<Self, PersistError> {
        Ok(Self {
            amount: reader.read_float()?,
        })
    }
}

/// A component type that is deliberately never registered.
#[derive(Debug, Default)]
pub struct Unregistered;

impl PersistableComponent for Unregistered {
    fn save(&self, _writer: &mut Writer, _registry: &Registry) -> Result<(), PersistError> {
        Ok(())
    }

    fn load(&mut self, _reader: &mut Reader<'_>, _registry: &Registry) -> Result<(), PersistError> {
        Ok(())
    }
}

/// A value type that is deliberately never registered.
#[derive(Debug)]
pub struct UnregisteredValue;

impl PersistableValue for UnregisteredValue {
    fn save(&self, _writer: &mut Writer, _registry: &Registry) -> Result<(), PersistError> {
        Ok(())
    }

    fn load(_reader: &mut Reader<'_>, _registry: &Registry) -> Result<Self, PersistError> {
        Ok(Self)
    }
}

pub fn registry() -> Arc<Registry> {
    let mut builder = Registry::builder();
    builder
        .register_component::<Health>("Health")
        .and_then(|b| b.register_component::<Chest>("Chest"))
        .and_then(|b| b.register_component::<Projectile>("Projectile"))
        .and_then(|b| b.register_value::<Damage>("Damage"))
        .and_then(|b| b.register_value::<Heal>("Heal"))
        .expect("test registry is consistent");
    Arc::new(builder.build())
}

pub fn templates() -> Arc<TemplateCatalog> {
    let mut catalog = TemplateCatalog::new();
    for template in [
        Template::new("Knight").with_component("Health").with_physics(),
        Template::new("Chest").with_component("Chest"),
        Template::new("Arrow")
            .with_component("Projectile")
            .with_physics(),
        Template::new("Marker"),
    ] {
        catalog.insert(template).expect("test templates are unique");
    }
    Arc::new(catalog)
}

pub fn world() -> World {
    World::new(registry(), templates())
}
