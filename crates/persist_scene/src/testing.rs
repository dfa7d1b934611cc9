//! Registry, templates, and scenes shared by the unit tests.

use std::sync::Arc;

use persist_codec::{Reader, Writer};
use persist_core::{PersistError, PersistableComponent, Registry, Template, TemplateCatalog, World};

use crate::host::MemoryHost;
use crate::orchestrator::SceneOrchestrator;

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

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Counter {
    pub value: f32,
}

impl PersistableComponent for Counter {
    fn save(&self, writer: &mut Writer, _registry: &Registry) -> Result<(), PersistError> {
        writer.write_float(self.value);
        Ok(())
    }

    fn load(&mut self, reader: &mut Reader<'_>, _registry: &Registry) -> Result<(), PersistError> {
        self.value = reader.read_float()?;
        Ok(())
    }
}

pub const LAYOUTS: &str = r#"{
    "castle": { "entities": [
        { "stable_id": "chest_01", "template_id": "Chest",
          "transform": { "position": [2.0, 0.0, 0.0] } },
        { "stable_id": "gate_01", "template_id": "Torch",
          "children": [{ "stable_id": "flame_01", "template_id": "Torch" }] }
    ] },
    "forest": { "entities": [
        { "stable_id": "tree_01", "template_id": "Torch" }
    ] },
    "ruins": { "entities": [
        { "stable_id": "ghost_01", "template_id": "Ghost" },
        { "stable_id": "chest_02", "template_id": "Chest" }
    ] }
}"#;

pub fn world() -> World {
    let mut builder = Registry::builder();
    builder
        .register_component::<Chest>("Chest")
        .and_then(|b| b.register_component::<Counter>("Counter"))
        .expect("test registry is consistent");

    let mut catalog = TemplateCatalog::new();
    for template in [
        Template::new("Chest").with_component("Chest"),
        Template::new("Torch"),
        Template::new("Knight").with_component("Counter").with_physics(),
        Template::new("Bag").with_component("Counter"),
    ] {
        catalog.insert(template).expect("test templates are unique");
    }
    World::new(Arc::new(builder.build()), Arc::new(catalog))
}

pub fn orchestrator() -> SceneOrchestrator<MemoryHost> {
    let host = MemoryHost::from_json(LAYOUTS).expect("test layouts parse");
    SceneOrchestrator::new(host, world())
}
