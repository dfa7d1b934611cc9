//! Entity templates ("prefabs").
//!
//! A template is the blueprint an entity is instantiated from: the
//! components it starts with and whether it carries a physics body. Saved
//! data only records the template id, so ids must stay fixed once save files
//! reference them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::registry::Registry;

/// Blueprint for instantiating an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Stable template id, as written to save data.
    pub id: String,
    /// Component tags attached, in default state, on instantiation.
    #[serde(default)]
    pub components: Vec<String>,
    /// Whether instances carry a physics body.
    #[serde(default)]
    pub physics: bool,
}

impl Template {
    /// Create a template with no components and no physics body.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            components: Vec::new(),
            physics: false,
        }
    }

    /// Add a component tag.
    #[must_use]
    pub fn with_component(mut self, tag: impl Into<String>) -> Self {
        self.components.push(tag.into());
        self
    }

    /// Give instances a physics body.
    #[must_use]
    pub fn with_physics(mut self) -> Self {
        self.physics = true;
        self
    }
}

/// All templates known to the game, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: HashMap<String, Template>,
}

impl TemplateCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from a JSON array of templates.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::InvalidCatalog`] for malformed JSON and
    /// [`PersistError::DuplicateTemplate`] if an id appears twice.
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let templates: Vec<Template> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for template in templates {
            catalog.insert(template)?;
        }
        Ok(catalog)
    }

    /// Add a template.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::DuplicateTemplate`] if the id is taken.
    pub fn insert(&mut self, template: Template) -> Result<(), PersistError> {
        if self.templates.contains_key(&template.id) {
            return Err(PersistError::DuplicateTemplate(template.id));
        }
        self.templates.insert(template.id.clone(), template);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Check that every component tag used by a template is registered.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnknownComponentTag`] for the first unknown tag.
    pub fn validate(&self, registry: &Registry) -> Result<(), PersistError> {
        for template in self.templates.values() {
            for tag in &template.components {
                registry.resolve_component_tag(tag)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"[
        { "id": "Knight", "components": ["Health"], "physics": true },
        { "id": "Chest", "components": ["Chest"] },
        { "id": "Marker" }
    ]"#;

    #[test]
    fn test_from_json() {
        let catalog = TemplateCatalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.len(), 3);
        let knight = catalog.get("Knight").unwrap();
        assert_eq!(knight.components, vec!["Health".to_string()]);
        assert!(knight.physics);
        assert!(!catalog.get("Marker").unwrap().physics);
        catalog.validate(&crate::testing::registry()).unwrap();
    }

    #[test]
    fn test_duplicate_template_rejected() {
        let err = TemplateCatalog::from_json(r#"[{ "id": "A" }, { "id": "A" }]"#).unwrap_err();
        assert!(matches!(err, PersistError::DuplicateTemplate(id) if id == "A"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            TemplateCatalog::from_json("{"),
            Err(PersistError::InvalidCatalog(_))
        ));
    }

    #[test]
    fn test_validate_unknown_tag() {
        let mut catalog = TemplateCatalog::new();
        catalog
            .insert(Template::new("Ghost").with_component("Ectoplasm"))
            .unwrap();
        assert!(matches!(
            catalog.validate(&crate::testing::registry()),
            Err(PersistError::UnknownComponentTag(tag)) if tag == "Ectoplasm"
        ));
    }
}
