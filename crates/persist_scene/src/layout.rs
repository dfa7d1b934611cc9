//! Scene-authored content.

use persist_math::Transform;
use serde::{Deserialize, Serialize};

/// The entities a scene places by itself when it loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneLayout {
    /// Root entities, each with its authored children.
    #[serde(default)]
    pub entities: Vec<AuthoredEntity>,
}

/// An entity placed in a scene at authoring time.
///
/// Authored entities always carry a stable id; it is how saved state finds
/// them again on the next visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthoredEntity {
    pub stable_id: String,
    pub template_id: String,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub children: Vec<AuthoredEntity>,
}

impl SceneLayout {
    /// Number of authored entities, children included.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        fn count(entities: &[AuthoredEntity]) -> usize {
            entities.iter().map(|e| 1 + count(&e.children)).sum()
        }
        count(&self.entities)
    }
}

#[cfg(test)]
mod tests {
    use persist_math::Vec3;

    use super::*;

    #[test]
    fn test_deserialize_with_defaults() {
        let layout: SceneLayout = serde_json::from_str(
            r#"{ "entities": [
                { "stable_id": "gate", "template_id": "Torch",
                  "transform": { "position": [1.0, 2.0, 0.0] },
                  "children": [{ "stable_id": "flame", "template_id": "Torch" }] }
            ] }"#,
        )
        .unwrap();

        assert_eq!(layout.entity_count(), 2);
        let gate = &layout.entities[0];
        assert_eq!(gate.transform, Transform::from_position(Vec3::new(1.0, 2.0, 0.0)));
        assert_eq!(gate.children[0].transform, Transform::IDENTITY);
        assert!(gate.children[0].children.is_empty());
    }

    #[test]
    fn test_empty_layout() {
        let layout: SceneLayout = serde_json::from_str("{}").unwrap();
        assert_eq!(layout, SceneLayout::default());
    }
}
