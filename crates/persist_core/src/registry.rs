//! Stable tags for persistable types.
//!
//! The stream never mentions Rust type names. Every persistable component
//! and value type is registered once, at start-up, under a short string tag
//! that stays fixed for as long as save files using it exist; the type itself
//! can be renamed or moved freely.
//!
//! A [`RegistryBuilder`] collects registrations and rejects duplicates in
//! either direction. [`RegistryBuilder::build`] freezes it into a
//! [`Registry`], which is shared read-only (usually as `Arc<Registry>`) by
//! everything that saves or loads.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use persist_codec::{Reader, Writer};

use crate::component::PersistableComponent;
use crate::error::PersistError;
use crate::value::PersistableValue;

/// Loader invoked after a value tag has been read.
type ValueLoader = fn(&mut Reader<'_>, &Registry) -> Result<Arc<dyn PersistableValue>, PersistError>;

#[derive(Clone, Copy)]
struct ComponentEntry {
    tag: &'static str,
    create: fn() -> Box<dyn PersistableComponent>,
}

#[derive(Clone, Copy)]
struct ValueEntry {
    tag: &'static str,
    load: ValueLoader,
}

fn create_component<T: PersistableComponent + Default>() -> Box<dyn PersistableComponent> {
    Box::new(T::default())
}

fn load_value<T: PersistableValue>(
    reader: &mut Reader<'_>,
    registry: &Registry,
) -> Result<Arc<dyn PersistableValue>, PersistError> {
    Ok(Arc::new(T::load(reader, registry)?))
}

/// Collects component and value registrations before the registry is frozen.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: Registry,
}

impl RegistryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component type under `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::DuplicateComponentTag`] or
    /// [`PersistError::DuplicateComponentType`] if either side is already
    /// registered. Both are programming errors and should abort start-up.
    pub fn register_component<T: PersistableComponent + Default>(
        &mut self,
        tag: &'static str,
    ) -> Result<&mut Self, PersistError> {
        let registry = &mut self.registry;
        if registry.components.contains_key(tag) {
            return Err(PersistError::DuplicateComponentTag(tag));
        }
        let type_id = TypeId::of::<T>();
        if registry.component_tags.contains_key(&type_id) {
            return Err(PersistError::DuplicateComponentType(
                std::any::type_name::<T>(),
            ));
        }

        registry.components.insert(
            tag,
            ComponentEntry {
                tag,
                create: create_component::<T>,
            },
        );
        registry.component_tags.insert(type_id, tag);
        Ok(self)
    }

    /// Register a value type under `tag`. [`PersistableValue::load`] is its
    /// factory.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::DuplicateValueTag`] or
    /// [`PersistError::DuplicateValueType`] if either side is already
    /// registered.
    pub fn register_value<T: PersistableValue>(
        &mut self,
        tag: &'static str,
    ) -> Result<&mut Self, PersistError> {
        let registry = &mut self.registry;
        if registry.values.contains_key(tag) {
            return Err(PersistError::DuplicateValueTag(tag));
        }
        let type_id = TypeId::of::<T>();
        if registry.value_tags.contains_key(&type_id) {
            return Err(PersistError::DuplicateValueType(std::any::type_name::<T>()));
        }

        registry.values.insert(
            tag,
            ValueEntry {
                tag,
                load: load_value::<T>,
            },
        );
        registry.value_tags.insert(type_id, tag);
        Ok(self)
    }

    /// Freeze the registrations.
    #[must_use]
    pub fn build(self) -> Registry {
        self.registry
    }
}

/// Bidirectional maps between persistable types and their stream tags.
#[derive(Default)]
pub struct Registry {
    components: HashMap<&'static str, ComponentEntry>,
    component_tags: HashMap<TypeId, &'static str>,
    values: HashMap<&'static str, ValueEntry>,
    value_tags: HashMap<TypeId, &'static str>,
}

impl Registry {
    /// Start building a registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Returns the tag registered for component type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnregisteredComponent`] if `T` was never registered.
    pub fn component_tag<T: PersistableComponent>(&self) -> Result<&'static str, PersistError> {
        self.component_tags
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(PersistError::UnregisteredComponent(std::any::type_name::<T>()))
    }

    /// Returns the tag registered for the concrete type behind `component`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnregisteredComponent`] if that type was never registered.
    pub fn tag_of_component(
        &self,
        component: &dyn PersistableComponent,
    ) -> Result<&'static str, PersistError> {
        self.component_tags
            .get(&component.as_any().type_id())
            .copied()
            .ok_or_else(|| PersistError::UnregisteredComponent(component.type_name()))
    }

    /// Map a tag read from a stream to its registered, `'static` form.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnknownComponentTag`] for unknown tags.
    pub fn resolve_component_tag(&self, tag: &str) -> Result<&'static str, PersistError> {
        self.components
            .get(tag)
            .map(|entry| entry.tag)
            .ok_or_else(|| PersistError::UnknownComponentTag(tag.to_owned()))
    }

    /// Create a default instance of the component registered under `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnknownComponentTag`] for unknown tags.
    pub fn create_component(
        &self,
        tag: &str,
    ) -> Result<(&'static str, Box<dyn PersistableComponent>), PersistError> {
        let entry = self
            .components
            .get(tag)
            .ok_or_else(|| PersistError::UnknownComponentTag(tag.to_owned()))?;
        Ok((entry.tag, (entry.create)()))
    }

    /// Write one component record: tag, `enabled`, then the component's own
    /// fields.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnregisteredComponent`] before writing
    /// anything if the component's type is not registered.
    pub fn write_component(
        &self,
        writer: &mut Writer,
        enabled: bool,
        component: &dyn PersistableComponent,
    ) -> Result<(), PersistError> {
        let tag = self.tag_of_component(component)?;
        writer.write_string(tag)?;
        writer.write_bool(enabled);
        component.save(writer, self)
    }

    /// Returns the tag registered for value type `T`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnregisteredValue`] if `T` was never registered.
    pub fn value_tag<T: PersistableValue>(&self) -> Result<&'static str, PersistError> {
        self.value_tags
            .get(&TypeId::of::<T>())
            .copied()
            .ok_or(PersistError::UnregisteredValue(std::any::type_name::<T>()))
    }

    /// Write an embedded value: its tag, then its fields.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnregisteredValue`] before writing anything if
    /// the value's type is not registered.
    pub fn write_value(
        &self,
        writer: &mut Writer,
        value: &dyn PersistableValue,
    ) -> Result<(), PersistError> {
        let tag = self
            .value_tags
            .get(&value.as_any().type_id())
            .copied()
            .ok_or_else(|| PersistError::UnregisteredValue(value.type_name()))?;
        writer.write_string(tag)?;
        value.save(writer, self)
    }

    /// Read an embedded value of any registered type.
    ///
    /// # Errors
    ///
    /// Returns [`PersistError::UnknownValueTag`] for unknown tags, or
    /// whatever the value's loader reports.
    pub fn read_value(&self, reader: &mut Reader<'_>) -> Result<Arc<dyn PersistableValue>, PersistError> {
        let tag = reader.read_string()?;
        let entry = self
            .values
            .get(tag.as_str())
            .ok_or(PersistError::UnknownValueTag(tag))?;
        (entry.load)(reader, self)
    }

    /// Read an embedded value that must be a `T`.
    ///
    /// # Errors
    ///
    /// As [`read_value`](Self::read_value), plus
    /// [`PersistError::ValueTypeMismatch`] if the stream holds another type.
    pub fn read_value_as<T: PersistableValue>(&self, reader: &mut Reader<'_>) -> Result<Arc<T>, PersistError> {
        let value = self.read_value(reader)?;
        let tag = self
            .value_tags
            .get(&(*value).as_any().type_id())
            .copied()
            .unwrap_or("<unregistered>");
        value
            .into_any_arc()
            .downcast::<T>()
            .map_err(|_| PersistError::ValueTypeMismatch {
                tag,
                expected: std::any::type_name::<T>(),
            })
    }

    /// Write an optional embedded value as a presence flag plus the value.
    ///
    /// # Errors
    ///
    /// As [`write_value`](Self::write_value).
    pub fn write_optional_value(
        &self,
        writer: &mut Writer,
        value: Option<&dyn PersistableValue>,
    ) -> Result<(), PersistError> {
        match value {
            Some(value) => {
                // Resolve before writing the flag so a failure writes nothing.
                if !self.value_tags.contains_key(&value.as_any().type_id()) {
                    return Err(PersistError::UnregisteredValue(value.type_name()));
                }
                writer.write_bool(true);
                self.write_value(writer, value)
            }
            None => {
                writer.write_bool(false);
                Ok(())
            }
        }
    }

    /// Read a value written by [`write_optional_value`](Self::write_optional_value).
    ///
    /// # Errors
    ///
    /// As [`read_value`](Self::read_value).
    pub fn read_optional_value(
        &self,
        reader: &mut Reader<'_>,
    ) -> Result<Option<Arc<dyn PersistableValue>>, PersistError> {
        if reader.read_bool()? {
            self.read_value(reader).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Returns `true` if component type `T` is registered.
    #[must_use]
    pub fn is_component_registered<T: PersistableComponent>(&self) -> bool {
        self.component_tags.contains_key(&TypeId::of::<T>())
    }

    /// Number of registered component types.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of registered value types.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.values.len()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut components: Vec<_> = self.components.keys().collect();
        components.sort_unstable();
        let mut values: Vec<_> = self.values.keys().collect();
        values.sort_unstable();
        f.debug_struct("Registry")
            .field("components", &components)
            .field("values", &values)
            .finish()
    }
}
