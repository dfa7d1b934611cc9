//! The [`PersistableComponent`] trait.
//!
//! A persistable component is mutable behaviour state owned by exactly one
//! entity. In the stream, every component is written as
//!
//! ```text
//! [string tag][bool enabled]<subtype fields>
//! ```
//!
//! The tag and the `enabled` flag are owned by the engine: the tag comes from
//! the [`Registry`] and the flag lives next to the component in the
//! [`World`](crate::World) arena. Implementors only read and write their own
//! fields, so the base part of the record can never be forgotten or written
//! out of order.
//!
//! Components are never removed from a live entity. The stream has no way to
//! say "this component is gone", so loading is always "find the component
//! with this tag or create it, then overwrite its state".

use std::fmt;

use persist_codec::{Reader, Writer};

use crate::any::AsAny;
use crate::error::PersistError;
use crate::registry::Registry;

/// Behaviour state that is saved with its entity.
///
/// Every implementing type must be registered with
/// [`RegistryBuilder::register_component`](crate::RegistryBuilder::register_component)
/// under a tag that never changes once save files exist. The registered
/// [`Default`] value is what a component looks like when a stream mentions
/// it on an entity that does not have it yet.
///
/// # Examples
///
/// ```rust
/// use persist_core::{PersistError, PersistableComponent, Reader, Registry, Writer};
///
/// #[derive(Debug, Default)]
/// struct Health {
///     current: f32,
/// }
///
/// impl PersistableComponent for Health {
///     fn save(&self, writer: &mut Writer, _registry: &Registry) -> Result<(), PersistError> {
///         writer.write_float(self.current);
///         Ok(())
///     }
///
///     fn load(&mut self, reader: &mut Reader<'_>, _registry: &Registry) -> Result<(), PersistError> {
///         self.current = reader.read_float()?;
///         Ok(())
///     }
/// }
/// ```
pub trait PersistableComponent: AsAny + fmt::Debug {
    /// Write the fields specific to this component.
    ///
    /// `registry` is needed to embed [`PersistableValue`](crate::PersistableValue)s.
    fn save(&self, writer: &mut Writer, registry: &Registry) -> Result<(), PersistError>;

    /// Overwrite the fields specific to this component, mirroring [`save`](Self::save).
    ///
    /// Fields that are not part of the saved state keep their current values.
    fn load(&mut self, reader: &mut Reader<'_>, registry: &Registry) -> Result<(), PersistError>;

    /// The Rust type name, for diagnostics only. Never written to a stream.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
