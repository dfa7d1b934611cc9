//! The [`PersistableValue`] trait.
//!
//! Persistable values are immutable tagged data carried inside component
//! state, such as the damage description an arrow delivers on impact. They
//! have no identity of their own: the stream does not preserve references,
//! so two components sharing one value load back with two equal copies.
//! That is only sound because values never change after construction.

use std::fmt;

use persist_codec::{Reader, Writer};

use crate::any::AsAny;
use crate::error::PersistError;
use crate::registry::Registry;

/// Immutable data that can be embedded in a component's saved state.
///
/// Register implementors with
/// [`RegistryBuilder::register_value`](crate::RegistryBuilder::register_value);
/// [`load`](Self::load) becomes the factory the registry calls after reading
/// the tag. Embed values with [`Registry::write_value`] and read them back
/// with [`Registry::read_value`] or [`Registry::read_value_as`].
pub trait PersistableValue: AsAny + fmt::Debug {
    /// Write the fields of this value. The tag has already been written.
    fn save(&self, writer: &mut Writer, registry: &Registry) -> Result<(), PersistError>;

    /// Construct a value from the fields written by [`save`](Self::save).
    fn load(reader: &mut Reader<'_>, registry: &Registry) -> Result<Self, PersistError>
    where
        Self: Sized;

    /// The Rust type name, for diagnostics only. Never written to a stream.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
