//! Downcasting support for persistable trait objects.

use std::any::Any;
use std::sync::Arc;

/// Access to the concrete type behind a persistable trait object.
///
/// Implemented for every `Send + Sync + 'static` type, so component and
/// value types never implement it by hand. Call it on the trait object
/// (`&dyn PersistableComponent`), not on the `Box` or `Arc` holding it.
pub trait AsAny: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}
