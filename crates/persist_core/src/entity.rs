//! Entity handles.
//!
//! An [`EntityId`] names one entity of one [`crate::World`] for as long as
//! the entity lives there. Handles never reach save data: a scene switch or
//! a load recreates entities from snapshots under new handles, and code that
//! must find the same entity again goes through its stable id.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Hands out the handles of one world.
///
/// A world keeps its allocator across [`crate::World::clear`], so an id
/// held from a scene that has since closed stays dead instead of naming an
/// entity of the next scene.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    /// The first handle is `Entity(1)`.
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}
