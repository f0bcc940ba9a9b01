//! Per-kind component storage
//!
//! Every component kind gets its own `ComponentStore<T>`, an id → value map.
//! The world keeps them type-erased behind [`ErasedStore`] so that a
//! destroyed agent can be stripped from every store without knowing the
//! concrete kinds.

use ahash::AHashMap;
use std::any::Any;

use crate::core::types::EntityId;

/// Capability marker for anything that can be attached to an agent
pub trait Component: Any {
    /// Human-readable kind name used in diagnostics
    const NAME: &'static str;
}

/// Storage for one component kind
pub struct ComponentStore<T: Component> {
    items: AHashMap<EntityId, T>,
}

impl<T: Component> ComponentStore<T> {
    pub fn new() -> Self {
        Self {
            items: AHashMap::new(),
        }
    }

    #[inline]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items.get_mut(&id)
    }

    pub fn insert(&mut self, id: EntityId, value: T) -> Option<T> {
        self.items.insert(id, value)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        self.items.remove(&id)
    }

    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.items.iter().map(|(id, value)| (*id, value))
    }
}

impl<T: Component> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Object-safe view of a `ComponentStore<T>`
pub(crate) trait ErasedStore {
    fn remove_entity(&mut self, id: EntityId) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedStore for ComponentStore<T> {
    fn remove_entity(&mut self, id: EntityId) -> bool {
        self.items.remove(&id).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
