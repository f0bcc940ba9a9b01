//! ECS World - owns every agent and its components

use ahash::AHashMap;
use std::any::TypeId;
use std::collections::BTreeMap;

use crate::core::error::{ArenaError, Result};
use crate::core::types::EntityId;
use crate::ecs::store::{Component, ComponentStore, ErasedStore};

/// Bookkeeping kept for every live agent
#[derive(Debug, Clone)]
struct EntityMeta {
    kind: String,
}

/// The arena world containing all agents
///
/// Agents are kept in an ordered map so every iteration walks them in
/// ascending id order.
pub struct World {
    next_id: u32,
    entities: BTreeMap<EntityId, EntityMeta>,
    stores: AHashMap<TypeId, Box<dyn ErasedStore>>,
}

impl World {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entities: BTreeMap::new(),
            stores: AHashMap::new(),
        }
    }

    /// Allocate a fresh agent with no components
    pub fn spawn(&mut self, kind: impl Into<String>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, EntityMeta { kind: kind.into() });
        id
    }

    /// Remove an agent and every component attached to it
    ///
    /// Returns `false` if the id was not alive.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if self.entities.remove(&id).is_none() {
            return false;
        }
        for store in self.stores.values_mut() {
            store.remove_entity(id);
        }
        true
    }

    #[inline]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn kind_of(&self, id: EntityId) -> Option<&str> {
        self.entities.get(&id).map(|meta| meta.kind.as_str())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All live agents, ascending
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Attach (or replace) a component
    pub fn insert<T: Component>(&mut self, id: EntityId, component: T) -> Result<Option<T>> {
        if !self.contains(id) {
            return Err(ArenaError::EntityNotFound(id));
        }
        self.stores
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStore::<T>::new()));
        let store = self.store_mut::<T>().ok_or(ArenaError::ComponentNotFound {
            entity: id,
            component: T::NAME,
        })?;
        Ok(store.insert(id, component))
    }

    pub fn remove<T: Component>(&mut self, id: EntityId) -> Option<T> {
        self.store_mut::<T>()?.remove(id)
    }

    #[inline]
    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.store::<T>()?.get(id)
    }

    #[inline]
    pub fn get_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.store_mut::<T>()?.get_mut(id)
    }

    /// Like [`World::get`] but reports which component was missing
    pub fn require<T: Component>(&self, id: EntityId) -> Result<&T> {
        if !self.contains(id) {
            return Err(ArenaError::EntityNotFound(id));
        }
        self.get::<T>(id).ok_or(ArenaError::ComponentNotFound {
            entity: id,
            component: T::NAME,
        })
    }

    pub fn require_mut<T: Component>(&mut self, id: EntityId) -> Result<&mut T> {
        if !self.contains(id) {
            return Err(ArenaError::EntityNotFound(id));
        }
        self.get_mut::<T>(id).ok_or(ArenaError::ComponentNotFound {
            entity: id,
            component: T::NAME,
        })
    }

    #[inline]
    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        self.store::<T>().is_some_and(|store| store.contains(id))
    }

    /// Agents carrying component `T`, ascending
    pub fn entities_with<T: Component>(&self) -> Vec<EntityId> {
        match self.store::<T>() {
            Some(store) => self.entities().filter(|id| store.contains(*id)).collect(),
            None => Vec::new(),
        }
    }

    /// Agents satisfying an arbitrary presence predicate, ascending
    pub fn entities_matching(&self, predicate: impl Fn(&World, EntityId) -> bool) -> Vec<EntityId> {
        self.entities().filter(|id| predicate(self, *id)).collect()
    }

    pub fn count_with<T: Component>(&self) -> usize {
        self.store::<T>().map_or(0, |store| store.len())
    }

    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.stores
            .get(&TypeId::of::<T>())
            .and_then(|store| store.as_any().downcast_ref::<ComponentStore<T>>())
    }

    fn store_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.stores
            .get_mut(&TypeId::of::<T>())
            .and_then(|store| store.as_any_mut().downcast_mut::<ComponentStore<T>>())
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}
