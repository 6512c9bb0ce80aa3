//! Entity registry
//!
//! Owns every live entity in insertion order and hands out ids. Ids are
//! never reused within one registry; iteration order is the order entities
//! were added, which keeps collision resolution deterministic.

use super::entity::{Category, Entity, EntityId, UNASSIGNED_ID};

#[derive(Debug, Clone)]
pub struct Registry {
    entities: Vec<Entity>,
    next_id: EntityId,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: UNASSIGNED_ID + 1,
        }
    }

    /// Add an entity, assigning it a fresh id
    pub fn append(&mut self, mut entity: Entity) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        entity.id = id;
        self.entities.push(entity);
        id
    }

    pub fn extend(&mut self, entities: impl IntoIterator<Item = Entity>) -> Vec<EntityId> {
        entities.into_iter().map(|e| self.append(e)).collect()
    }

    /// Swap an entity in place, keeping its id and position in the order.
    /// Returns false when no entity has that id.
    pub fn replace(&mut self, id: EntityId, mut entity: Entity) -> bool {
        match self.entities.iter_mut().find(|e| e.id == id) {
            Some(slot) => {
                entity.id = id;
                *slot = entity;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn as_mut_slice(&mut self) -> &mut [Entity] {
        &mut self.entities
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    /// Live entities of a category
    pub fn count(&self, category: Category) -> usize {
        self.entities
            .iter()
            .filter(|e| e.category() == category && !e.is_destroyed())
            .count()
    }

    /// Drop destroyed entities. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| !e.is_destroyed());
        before - self.entities.len()
    }

    /// Remove everything; ids keep counting up
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Swap the whole set for `entities`, assigning fresh ids
    pub fn replace_all(&mut self, entities: impl IntoIterator<Item = Entity>) -> Vec<EntityId> {
        self.clear();
        self.extend(entities)
    }
}
