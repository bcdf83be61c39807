//! Arena for live entities.
//!
//! Entities are stored densely in insertion order; that order is the one
//! snapshots record, so an index taken at capture time means the same
//! slot after a rebuild once the whole list exists.

use crate::types::EntityId;

pub trait RosterEntity {
    fn id(&self) -> &EntityId;
}

#[derive(Debug, Clone)]
pub struct Roster<T> {
    entries: Vec<T>,
}

impl<T> Default for Roster<T> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<T: RosterEntity> Roster<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: T) -> EntityId {
        let id = entity.id().clone();
        self.entries.push(entity);
        id
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.entries.iter_mut().find(|e| e.id() == id)
    }

    pub fn at(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.id() == id)
    }

    /// Removes while keeping the order of the rest.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let idx = self.index_of(id)?;
        Some(self.entries.remove(idx))
    }

    /// Empties the roster. Returns how many entities were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.entries.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
