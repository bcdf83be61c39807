//! Ground loot provider: gold dropped by slain enemies, waiting for pickup.

use crate::{
    event::RestoreWarning,
    provider::{RosterProvider, StateProvider},
    roster::{Roster, RosterEntity},
    snapshot::LootEntry,
    types::{new_entity_id, EntityId, Quat, Vec3},
};

#[derive(Debug, Clone)]
pub struct LootPile {
    pub id:       EntityId,
    pub position: Vec3,
    pub rotation: Quat,
    pub value:    u32,
}

impl RosterEntity for LootPile {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct GroundLoot {
    piles: Roster<LootPile>,
}

impl GroundLoot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drop_at(&mut self, position: Vec3, rotation: Quat, value: u32) -> EntityId {
        self.piles.push(LootPile { id: new_entity_id(), position, rotation, value })
    }

    /// Removes the pile and returns its value.
    pub fn collect(&mut self, id: &str) -> Option<u32> {
        self.piles.remove(id).map(|p| p.value)
    }

    pub fn total_value(&self) -> u32 {
        self.piles.iter().map(|p| p.value).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LootPile> {
        self.piles.iter()
    }
}

impl StateProvider for GroundLoot {
    type Fragment = Vec<LootEntry>;

    fn name(&self) -> &'static str { "loot" }

    fn project_state(&self) -> Vec<LootEntry> {
        self.piles
            .iter()
            .map(|p| LootEntry { position: p.position, rotation: p.rotation, value: p.value })
            .collect()
    }

    fn reconstruct_from(&mut self, fragment: &Vec<LootEntry>, _warnings: &mut Vec<RestoreWarning>) {
        self.piles.clear();
        for entry in fragment {
            self.piles.push(LootPile {
                id: new_entity_id(),
                position: entry.position,
                rotation: entry.rotation,
                value: entry.value,
            });
        }
    }
}

impl RosterProvider for GroundLoot {
    fn destroy_all_live_defaults(&mut self) -> usize {
        self.piles.clear()
    }

    fn live_count(&self) -> usize {
        self.piles.len()
    }
}
