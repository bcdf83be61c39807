//! Fortification provider: the wall layout.
//!
//! Any wholesale change to the layout marks the navigation surface dirty;
//! the engine turns that into a NavigationRebuildRequested event.

use crate::{
    event::RestoreWarning,
    provider::{RosterProvider, StateProvider},
    roster::{Roster, RosterEntity},
    snapshot::WallEntry,
    types::{clamp_health, new_entity_id, EntityId, Quat, Vec3},
};

#[derive(Debug, Clone)]
pub struct Wall {
    pub id:                 EntityId,
    pub position:           Vec3,
    pub rotation:           Quat,
    pub health:             f32,
    pub max_health:         f32,
    pub under_construction: bool,
}

impl RosterEntity for Wall {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct WallRoster {
    walls:     Roster<Wall>,
    nav_dirty: bool,
}

impl WallRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// A finished wall at full health, as placed by run initialization.
    pub fn spawn_completed(&mut self, position: Vec3, rotation: Quat, max_health: f32) -> EntityId {
        self.nav_dirty = true;
        self.walls.push(Wall {
            id: new_entity_id(),
            position,
            rotation,
            health: max_health,
            max_health,
            under_construction: false,
        })
    }

    /// A newly bought wall. Starts as a foundation until completed.
    pub fn place_foundation(
        &mut self,
        position: Vec3,
        rotation: Quat,
        max_health: f32,
    ) -> EntityId {
        self.nav_dirty = true;
        self.walls.push(Wall {
            id: new_entity_id(),
            position,
            rotation,
            health: 1.0_f32.min(max_health),
            max_health,
            under_construction: true,
        })
    }

    pub fn complete_construction(&mut self, id: &str) -> bool {
        match self.walls.get_mut(id) {
            Some(wall) if wall.under_construction => {
                wall.under_construction = false;
                wall.health = wall.max_health;
                true
            }
            _ => false,
        }
    }

    /// Returns true if the wall was destroyed.
    pub fn damage(&mut self, id: &str, amount: f32) -> bool {
        let destroyed = match self.walls.get_mut(id) {
            Some(wall) => {
                wall.health = (wall.health - amount.max(0.0)).max(0.0);
                wall.health <= 0.0
            }
            None => false,
        };
        if destroyed {
            self.walls.remove(id);
            self.nav_dirty = true;
        }
        destroyed
    }

    /// Returns the health actually restored.
    pub fn repair(&mut self, id: &str, amount: f32) -> f32 {
        match self.walls.get_mut(id) {
            Some(wall) => {
                let before = wall.health;
                wall.health = (wall.health + amount.max(0.0)).min(wall.max_health);
                wall.health - before
            }
            None => 0.0,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Wall> {
        self.walls.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wall> {
        self.walls.iter()
    }

    /// Clears and returns the dirty flag.
    pub fn take_nav_dirty(&mut self) -> bool {
        std::mem::take(&mut self.nav_dirty)
    }
}

impl StateProvider for WallRoster {
    type Fragment = Vec<WallEntry>;

    fn name(&self) -> &'static str { "fortification" }

    fn project_state(&self) -> Vec<WallEntry> {
        self.walls
            .iter()
            .map(|w| WallEntry {
                position: w.position,
                rotation: w.rotation,
                health: w.health,
                max_health: w.max_health,
                under_construction: w.under_construction,
            })
            .collect()
    }

    fn reconstruct_from(&mut self, fragment: &Vec<WallEntry>, _warnings: &mut Vec<RestoreWarning>) {
        self.walls.clear();
        for entry in fragment {
            self.walls.push(Wall {
                id: new_entity_id(),
                position: entry.position,
                rotation: entry.rotation,
                health: clamp_health(entry.health, entry.max_health),
                max_health: entry.max_health,
                under_construction: entry.under_construction,
            });
        }
        self.nav_dirty = true;
    }
}

impl RosterProvider for WallRoster {
    fn destroy_all_live_defaults(&mut self) -> usize {
        let n = self.walls.clear();
        if n > 0 {
            self.nav_dirty = true;
        }
        n
    }

    fn live_count(&self) -> usize {
        self.walls.len()
    }
}
