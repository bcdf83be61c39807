//! Menial provider: the laborer roster.
//!
//! The roster is the source of truth for how many menials exist and how
//! many are idle; the economy counters are a mirror of it.

use crate::{
    event::RestoreWarning,
    provider::{RosterProvider, StateProvider},
    roster::{Roster, RosterEntity},
    snapshot::MenialEntry,
    types::{clamp_health, new_entity_id, EntityId, MenialTask, Quat, Vec3},
};

#[derive(Debug, Clone)]
pub struct Menial {
    pub id:         EntityId,
    pub position:   Vec3,
    pub rotation:   Quat,
    pub health:     f32,
    pub max_health: f32,
    pub task:       MenialTask,
}

impl RosterEntity for Menial {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// (total, idle) as counted from the live roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenialCounts {
    pub total: u32,
    pub idle:  u32,
}

#[derive(Debug, Clone, Default)]
pub struct MenialRoster {
    menials: Roster<Menial>,
}

impl MenialRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, position: Vec3, max_health: f32) -> EntityId {
        self.menials.push(Menial {
            id: new_entity_id(),
            position,
            rotation: Quat::IDENTITY,
            health: max_health,
            max_health,
            task: MenialTask::Idle,
        })
    }

    pub fn assign(&mut self, id: &str, task: MenialTask) -> bool {
        match self.menials.get_mut(id) {
            Some(menial) => {
                menial.task = task;
                true
            }
            None => false,
        }
    }

    /// Returns the removed menial if the hit was lethal.
    pub fn damage(&mut self, id: &str, amount: f32) -> Option<Menial> {
        let menial = self.menials.get_mut(id)?;
        menial.health = (menial.health - amount.max(0.0)).max(0.0);
        if menial.health > 0.0 {
            return None;
        }
        self.menials.remove(id)
    }

    pub fn counts(&self) -> MenialCounts {
        let total = self.menials.len() as u32;
        let idle = self.menials.iter().filter(|m| m.task.is_idle()).count() as u32;
        MenialCounts { total, idle }
    }

    pub fn get(&self, id: &str) -> Option<&Menial> {
        self.menials.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Menial> {
        self.menials.iter()
    }
}

impl StateProvider for MenialRoster {
    type Fragment = Vec<MenialEntry>;

    fn name(&self) -> &'static str { "menials" }

    fn project_state(&self) -> Vec<MenialEntry> {
        self.menials
            .iter()
            .map(|m| MenialEntry {
                position: m.position,
                rotation: m.rotation,
                health: m.health,
                max_health: m.max_health,
                task: m.task,
            })
            .collect()
    }

    fn reconstruct_from(
        &mut self,
        fragment: &Vec<MenialEntry>,
        _warnings: &mut Vec<RestoreWarning>,
    ) {
        self.menials.clear();
        for entry in fragment {
            self.menials.push(Menial {
                id: new_entity_id(),
                position: entry.position,
                rotation: entry.rotation,
                health: clamp_health(entry.health, entry.max_health),
                max_health: entry.max_health,
                task: entry.task,
            });
        }
    }
}

impl RosterProvider for MenialRoster {
    fn destroy_all_live_defaults(&mut self) -> usize {
        self.menials.clear()
    }

    fn live_count(&self) -> usize {
        self.menials.len()
    }
}
