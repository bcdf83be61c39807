//! Defender provider: hired soldiers.
//!
//! Each defender is tied to a template by type id. A stored type id with
//! no template is skipped on rebuild, never fatal.

use crate::{
    config::DefenderTemplate,
    error::{SimError, SimResult},
    event::RestoreWarning,
    modifiers::EffectiveModifiers,
    provider::{RosterProvider, StateProvider},
    roster::{Roster, RosterEntity},
    snapshot::DefenderEntry,
    types::{clamp_health, new_entity_id, EntityId, Quat, Vec3},
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Defender {
    pub id:         EntityId,
    pub type_id:    String,
    pub position:   Vec3,
    pub rotation:   Quat,
    pub health:     f32,
    pub max_health: f32,
}

impl RosterEntity for Defender {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefenderRoster {
    defenders: Roster<Defender>,
    templates: HashMap<String, DefenderTemplate>,
}

impl DefenderRoster {
    pub fn new(templates: HashMap<String, DefenderTemplate>) -> Self {
        Self { defenders: Roster::new(), templates }
    }

    pub fn template(&self, type_id: &str) -> Option<&DefenderTemplate> {
        self.templates.get(type_id)
    }

    pub fn spawn(&mut self, type_id: &str, position: Vec3, rotation: Quat) -> SimResult<EntityId> {
        let template = self.templates.get(type_id).ok_or_else(|| SimError::UnknownCatalogEntry {
            kind: "defender type",
            id: type_id.to_string(),
        })?;
        let max_health = template.max_health;
        Ok(self.defenders.push(Defender {
            id: new_entity_id(),
            type_id: type_id.to_string(),
            position,
            rotation,
            health: max_health,
            max_health,
        }))
    }

    /// Returns the removed defender if the hit was lethal.
    pub fn damage(&mut self, id: &str, amount: f32) -> Option<Defender> {
        let defender = self.defenders.get_mut(id)?;
        defender.health = (defender.health - amount.max(0.0)).max(0.0);
        if defender.health > 0.0 {
            return None;
        }
        self.defenders.remove(id)
    }

    /// Damage per hit after run modifiers. None for an unknown type.
    pub fn effective_damage(&self, id: &str, modifiers: &EffectiveModifiers) -> Option<f32> {
        let defender = self.defenders.get(id)?;
        let template = self.templates.get(&defender.type_id)?;
        Some(modifiers.defender_damage(template.damage))
    }

    pub fn effective_attack_interval(
        &self,
        id: &str,
        modifiers: &EffectiveModifiers,
    ) -> Option<f32> {
        let defender = self.defenders.get(id)?;
        let template = self.templates.get(&defender.type_id)?;
        Some(modifiers.defender_attack_interval(template.attack_interval))
    }

    pub fn get(&self, id: &str) -> Option<&Defender> {
        self.defenders.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Defender> {
        self.defenders.iter()
    }
}

impl StateProvider for DefenderRoster {
    type Fragment = Vec<DefenderEntry>;

    fn name(&self) -> &'static str { "defenders" }

    fn project_state(&self) -> Vec<DefenderEntry> {
        self.defenders
            .iter()
            .map(|d| DefenderEntry {
                type_id: d.type_id.clone(),
                position: d.position,
                rotation: d.rotation,
                health: d.health,
                max_health: d.max_health,
            })
            .collect()
    }

    fn reconstruct_from(
        &mut self,
        fragment: &Vec<DefenderEntry>,
        warnings: &mut Vec<RestoreWarning>,
    ) {
        self.defenders.clear();
        for entry in fragment {
            if !self.templates.contains_key(&entry.type_id) {
                log::warn!("restore: skipping defender with unknown type '{}'", entry.type_id);
                warnings.push(RestoreWarning::UnknownDefenderType {
                    type_id: entry.type_id.clone(),
                });
                continue;
            }
            self.defenders.push(Defender {
                id: new_entity_id(),
                type_id: entry.type_id.clone(),
                position: entry.position,
                rotation: entry.rotation,
                health: clamp_health(entry.health, entry.max_health),
                max_health: entry.max_health,
            });
        }
    }
}

impl RosterProvider for DefenderRoster {
    fn destroy_all_live_defaults(&mut self) -> usize {
        self.defenders.clear()
    }

    fn live_count(&self) -> usize {
        self.defenders.len()
    }
}
