//! Hostile provider: the live enemy roster.
//!
//! Health, retreat state and per-run damage scaling are persisted as-is.
//! Movement speed is derived from the template and the current effective
//! modifiers, so the engine hands those in (apply_modifiers) before a
//! rebuild and whenever they change.

use crate::{
    config::EnemyTemplate,
    error::{SimError, SimResult},
    event::RestoreWarning,
    modifiers::EffectiveModifiers,
    provider::{RosterProvider, StateProvider},
    roster::{Roster, RosterEntity},
    snapshot::EnemyEntry,
    types::{clamp_health, new_entity_id, EntityId, Quat, Vec3},
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Enemy {
    pub id:           EntityId,
    pub kind:         String,
    pub position:     Vec3,
    pub rotation:     Quat,
    pub health:       f32,
    pub max_health:   f32,
    pub retreating:   bool,
    pub damage_scale: f32,
    /// Derived: template speed × effective enemy speed.
    pub move_speed:   f32,
}

impl RosterEntity for Enemy {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnemyRoster {
    enemies:   Roster<Enemy>,
    templates: HashMap<String, EnemyTemplate>,
    modifiers: EffectiveModifiers,
}

impl EnemyRoster {
    pub fn new(templates: HashMap<String, EnemyTemplate>) -> Self {
        Self {
            enemies: Roster::new(),
            templates,
            modifiers: EffectiveModifiers::default(),
        }
    }

    /// Refresh derived values for the whole roster.
    pub fn apply_modifiers(&mut self, modifiers: &EffectiveModifiers) {
        self.modifiers = *modifiers;
        for enemy in self.enemies.iter_mut() {
            if let Some(template) = self.templates.get(&enemy.kind) {
                enemy.move_speed = modifiers.enemy_speed(template.speed);
            }
        }
    }

    pub fn template(&self, kind: &str) -> Option<&EnemyTemplate> {
        self.templates.get(kind)
    }

    pub fn spawn(
        &mut self,
        kind: &str,
        position: Vec3,
        rotation: Quat,
        damage_scale: f32,
    ) -> SimResult<EntityId> {
        let template = self.templates.get(kind).ok_or_else(|| SimError::UnknownCatalogEntry {
            kind: "enemy kind",
            id: kind.to_string(),
        })?;
        let max_health = self.modifiers.enemy_health(template.max_health);
        let move_speed = self.modifiers.enemy_speed(template.speed);
        Ok(self.enemies.push(Enemy {
            id: new_entity_id(),
            kind: kind.to_string(),
            position,
            rotation,
            health: max_health,
            max_health,
            retreating: false,
            damage_scale,
            move_speed,
        }))
    }

    /// Returns the removed enemy if the hit was lethal.
    pub fn damage(&mut self, id: &str, amount: f32) -> Option<Enemy> {
        let enemy = self.enemies.get_mut(id)?;
        enemy.health = (enemy.health - amount.max(0.0)).max(0.0);
        if enemy.health > 0.0 {
            return None;
        }
        self.enemies.remove(id)
    }

    pub fn order_retreat(&mut self) {
        for enemy in self.enemies.iter_mut() {
            enemy.retreating = true;
        }
    }

    pub fn get(&self, id: &str) -> Option<&Enemy> {
        self.enemies.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }
}

impl StateProvider for EnemyRoster {
    type Fragment = Vec<EnemyEntry>;

    fn name(&self) -> &'static str { "enemies" }

    fn project_state(&self) -> Vec<EnemyEntry> {
        self.enemies
            .iter()
            .map(|e| EnemyEntry {
                kind: e.kind.clone(),
                position: e.position,
                rotation: e.rotation,
                health: e.health,
                max_health: e.max_health,
                retreating: e.retreating,
                damage_scale: e.damage_scale,
            })
            .collect()
    }

    fn reconstruct_from(&mut self, fragment: &Vec<EnemyEntry>, warnings: &mut Vec<RestoreWarning>) {
        self.enemies.clear();
        for entry in fragment {
            let Some(template) = self.templates.get(&entry.kind) else {
                log::warn!("restore: skipping enemy with unknown kind '{}'", entry.kind);
                warnings.push(RestoreWarning::UnknownEnemyKind { kind: entry.kind.clone() });
                continue;
            };
            let move_speed = self.modifiers.enemy_speed(template.speed);
            self.enemies.push(Enemy {
                id: new_entity_id(),
                kind: entry.kind.clone(),
                position: entry.position,
                rotation: entry.rotation,
                health: clamp_health(entry.health, entry.max_health),
                max_health: entry.max_health,
                retreating: entry.retreating,
                damage_scale: entry.damage_scale,
                move_speed,
            });
        }
    }
}

impl RosterProvider for EnemyRoster {
    fn destroy_all_live_defaults(&mut self) -> usize {
        self.enemies.clear()
    }

    fn live_count(&self) -> usize {
        self.enemies.len()
    }
}
