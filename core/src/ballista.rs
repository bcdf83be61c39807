//! Ballista provider: ranged emplacements and which one is manned.
//!
//! The manned ballista is held by id while live and written as an index
//! into the entry list. On rebuild the index is only resolved once every
//! entry exists, and it is resolved by matching the recorded position and
//! stats against the rebuilt list rather than trusting list order alone.

use crate::{
    event::RestoreWarning,
    modifiers::EffectiveModifiers,
    provider::{RosterProvider, StateProvider},
    roster::{Roster, RosterEntity},
    snapshot::{BallistaEntry, BallistaRosterState, BallistaUpgrades},
    types::{new_entity_id, EntityId, Quat, Vec3},
};

#[derive(Debug, Clone)]
pub struct Ballista {
    pub id:        EntityId,
    pub position:  Vec3,
    pub rotation:  Quat,
    /// Base damage including purchased upgrades, before run modifiers.
    pub damage:    f32,
    /// Shots per second including purchased upgrades, before run modifiers.
    pub fire_rate: f32,
    pub upgrades:  BallistaUpgrades,
}

impl Ballista {
    pub fn effective_damage(&self, modifiers: &EffectiveModifiers) -> f32 {
        let per_bolt = modifiers.ballista_damage(self.damage);
        if self.upgrades.double_shot { per_bolt * 2.0 } else { per_bolt }
    }

    pub fn effective_fire_rate(&self, modifiers: &EffectiveModifiers) -> f32 {
        modifiers.ballista_fire_rate(self.fire_rate)
    }
}

impl RosterEntity for Ballista {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct BallistaRoster {
    ballistas: Roster<Ballista>,
    active:    Option<EntityId>,
}

impl BallistaRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(
        &mut self,
        position: Vec3,
        rotation: Quat,
        damage: f32,
        fire_rate: f32,
    ) -> EntityId {
        self.ballistas.push(Ballista {
            id: new_entity_id(),
            position,
            rotation,
            damage,
            fire_rate,
            upgrades: BallistaUpgrades::default(),
        })
    }

    pub fn get(&self, id: &str) -> Option<&Ballista> {
        self.ballistas.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Ballista> {
        self.ballistas.get_mut(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ballista> {
        self.ballistas.iter()
    }

    pub fn set_active(&mut self, id: &str) -> bool {
        if self.ballistas.get(id).is_none() {
            return false;
        }
        self.active = Some(id.to_string());
        true
    }

    pub fn active(&self) -> Option<&Ballista> {
        self.active.as_deref().and_then(|id| self.ballistas.get(id))
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.as_deref() == Some(id)
    }

    /// Re-identify the manned ballista from its recorded entry.
    ///
    /// Candidates must sit at the recorded position and carry the same
    /// damage, fire rate and upgrades. The rebuilt entry at `index` wins when
    /// it qualifies, so two emplacements sharing a position resolve to the one
    /// that was manned.
    fn resolve_active(&mut self, index: usize, recorded: &BallistaEntry) -> Option<EntityId> {
        let same_entry = |b: &Ballista| {
            b.position.approx_eq(&recorded.position)
                && b.damage == recorded.damage
                && b.fire_rate == recorded.fire_rate
                && b.upgrades == recorded.upgrades
        };
        let id = self
            .ballistas
            .at(index)
            .filter(|&b| same_entry(b))
            .or_else(|| self.ballistas.iter().find(|&b| same_entry(b)))
            .map(|b| b.id.clone())?;
        self.active = Some(id.clone());
        Some(id)
    }
}

impl StateProvider for BallistaRoster {
    type Fragment = BallistaRosterState;

    fn name(&self) -> &'static str { "ballistas" }

    fn project_state(&self) -> BallistaRosterState {
        BallistaRosterState {
            entries: self
                .ballistas
                .iter()
                .map(|b| BallistaEntry {
                    position: b.position,
                    rotation: b.rotation,
                    damage: b.damage,
                    fire_rate: b.fire_rate,
                    upgrades: b.upgrades.clone(),
                })
                .collect(),
            active_index: self.active.as_deref().and_then(|id| self.ballistas.index_of(id)),
        }
    }

    fn reconstruct_from(
        &mut self,
        fragment: &BallistaRosterState,
        warnings: &mut Vec<RestoreWarning>,
    ) {
        // Pass 1: the whole list.
        self.ballistas.clear();
        self.active = None;
        for entry in &fragment.entries {
            self.ballistas.push(Ballista {
                id: new_entity_id(),
                position: entry.position,
                rotation: entry.rotation,
                damage: entry.damage,
                fire_rate: entry.fire_rate,
                upgrades: entry.upgrades.clone(),
            });
        }

        // Pass 2: only now is the recorded index meaningful.
        let Some(index) = fragment.active_index else {
            return;
        };
        let resolved = fragment
            .entries
            .get(index)
            .and_then(|entry| self.resolve_active(index, entry));
        if resolved.is_none() {
            warnings.push(RestoreWarning::ActiveBallistaUnresolved { index });
            // Keep a manned ballista if there is one to man.
            self.active = self.ballistas.at(0).map(|b| b.id.clone());
        }
    }
}

impl RosterProvider for BallistaRoster {
    fn destroy_all_live_defaults(&mut self) -> usize {
        self.active = None;
        self.ballistas.clear()
    }

    fn live_count(&self) -> usize {
        self.ballistas.len()
    }
}
