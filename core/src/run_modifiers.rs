//! Run-modifier provider: difficulty, mutators, commander, relics, synergies.
//!
//! RULE: The active-synergy list is a function of the relic list. It is
//! recomputed whenever relics change and on every rebuild; a persisted
//! synergy list is never taken at face value.

use crate::{
    config::{EngineConfig, MutatorDef, SynergyDef},
    error::{SimError, SimResult},
    event::RestoreWarning,
    modifiers::active_synergies,
    provider::StateProvider,
    snapshot::RunModifierState,
    types::Difficulty,
};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct RunModifiers {
    difficulty: Difficulty,
    mutators:   Vec<String>,
    commander:  Option<String>,
    relics:     Vec<String>,
    synergies:  Vec<String>,

    mutator_catalog:   HashMap<String, MutatorDef>,
    relic_catalog:     HashSet<String>,
    commander_catalog: HashSet<String>,
    synergy_catalog:   Vec<SynergyDef>,
}

impl RunModifiers {
    pub fn new(config: &EngineConfig, difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            mutator_catalog: config.mutators.clone(),
            relic_catalog: config.relics.keys().cloned().collect(),
            commander_catalog: config.commanders.keys().cloned().collect(),
            synergy_catalog: config.synergies.clone(),
            ..Self::default()
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn mutators(&self) -> &[String] {
        &self.mutators
    }

    pub fn commander(&self) -> Option<&str> {
        self.commander.as_deref()
    }

    pub fn relics(&self) -> &[String] {
        &self.relics
    }

    pub fn synergies(&self) -> &[String] {
        &self.synergies
    }

    pub fn activate_mutator(&mut self, id: &str) -> SimResult<()> {
        if !self.mutator_catalog.contains_key(id) {
            return Err(SimError::UnknownCatalogEntry {
                kind: "mutator",
                id: id.to_string(),
            });
        }
        if self.mutators.iter().any(|m| m == id) {
            return Ok(());
        }
        if let Some(active) = self.first_clash(&self.mutators, id) {
            return Err(SimError::IncompatibleMutators {
                first: active.clone(),
                second: id.to_string(),
            });
        }
        self.mutators.push(id.to_string());
        Ok(())
    }

    /// The first of `accepted` that cannot run alongside `id`, checked in
    /// both directions.
    fn first_clash<'a>(&self, accepted: &'a [String], id: &str) -> Option<&'a String> {
        let def = self.mutator_catalog.get(id)?;
        accepted.iter().find(|active| {
            def.incompatible_with.contains(*active)
                || self
                    .mutator_catalog
                    .get(*active)
                    .is_some_and(|a| a.incompatible_with.iter().any(|m| m == id))
        })
    }

    pub fn select_commander(&mut self, id: &str) -> SimResult<()> {
        if !self.commander_catalog.contains(id) {
            return Err(SimError::UnknownCatalogEntry {
                kind: "commander",
                id: id.to_string(),
            });
        }
        self.commander = Some(id.to_string());
        Ok(())
    }

    /// Adds a relic and returns any synergies it completed.
    /// Collecting a relic twice changes nothing.
    pub fn collect_relic(&mut self, id: &str) -> SimResult<Vec<String>> {
        if !self.relic_catalog.contains(id) {
            return Err(SimError::UnknownCatalogEntry {
                kind: "relic",
                id: id.to_string(),
            });
        }
        if self.relics.iter().any(|r| r == id) {
            return Ok(Vec::new());
        }
        self.relics.push(id.to_string());
        let before = self.synergies.len();
        self.synergies = active_synergies(&self.synergy_catalog, &self.relics);
        Ok(self.synergies[before..].to_vec())
    }

    /// Checks a persisted run-modifier section against the catalogs with the
    /// rules live play enforces. Unknown ids are dropped, a mutator is
    /// accepted once and only if it clashes with none accepted before it,
    /// relics are de-duplicated, and synergies are derived from the relics
    /// that survive.
    pub fn validate(
        &self,
        fragment: &RunModifierState,
        warnings: &mut Vec<RestoreWarning>,
    ) -> RunModifierState {
        let mut mutators: Vec<String> = Vec::new();
        for id in &fragment.mutators {
            if !self.mutator_catalog.contains_key(id) {
                warnings.push(RestoreWarning::UnknownMutator { id: id.clone() });
            } else if mutators.contains(id) {
                warnings.push(RestoreWarning::DuplicateMutator { id: id.clone() });
            } else if let Some(active) = self.first_clash(&mutators, id) {
                warnings.push(RestoreWarning::IncompatibleMutator {
                    id: id.clone(),
                    conflicts_with: active.clone(),
                });
            } else {
                mutators.push(id.clone());
            }
        }

        let commander = match &fragment.commander {
            Some(id) if self.commander_catalog.contains(id) => Some(id.clone()),
            Some(id) => {
                warnings.push(RestoreWarning::UnknownCommander { id: id.clone() });
                None
            }
            None => None,
        };

        let mut relics: Vec<String> = Vec::new();
        for id in &fragment.relics {
            if !self.relic_catalog.contains(id) {
                warnings.push(RestoreWarning::UnknownRelic { id: id.clone() });
            } else if !relics.contains(id) {
                relics.push(id.clone());
            }
        }

        let synergies = active_synergies(&self.synergy_catalog, &relics);
        if synergies != fragment.synergies {
            warnings.push(RestoreWarning::SynergyMismatch {
                persisted: fragment.synergies.clone(),
                derived: synergies.clone(),
            });
        }

        RunModifierState {
            difficulty: fragment.difficulty,
            mutators,
            commander,
            relics,
            synergies,
        }
    }

    /// The first active mutator that forbids hiring defenders.
    pub fn hiring_forbidden_by(&self) -> Option<&str> {
        self.mutators
            .iter()
            .find(|id| self.mutator_catalog.get(*id).is_some_and(|m| m.forbids_hiring))
            .map(String::as_str)
    }
}

impl StateProvider for RunModifiers {
    type Fragment = RunModifierState;

    fn name(&self) -> &'static str { "run_modifiers" }

    fn project_state(&self) -> RunModifierState {
        RunModifierState {
            difficulty: self.difficulty,
            mutators: self.mutators.clone(),
            commander: self.commander.clone(),
            relics: self.relics.clone(),
            synergies: self.synergies.clone(),
        }
    }

    fn reconstruct_from(
        &mut self,
        fragment: &RunModifierState,
        warnings: &mut Vec<RestoreWarning>,
    ) {
        let validated = self.validate(fragment, warnings);
        self.difficulty = validated.difficulty;
        self.mutators = validated.mutators;
        self.commander = validated.commander;
        self.relics = validated.relics;
        self.synergies = validated.synergies;
    }
}
