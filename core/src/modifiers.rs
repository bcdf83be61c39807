//! Derived-modifier composition.
//!
//! RULES:
//!   - Pure and stateless. The same raw inputs always produce the same
//!     effective values, whether called during play or during restore.
//!   - Multiplicative axes combine by straight multiplication. Source order
//!     never changes the result: factors are sorted before the product is
//!     taken, so float rounding cannot leak ordering either.
//!   - Additive axes (starting gold, starting menials) sum first and are
//!     applied before any multiplicative axis.
//!   - The run-score axis is capped at SCORE_MULTIPLIER_CAP.
//!   - Derived values are never persisted. Snapshots carry raw inputs only.

use crate::{
    config::{CommanderDef, EngineConfig, MutatorDef, RelicDef, SynergyDef},
    legacy,
    snapshot::RunModifierState,
    types::Difficulty,
};
use serde::{Deserialize, Serialize};

pub const SCORE_MULTIPLIER_CAP: f64 = 5.0;

/// Strength factor applied to the daily event bundle by amplifying mutators.
pub const DAILY_EVENT_AMPLIFICATION: f64 = 2.0;

/// One modifier source's contribution, one value per gameplay axis.
/// Missing fields deserialize to neutral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierBundle {
    pub defender_damage:       f64,
    pub ballista_damage:       f64,
    pub damage_taken:          f64,
    pub loot_value:            f64,
    pub spawn_volume:          f64,
    pub enemy_health:          f64,
    pub enemy_speed:           f64,
    pub menial_speed:          f64,
    pub ballista_fire_rate:    f64,
    pub defender_attack_speed: f64,
    pub wall_integrity:        f64,
    pub cost:                  f64,
    pub gold_income:           f64,
    pub score:                 f64,
    pub starting_gold:         i32,
    pub starting_menials:      i32,
}

impl ModifierBundle {
    pub const NEUTRAL: ModifierBundle = ModifierBundle {
        defender_damage:       1.0,
        ballista_damage:       1.0,
        damage_taken:          1.0,
        loot_value:            1.0,
        spawn_volume:          1.0,
        enemy_health:          1.0,
        enemy_speed:           1.0,
        menial_speed:          1.0,
        ballista_fire_rate:    1.0,
        defender_attack_speed: 1.0,
        wall_integrity:        1.0,
        cost:                  1.0,
        gold_income:           1.0,
        score:                 1.0,
        starting_gold:         0,
        starting_menials:      0,
    };

    /// Scale every axis's deviation from neutral by `factor`.
    pub fn amplified(&self, factor: f64) -> ModifierBundle {
        let amp = |m: f64| (1.0 + (m - 1.0) * factor).max(0.0);
        ModifierBundle {
            defender_damage:       amp(self.defender_damage),
            ballista_damage:       amp(self.ballista_damage),
            damage_taken:          amp(self.damage_taken),
            loot_value:            amp(self.loot_value),
            spawn_volume:          amp(self.spawn_volume),
            enemy_health:          amp(self.enemy_health),
            enemy_speed:           amp(self.enemy_speed),
            menial_speed:          amp(self.menial_speed),
            ballista_fire_rate:    amp(self.ballista_fire_rate),
            defender_attack_speed: amp(self.defender_attack_speed),
            wall_integrity:        amp(self.wall_integrity),
            cost:                  amp(self.cost),
            gold_income:           amp(self.gold_income),
            score:                 amp(self.score),
            starting_gold:         (self.starting_gold as f64 * factor).round() as i32,
            starting_menials:      (self.starting_menials as f64 * factor).round() as i32,
        }
    }
}

impl Default for ModifierBundle {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

pub fn difficulty_bundle(difficulty: Difficulty) -> ModifierBundle {
    match difficulty {
        Difficulty::Easy => ModifierBundle {
            enemy_health: 0.75,
            spawn_volume: 0.75,
            damage_taken: 0.8,
            score: 0.5,
            ..ModifierBundle::NEUTRAL
        },
        Difficulty::Normal => ModifierBundle::NEUTRAL,
        Difficulty::Hard => ModifierBundle {
            enemy_health: 1.25,
            spawn_volume: 1.3,
            damage_taken: 1.2,
            score: 1.5,
            ..ModifierBundle::NEUTRAL
        },
        Difficulty::Nightmare => ModifierBundle {
            enemy_health: 1.6,
            spawn_volume: 1.6,
            damage_taken: 1.5,
            enemy_speed: 1.1,
            score: 2.5,
            ..ModifierBundle::NEUTRAL
        },
    }
}

// ── Composition ────────────────────────────────────────────────────

/// The folded result of every modifier source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveModifiers {
    axes: ModifierBundle,
}

impl Default for EffectiveModifiers {
    fn default() -> Self {
        Self { axes: ModifierBundle::NEUTRAL }
    }
}

fn product_of(bundles: &[ModifierBundle], axis: fn(&ModifierBundle) -> f64) -> f64 {
    let mut factors: Vec<f64> = bundles.iter().map(axis).collect();
    factors.sort_by(f64::total_cmp);
    factors.into_iter().product()
}

/// Fold any number of bundles into one set of effective values.
pub fn compose(bundles: &[ModifierBundle]) -> EffectiveModifiers {
    let axes = ModifierBundle {
        defender_damage:       product_of(bundles, |b| b.defender_damage),
        ballista_damage:       product_of(bundles, |b| b.ballista_damage),
        damage_taken:          product_of(bundles, |b| b.damage_taken),
        loot_value:            product_of(bundles, |b| b.loot_value),
        spawn_volume:          product_of(bundles, |b| b.spawn_volume),
        enemy_health:          product_of(bundles, |b| b.enemy_health),
        enemy_speed:           product_of(bundles, |b| b.enemy_speed),
        menial_speed:          product_of(bundles, |b| b.menial_speed),
        ballista_fire_rate:    product_of(bundles, |b| b.ballista_fire_rate),
        defender_attack_speed: product_of(bundles, |b| b.defender_attack_speed),
        wall_integrity:        product_of(bundles, |b| b.wall_integrity),
        cost:                  product_of(bundles, |b| b.cost),
        gold_income:           product_of(bundles, |b| b.gold_income),
        score:                 product_of(bundles, |b| b.score).min(SCORE_MULTIPLIER_CAP),
        starting_gold:         bundles.iter().map(|b| b.starting_gold).sum(),
        starting_menials:      bundles.iter().map(|b| b.starting_menials).sum(),
    };
    EffectiveModifiers { axes }
}

impl EffectiveModifiers {
    pub fn axes(&self) -> &ModifierBundle {
        &self.axes
    }

    pub fn score_multiplier(&self) -> f64 {
        self.axes.score
    }

    pub fn starting_gold(&self, base: u32) -> u32 {
        let flat = (base as i64 + self.axes.starting_gold as i64).max(0);
        (flat as f64 * self.axes.gold_income).round() as u32
    }

    /// Never below one: a run always starts with somebody to work.
    pub fn starting_menials(&self, base: u32) -> u32 {
        (base as i64 + self.axes.starting_menials as i64).max(1) as u32
    }

    pub fn scale_cost(&self, base: f64) -> u32 {
        (base * self.axes.cost).round().max(0.0) as u32
    }

    pub fn loot(&self, base: u32) -> u32 {
        (base as f64 * self.axes.loot_value).round() as u32
    }

    pub fn spawn_count(&self, base: u32) -> u32 {
        (base as f64 * self.axes.spawn_volume).round() as u32
    }

    pub fn enemy_health(&self, base: f32) -> f32 {
        base * self.axes.enemy_health as f32
    }

    pub fn enemy_speed(&self, base: f32) -> f32 {
        base * self.axes.enemy_speed as f32
    }

    pub fn wall_health(&self, base: f32) -> f32 {
        base * self.axes.wall_integrity as f32
    }

    pub fn ballista_damage(&self, base: f32) -> f32 {
        base * self.axes.ballista_damage as f32
    }

    pub fn ballista_fire_rate(&self, base: f32) -> f32 {
        base * self.axes.ballista_fire_rate as f32
    }

    pub fn defender_damage(&self, base: f32) -> f32 {
        base * self.axes.defender_damage as f32
    }

    pub fn defender_attack_interval(&self, base: f32) -> f32 {
        if self.axes.defender_attack_speed <= 0.0 {
            return f32::INFINITY;
        }
        base / self.axes.defender_attack_speed as f32
    }

    pub fn menial_speed(&self, base: f32) -> f32 {
        base * self.axes.menial_speed as f32
    }

    pub fn incoming_damage(&self, base: f32) -> f32 {
        base * self.axes.damage_taken as f32
    }

    pub fn gold_income(&self, base: u32) -> u32 {
        (base as f64 * self.axes.gold_income).round() as u32
    }
}

// ── Synergies ──────────────────────────────────────────────────────

/// Synergies whose full prerequisite set is contained in `relics`,
/// ordered by the point in the collection sequence at which each one
/// became complete (catalog order breaks ties).
pub fn active_synergies(catalog: &[SynergyDef], relics: &[String]) -> Vec<String> {
    let mut active: Vec<String> = Vec::new();
    for collected in 1..=relics.len() {
        let prefix = &relics[..collected];
        for synergy in catalog {
            if active.contains(&synergy.id) || synergy.requires.is_empty() {
                continue;
            }
            if synergy.requires.iter().all(|r| prefix.contains(r)) {
                active.push(synergy.id.clone());
            }
        }
    }
    active
}

// ── Source resolution ──────────────────────────────────────────────

/// Every raw modifier source for a run, resolved against the catalogs.
#[derive(Debug, Clone)]
pub struct ModifierSources<'a> {
    pub difficulty:  Difficulty,
    pub commander:   Option<&'a CommanderDef>,
    pub relics:      Vec<&'a RelicDef>,
    pub synergies:   Vec<&'a SynergyDef>,
    pub mutators:    Vec<&'a MutatorDef>,
    pub daily_event: Option<ModifierBundle>,
    pub legacy:      ModifierBundle,
}

impl<'a> ModifierSources<'a> {
    /// Resolve raw run-modifier ids against `config`. Synergies are always
    /// re-derived from the relic list; any persisted synergy ids are ignored.
    /// Unknown ids are skipped.
    pub fn resolve(
        config: &'a EngineConfig,
        raw: &RunModifierState,
        daily_event: Option<&ModifierBundle>,
        legacy_points: u32,
    ) -> Self {
        let commander = raw.commander.as_ref().and_then(|id| {
            let found = config.commanders.get(id);
            if found.is_none() {
                log::warn!("modifiers: unknown commander '{id}' ignored");
            }
            found
        });

        let relics = raw
            .relics
            .iter()
            .filter_map(|id| {
                let found = config.relics.get(id);
                if found.is_none() {
                    log::warn!("modifiers: unknown relic '{id}' ignored");
                }
                found
            })
            .collect();

        let synergies = active_synergies(&config.synergies, &raw.relics)
            .iter()
            .filter_map(|id| config.synergies.iter().find(|s| &s.id == id))
            .collect();

        let mutators = raw
            .mutators
            .iter()
            .filter_map(|id| {
                let found = config.mutators.get(id);
                if found.is_none() {
                    log::warn!("modifiers: unknown mutator '{id}' ignored");
                }
                found
            })
            .collect();

        Self {
            difficulty: raw.difficulty,
            commander,
            relics,
            synergies,
            mutators,
            daily_event: daily_event.copied(),
            legacy: legacy::legacy_bundle(legacy_points),
        }
    }

    /// Flatten into one bundle per source.
    pub fn bundles(&self) -> Vec<ModifierBundle> {
        let mut bundles = vec![difficulty_bundle(self.difficulty), self.legacy];
        if let Some(commander) = self.commander {
            bundles.push(commander.modifiers);
        }
        bundles.extend(self.relics.iter().map(|r| r.modifiers));
        bundles.extend(self.synergies.iter().map(|s| s.modifiers));
        bundles.extend(self.mutators.iter().map(|m| ModifierBundle {
            score: m.modifiers.score * m.score_multiplier,
            ..m.modifiers
        }));
        if let Some(event) = self.daily_event {
            let amplify = self.mutators.iter().any(|m| m.amplifies_daily_events);
            let factor = if amplify { DAILY_EVENT_AMPLIFICATION } else { 1.0 };
            bundles.push(event.amplified(factor));
        }
        bundles
    }

    pub fn compose(&self) -> EffectiveModifiers {
        compose(&self.bundles())
    }
}
