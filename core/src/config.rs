//! Static catalogs and tuning data.
//!
//! Everything here is read-only for the lifetime of a run. Catalog ids are
//! the stable identifiers snapshots refer to.

use crate::{
    modifiers::ModifierBundle,
    purchases::UpgradeKind,
    types::Vec3,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Run modifiers ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutatorDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub score_multiplier: f64,
    #[serde(default)]
    pub modifiers: ModifierBundle,
    #[serde(default)]
    pub incompatible_with: Vec<String>,
    /// Daily event bundles deviate twice as far from neutral.
    #[serde(default)]
    pub amplifies_daily_events: bool,
    #[serde(default)]
    pub forbids_hiring: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelicDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub modifiers: ModifierBundle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynergyDef {
    pub id: String,
    pub name: String,
    pub requires: Vec<String>,
    #[serde(default)]
    pub modifiers: ModifierBundle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommanderDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub modifiers: ModifierBundle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyEventDef {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub modifiers: ModifierBundle,
}

// ── Units ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefenderTemplate {
    pub type_id: String,
    pub name: String,
    pub max_health: f32,
    pub damage: f32,
    /// Seconds between attacks.
    pub attack_interval: f32,
    pub hire_kind: UpgradeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub kind: String,
    pub max_health: f32,
    pub damage: f32,
    pub speed: f32,
    pub loot_value: u32,
    #[serde(default)]
    pub is_boss: bool,
}

// ── Economy ────────────────────────────────────────────────────────

/// `cost(count) = base × (1 + growth × count)` before run modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostCurve {
    pub base: u32,
    pub growth: f64,
}

impl CostCurve {
    pub fn raw_cost(&self, purchases: u32) -> f64 {
        self.base as f64 * (1.0 + self.growth * purchases as f64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CostEntry {
    kind: UpgradeKind,
    #[serde(flatten)]
    curve: CostCurve,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartingConfig {
    pub gold: u32,
    pub menials: u32,
    pub wall_max_health: f32,
    pub wall_positions: Vec<Vec3>,
    pub ballista_positions: Vec<Vec3>,
    pub ballista_damage: f32,
    pub ballista_fire_rate: f32,
    pub ballista_damage_step: f32,
    pub ballista_fire_rate_step: f32,
    pub menial_max_health: f32,
    pub menial_speed: f32,
    pub menial_spawn: Vec3,
    pub opening_enemies: u32,
    pub opening_enemy_kind: String,
    pub enemy_spawn_radius: f32,
    pub day_length_seconds: f64,
    pub night_length_seconds: f64,
    /// Hostile damage grows by this fraction per day survived.
    pub enemy_damage_growth_per_day: f32,
}

// ── File layouts ───────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
struct MutatorsFile {
    mutators: Vec<MutatorDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct RelicsFile {
    relics: Vec<RelicDef>,
    synergies: Vec<SynergyDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct CommandersFile {
    commanders: Vec<CommanderDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct DailyEventsFile {
    events: Vec<DailyEventDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct UnitsFile {
    defenders: Vec<DefenderTemplate>,
    enemies: Vec<EnemyTemplate>,
}

#[derive(Debug, Clone, Deserialize)]
struct EconomyFile {
    costs: Vec<CostEntry>,
    starting: StartingConfig,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub mutators: HashMap<String, MutatorDef>,
    pub relics: HashMap<String, RelicDef>,
    /// Ordered: ties in synergy activation resolve by catalog order.
    pub synergies: Vec<SynergyDef>,
    pub commanders: HashMap<String, CommanderDef>,
    /// Ordered: daily rolls index into this list.
    pub daily_events: Vec<DailyEventDef>,
    pub defenders: HashMap<String, DefenderTemplate>,
    pub enemies: HashMap<String, EnemyTemplate>,
    pub costs: HashMap<UpgradeKind, CostCurve>,
    pub starting: StartingConfig,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    serde_json::from_str(&content).map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))
}

impl EngineConfig {
    /// Load from the data/ directory.
    /// In tests, use EngineConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let mutators: MutatorsFile = read_json(&format!("{data_dir}/mutators.json"))?;
        let relics: RelicsFile = read_json(&format!("{data_dir}/relics.json"))?;
        let commanders: CommandersFile = read_json(&format!("{data_dir}/commanders.json"))?;
        let events: DailyEventsFile = read_json(&format!("{data_dir}/daily_events.json"))?;
        let units: UnitsFile = read_json(&format!("{data_dir}/units.json"))?;
        let economy: EconomyFile = read_json(&format!("{data_dir}/economy.json"))?;

        let config = Self {
            mutators: mutators.mutators.into_iter().map(|m| (m.id.clone(), m)).collect(),
            relics: relics.relics.into_iter().map(|r| (r.id.clone(), r)).collect(),
            synergies: relics.synergies,
            commanders: commanders
                .commanders
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
            daily_events: events.events,
            defenders: units
                .defenders
                .into_iter()
                .map(|d| (d.type_id.clone(), d))
                .collect(),
            enemies: units.enemies.into_iter().map(|e| (e.kind.clone(), e)).collect(),
            costs: economy.costs.into_iter().map(|c| (c.kind, c.curve)).collect(),
            starting: economy.starting,
        };
        config.validate()?;
        Ok(config)
    }

    /// Cross-references that JSON alone cannot enforce.
    fn validate(&self) -> anyhow::Result<()> {
        for synergy in &self.synergies {
            if let Some(missing) = synergy.requires.iter().find(|r| !self.relics.contains_key(*r)) {
                anyhow::bail!("synergy '{}' requires unknown relic '{missing}'", synergy.id);
            }
        }
        for mutator in self.mutators.values() {
            if let Some(missing) = mutator
                .incompatible_with
                .iter()
                .find(|m| !self.mutators.contains_key(*m))
            {
                anyhow::bail!("mutator '{}' lists unknown mutator '{missing}'", mutator.id);
            }
        }
        if !self.enemies.contains_key(&self.starting.opening_enemy_kind) {
            anyhow::bail!(
                "opening enemy kind '{}' has no template",
                self.starting.opening_enemy_kind
            );
        }
        Ok(())
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        let mutators = vec![
            MutatorDef {
                id: "blood_tide".into(),
                name: "Blood Tide".into(),
                description: "Enemy count per day +50%, loot drop +30%".into(),
                score_multiplier: 1.3,
                modifiers: ModifierBundle {
                    spawn_volume: 1.5,
                    loot_value: 1.3,
                    ..ModifierBundle::NEUTRAL
                },
                incompatible_with: vec![],
                amplifies_daily_events: false,
                forbids_hiring: false,
            },
            MutatorDef {
                id: "golden_horde".into(),
                name: "Golden Horde".into(),
                description: "All costs doubled, loot value tripled".into(),
                score_multiplier: 1.2,
                modifiers: ModifierBundle {
                    cost: 2.0,
                    loot_value: 3.0,
                    ..ModifierBundle::NEUTRAL
                },
                incompatible_with: vec![],
                amplifies_daily_events: false,
                forbids_hiring: false,
            },
            MutatorDef {
                id: "lone_ballista".into(),
                name: "Lone Ballista".into(),
                description: "Cannot hire defenders; ballista damage +100%, rate +50%".into(),
                score_multiplier: 1.8,
                modifiers: ModifierBundle {
                    ballista_damage: 2.0,
                    ballista_fire_rate: 1.5,
                    ..ModifierBundle::NEUTRAL
                },
                incompatible_with: vec!["pacifist_run".into()],
                amplifies_daily_events: false,
                forbids_hiring: true,
            },
            MutatorDef {
                id: "pacifist_run".into(),
                name: "Pacifist Run".into(),
                description: "Defenders cannot attack; only repair and body-block".into(),
                score_multiplier: 2.0,
                modifiers: ModifierBundle {
                    defender_damage: 0.0,
                    ..ModifierBundle::NEUTRAL
                },
                incompatible_with: vec!["lone_ballista".into()],
                amplifies_daily_events: false,
                forbids_hiring: false,
            },
            MutatorDef {
                id: "chaos_modifiers".into(),
                name: "Chaos Modifiers".into(),
                description: "Daily event multipliers are 2x stronger".into(),
                score_multiplier: 1.3,
                modifiers: ModifierBundle::NEUTRAL,
                incompatible_with: vec![],
                amplifies_daily_events: true,
                forbids_hiring: false,
            },
            MutatorDef {
                id: "skeleton_crew".into(),
                name: "Skeleton Crew".into(),
                description: "Start with 1 menial".into(),
                score_multiplier: 1.3,
                modifiers: ModifierBundle {
                    starting_menials: -2,
                    ..ModifierBundle::NEUTRAL
                },
                incompatible_with: vec![],
                amplifies_daily_events: false,
                forbids_hiring: false,
            },
        ];

        let relics = vec![
            RelicDef {
                id: "whetstone".into(),
                name: "Whetstone".into(),
                modifiers: ModifierBundle { defender_damage: 1.1, ..ModifierBundle::NEUTRAL },
            },
            RelicDef {
                id: "iron_bands".into(),
                name: "Iron Bands".into(),
                modifiers: ModifierBundle { wall_integrity: 1.15, ..ModifierBundle::NEUTRAL },
            },
            RelicDef {
                id: "war_drum".into(),
                name: "War Drum".into(),
                modifiers: ModifierBundle { defender_attack_speed: 1.1, ..ModifierBundle::NEUTRAL },
            },
            RelicDef {
                id: "lucky_coin".into(),
                name: "Lucky Coin".into(),
                modifiers: ModifierBundle { loot_value: 1.2, ..ModifierBundle::NEUTRAL },
            },
        ];

        let synergies = vec![
            SynergyDef {
                id: "bulwark".into(),
                name: "Bulwark".into(),
                requires: vec!["whetstone".into(), "iron_bands".into()],
                modifiers: ModifierBundle { damage_taken: 0.85, ..ModifierBundle::NEUTRAL },
            },
            SynergyDef {
                id: "war_chest".into(),
                name: "War Chest".into(),
                requires: vec!["war_drum".into(), "lucky_coin".into()],
                modifiers: ModifierBundle { gold_income: 1.25, ..ModifierBundle::NEUTRAL },
            },
        ];

        let commanders = vec![
            CommanderDef {
                id: "quartermaster".into(),
                name: "Quartermaster".into(),
                modifiers: ModifierBundle {
                    cost: 0.9,
                    starting_gold: 20,
                    ..ModifierBundle::NEUTRAL
                },
            },
            CommanderDef {
                id: "siegemaster".into(),
                name: "Siegemaster".into(),
                modifiers: ModifierBundle {
                    ballista_damage: 1.2,
                    starting_menials: 1,
                    ..ModifierBundle::NEUTRAL
                },
            },
        ];

        let daily_events = vec![
            DailyEventDef {
                id: "gold_rush".into(),
                name: "Gold Rush".into(),
                description: "Loot is worth more today".into(),
                modifiers: ModifierBundle { loot_value: 1.5, ..ModifierBundle::NEUTRAL },
            },
            DailyEventDef {
                id: "fog".into(),
                name: "Thick Fog".into(),
                description: "Enemies move slower but hit harder".into(),
                modifiers: ModifierBundle {
                    enemy_speed: 0.8,
                    damage_taken: 1.2,
                    ..ModifierBundle::NEUTRAL
                },
            },
            DailyEventDef {
                id: "blood_moon".into(),
                name: "Blood Moon".into(),
                description: "Tougher, more numerous enemies".into(),
                modifiers: ModifierBundle {
                    enemy_health: 1.3,
                    spawn_volume: 1.25,
                    ..ModifierBundle::NEUTRAL
                },
            },
        ];

        let defenders = vec![
            DefenderTemplate {
                type_id: "engineer".into(),
                name: "Engineer".into(),
                max_health: 60.0,
                damage: 4.0,
                attack_interval: 1.5,
                hire_kind: UpgradeKind::HireEngineer,
            },
            DefenderTemplate {
                type_id: "pikeman".into(),
                name: "Pikeman".into(),
                max_health: 120.0,
                damage: 12.0,
                attack_interval: 1.2,
                hire_kind: UpgradeKind::HirePikeman,
            },
            DefenderTemplate {
                type_id: "crossbowman".into(),
                name: "Crossbowman".into(),
                max_health: 70.0,
                damage: 15.0,
                attack_interval: 2.0,
                hire_kind: UpgradeKind::HireCrossbowman,
            },
            DefenderTemplate {
                type_id: "wizard".into(),
                name: "Wizard".into(),
                max_health: 50.0,
                damage: 25.0,
                attack_interval: 3.0,
                hire_kind: UpgradeKind::HireWizard,
            },
        ];

        let enemies = vec![
            EnemyTemplate {
                kind: "grunt".into(),
                max_health: 40.0,
                damage: 5.0,
                speed: 2.0,
                loot_value: 3,
                is_boss: false,
            },
            EnemyTemplate {
                kind: "troll".into(),
                max_health: 200.0,
                damage: 20.0,
                speed: 1.2,
                loot_value: 15,
                is_boss: false,
            },
            EnemyTemplate {
                kind: "war_boss".into(),
                max_health: 800.0,
                damage: 40.0,
                speed: 1.0,
                loot_value: 50,
                is_boss: true,
            },
        ];

        let costs = [
            (UpgradeKind::NewWall, CostCurve { base: 20, growth: 0.25 }),
            (UpgradeKind::NewBallista, CostCurve { base: 60, growth: 0.5 }),
            (UpgradeKind::BallistaDamage, CostCurve { base: 30, growth: 0.5 }),
            (UpgradeKind::BallistaFireRate, CostCurve { base: 30, growth: 0.5 }),
            (UpgradeKind::BallistaDoubleShot, CostCurve { base: 80, growth: 0.0 }),
            (UpgradeKind::BallistaBurningBolts, CostCurve { base: 90, growth: 0.0 }),
            (UpgradeKind::HireMenial, CostCurve { base: 10, growth: 0.2 }),
            (UpgradeKind::HireEngineer, CostCurve { base: 25, growth: 0.2 }),
            (UpgradeKind::HirePikeman, CostCurve { base: 30, growth: 0.2 }),
            (UpgradeKind::HireCrossbowman, CostCurve { base: 35, growth: 0.2 }),
            (UpgradeKind::HireWizard, CostCurve { base: 50, growth: 0.2 }),
        ];

        let starting = StartingConfig {
            gold: 100,
            menials: 3,
            wall_max_health: 200.0,
            wall_positions: vec![
                Vec3::new(-6.0, 0.0, 6.0),
                Vec3::new(6.0, 0.0, 6.0),
                Vec3::new(-6.0, 0.0, -6.0),
                Vec3::new(6.0, 0.0, -6.0),
            ],
            ballista_positions: vec![Vec3::new(0.0, 4.0, 0.0)],
            ballista_damage: 10.0,
            ballista_fire_rate: 0.5,
            ballista_damage_step: 5.0,
            ballista_fire_rate_step: 0.1,
            menial_max_health: 30.0,
            menial_speed: 3.0,
            menial_spawn: Vec3::new(0.0, 0.0, 1.0),
            opening_enemies: 2,
            opening_enemy_kind: "grunt".into(),
            enemy_spawn_radius: 40.0,
            day_length_seconds: 180.0,
            night_length_seconds: 120.0,
            enemy_damage_growth_per_day: 0.1,
        };

        Self {
            mutators: mutators.into_iter().map(|m| (m.id.clone(), m)).collect(),
            relics: relics.into_iter().map(|r| (r.id.clone(), r)).collect(),
            synergies,
            commanders: commanders.into_iter().map(|c| (c.id.clone(), c)).collect(),
            daily_events,
            defenders: defenders.into_iter().map(|d| (d.type_id.clone(), d)).collect(),
            enemies: enemies.into_iter().map(|e| (e.kind.clone(), e)).collect(),
            costs: costs.into_iter().collect(),
            starting,
        }
    }
}
