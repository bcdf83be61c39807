//! Snapshot schema: the flat, serializable picture of a suspended run.
//!
//! RULES:
//!   - No live references. Entities are positional records; the one
//!     cross-entity link (the active ballista) is an index into its list.
//!   - Field names are the stable identifiers. Every section defaults, so
//!     a document missing a section still parses.
//!   - Raw inputs only. Anything derivable from other fields (effective
//!     multipliers, per-entity speeds) is recomputed on restore.

use crate::{
    modifiers::ModifierBundle,
    types::{Day, Difficulty, MenialTask, Phase, Quat, SaveSlot, Vec3},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub slot: SaveSlot,
    /// Human-readable capture time, `%Y-%m-%d %H:%M:%S` UTC.
    pub saved_at: String,
    #[serde(default)]
    pub economy: EconomyState,
    #[serde(default)]
    pub clock: ClockState,
    #[serde(default)]
    pub walls: Vec<WallEntry>,
    #[serde(default)]
    pub ballistas: BallistaRosterState,
    #[serde(default)]
    pub defenders: Vec<DefenderEntry>,
    #[serde(default)]
    pub enemies: Vec<EnemyEntry>,
    #[serde(default)]
    pub menials: Vec<MenialEntry>,
    #[serde(default)]
    pub loot: Vec<LootEntry>,
    #[serde(default)]
    pub purchases: PurchaseLedgerState,
    #[serde(default)]
    pub run_modifiers: RunModifierState,
    #[serde(default)]
    pub daily_event: DailyEventState,
    #[serde(default)]
    pub stats: RunStatsState,
}

impl Snapshot {
    pub fn empty(slot: SaveSlot, saved_at: String) -> Self {
        Self {
            slot,
            saved_at,
            economy: EconomyState::default(),
            clock: ClockState::default(),
            walls: Vec::new(),
            ballistas: BallistaRosterState::default(),
            defenders: Vec::new(),
            enemies: Vec::new(),
            menials: Vec::new(),
            loot: Vec::new(),
            purchases: PurchaseLedgerState::default(),
            run_modifiers: RunModifierState::default(),
            daily_event: DailyEventState::default(),
            stats: RunStatsState::default(),
        }
    }
}

// ── Economy & clock ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyState {
    pub gold:            u32,
    pub total_menials:   u32,
    pub idle_menials:    u32,
    pub elapsed_seconds: f64,
    pub enemies_killed:  u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockState {
    pub day: Day,
    pub phase: Phase,
    pub phase_time_remaining: f64,
    pub is_first_day: bool,
}

impl Default for ClockState {
    fn default() -> Self {
        Self {
            day: 1,
            phase: Phase::Day,
            phase_time_remaining: 0.0,
            is_first_day: true,
        }
    }
}

// ── Rosters ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallEntry {
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    pub health: f32,
    pub max_health: f32,
    #[serde(default)]
    pub under_construction: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BallistaUpgrades {
    pub double_shot:   bool,
    pub burning_bolts: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallistaEntry {
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    pub damage: f32,
    pub fire_rate: f32,
    #[serde(default)]
    pub upgrades: BallistaUpgrades,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BallistaRosterState {
    pub entries: Vec<BallistaEntry>,
    /// Index into `entries` of the ballista the player is manning.
    pub active_index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenderEntry {
    pub type_id: String,
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    pub health: f32,
    pub max_health: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyEntry {
    pub kind: String,
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    pub health: f32,
    pub max_health: f32,
    #[serde(default)]
    pub retreating: bool,
    /// Per-run damage scaling fixed when the enemy spawned.
    pub damage_scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenialEntry {
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    pub health: f32,
    pub max_health: f32,
    #[serde(default)]
    pub task: MenialTask,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootEntry {
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    pub value: u32,
}

// ── Ledgers & modifiers ────────────────────────────────────────────

/// Upgrade-kind identifier → purchases made this run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseLedgerState {
    pub counts: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunModifierState {
    pub difficulty: Difficulty,
    pub mutators: Vec<String>,
    pub commander: Option<String>,
    /// Collection order matters for synergy activation order.
    pub relics: Vec<String>,
    /// Derived from `relics`. Written for inspection, recomputed on restore.
    pub synergies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEventRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub modifiers: ModifierBundle,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyEventState {
    pub event: Option<DailyEventRecord>,
    /// An event was already rolled (possibly "no event") for the current day.
    pub resolved_for_today: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunStatsState {
    pub kills_by_enemy:       BTreeMap<String, u32>,
    pub bosses_slain:         u32,
    pub gold_earned:          u32,
    pub gold_spent:           u32,
    pub hires_by_defender:    BTreeMap<String, u32>,
    pub menials_hired:        u32,
    pub menials_lost:         u32,
    pub walls_built:          u32,
    pub wall_hp_repaired:     u32,
    pub ballista_shots:       u32,
    pub refugees_saved:       u32,
    pub vegetation_cleared:   u32,
    pub peak_defenders_alive: u32,
    pub days_survived:        u32,
}
