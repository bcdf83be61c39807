//! Typed notifications the engine hands to outside observers.
//!
//! RULE: Observers (UI refresh, navigation bake) learn about engine
//! activity ONLY through these events. They are collected in the engine's
//! outbox and drained by the caller; nothing is dispatched re-entrantly.

use crate::types::{Day, SaveSlot};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    RunInitialized {
        seed: u64,
    },
    SnapshotCaptured {
        slot: SaveSlot,
        day: Day,
    },
    /// The fortification layout changed wholesale.
    NavigationRebuildRequested {
        walls: usize,
    },
    RestoreWarningRaised {
        warning: RestoreWarning,
    },
    /// A pending snapshot could not be used; the run continues from defaults.
    RestoreFellBack {
        slot: SaveSlot,
        reason: String,
    },
    RestoreCompleted {
        slot: SaveSlot,
    },
}

/// A non-fatal problem found while rebuilding state. The affected entry
/// is skipped or clamped and the restore continues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum RestoreWarning {
    UnknownDefenderType { type_id: String },
    UnknownEnemyKind { kind: String },
    UnknownUpgradeKind { id: String },
    UnknownRelic { id: String },
    UnknownMutator { id: String },
    DuplicateMutator { id: String },
    IncompatibleMutator { id: String, conflicts_with: String },
    UnknownCommander { id: String },
    ActiveBallistaUnresolved { index: usize },
    IdleExceedsTotal { idle: u32, total: u32 },
    SynergyMismatch { persisted: Vec<String>, derived: Vec<String> },
    DayIndexClamped { stored: Day },
}

impl fmt::Display for RestoreWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDefenderType { type_id } => {
                write!(f, "skipped defender of unknown type '{type_id}'")
            }
            Self::UnknownEnemyKind { kind } => write!(f, "skipped enemy of unknown kind '{kind}'"),
            Self::UnknownUpgradeKind { id } => {
                write!(f, "dropped purchases of unknown upgrade '{id}'")
            }
            Self::UnknownRelic { id } => write!(f, "dropped unknown relic '{id}'"),
            Self::UnknownMutator { id } => write!(f, "dropped unknown mutator '{id}'"),
            Self::DuplicateMutator { id } => write!(f, "dropped repeated mutator '{id}'"),
            Self::IncompatibleMutator { id, conflicts_with } => {
                write!(f, "dropped mutator '{id}': incompatible with '{conflicts_with}'")
            }
            Self::UnknownCommander { id } => write!(f, "dropped unknown commander '{id}'"),
            Self::ActiveBallistaUnresolved { index } => {
                write!(f, "active ballista index {index} did not match any rebuilt ballista")
            }
            Self::IdleExceedsTotal { idle, total } => {
                write!(f, "idle menials {idle} exceeded total {total}; clamped")
            }
            Self::SynergyMismatch { persisted, derived } => {
                write!(f, "persisted synergies {persisted:?} replaced by derived {derived:?}")
            }
            Self::DayIndexClamped { stored } => write!(f, "day index {stored} raised to 1"),
        }
    }
}
