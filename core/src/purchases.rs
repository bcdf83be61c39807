//! Purchase ledger provider: how many of each upgrade this run bought.
//!
//! RULES:
//!   - Counts only ever increase during a run.
//!   - Every price is derived from (count, cost curve, cost modifier) at
//!     query time. Prices are never stored.
//!   - On restore the ledger must be rebuilt before anything asks for a price.

use crate::{
    config::CostCurve,
    event::RestoreWarning,
    modifiers::EffectiveModifiers,
    provider::StateProvider,
    snapshot::PurchaseLedgerState,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Used when a kind has no configured curve.
pub const FALLBACK_COST_CURVE: CostCurve = CostCurve { base: 25, growth: 0.0 };

/// Stable upgrade identifiers. The variant name is the persisted id.
/// Variants are added, never renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UpgradeKind {
    NewWall,
    NewBallista,
    BallistaDamage,
    BallistaFireRate,
    BallistaDoubleShot,
    BallistaBurningBolts,
    HireMenial,
    HireEngineer,
    HirePikeman,
    HireCrossbowman,
    HireWizard,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 11] = [
        UpgradeKind::NewWall,
        UpgradeKind::NewBallista,
        UpgradeKind::BallistaDamage,
        UpgradeKind::BallistaFireRate,
        UpgradeKind::BallistaDoubleShot,
        UpgradeKind::BallistaBurningBolts,
        UpgradeKind::HireMenial,
        UpgradeKind::HireEngineer,
        UpgradeKind::HirePikeman,
        UpgradeKind::HireCrossbowman,
        UpgradeKind::HireWizard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewWall              => "NewWall",
            Self::NewBallista          => "NewBallista",
            Self::BallistaDamage       => "BallistaDamage",
            Self::BallistaFireRate     => "BallistaFireRate",
            Self::BallistaDoubleShot   => "BallistaDoubleShot",
            Self::BallistaBurningBolts => "BallistaBurningBolts",
            Self::HireMenial           => "HireMenial",
            Self::HireEngineer         => "HireEngineer",
            Self::HirePikeman          => "HirePikeman",
            Self::HireCrossbowman      => "HireCrossbowman",
            Self::HireWizard           => "HireWizard",
        }
    }
}

impl fmt::Display for UpgradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpgradeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UpgradeKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown upgrade kind '{s}'"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PurchaseLedger {
    counts: BTreeMap<UpgradeKind, u32>,
    curves: HashMap<UpgradeKind, CostCurve>,
}

impl PurchaseLedger {
    pub fn new(curves: HashMap<UpgradeKind, CostCurve>) -> Self {
        Self { counts: BTreeMap::new(), curves }
    }

    pub fn count(&self, kind: UpgradeKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn record(&mut self, kind: UpgradeKind) -> u32 {
        let count = self.counts.entry(kind).or_insert(0);
        *count += 1;
        *count
    }

    /// Price of the next purchase of `kind`.
    pub fn cost(&self, kind: UpgradeKind, modifiers: &EffectiveModifiers) -> u32 {
        let curve = self.curves.get(&kind).copied().unwrap_or(FALLBACK_COST_CURVE);
        modifiers.scale_cost(curve.raw_cost(self.count(kind)))
    }
}

impl StateProvider for PurchaseLedger {
    type Fragment = PurchaseLedgerState;

    fn name(&self) -> &'static str { "purchases" }

    fn project_state(&self) -> PurchaseLedgerState {
        PurchaseLedgerState {
            counts: self
                .counts
                .iter()
                .filter(|(_, n)| **n > 0)
                .map(|(k, n)| (k.as_str().to_string(), *n))
                .collect(),
        }
    }

    fn reconstruct_from(
        &mut self,
        fragment: &PurchaseLedgerState,
        warnings: &mut Vec<RestoreWarning>,
    ) {
        self.counts.clear();
        for (id, count) in &fragment.counts {
            match id.parse::<UpgradeKind>() {
                Ok(kind) => {
                    self.counts.insert(kind, *count);
                }
                Err(_) => warnings.push(RestoreWarning::UnknownUpgradeKind { id: id.clone() }),
            }
        }
    }
}
