//! Economy provider: gold, menial counters, elapsed time, kill tally.
//!
//! RULES:
//!   - Gold never goes negative: spending checks affordability first.
//!   - idle_menials <= total_menials at all times.
//!   - The menial counters mirror the menial roster; the engine keeps them
//!     in step after every hire, assignment, and loss.

use crate::{
    error::{SimError, SimResult},
    event::RestoreWarning,
    provider::StateProvider,
    snapshot::EconomyState,
};

#[derive(Debug, Clone, Default)]
pub struct Economy {
    gold:            u32,
    total_menials:   u32,
    idle_menials:    u32,
    elapsed_seconds: f64,
    enemies_killed:  u32,
}

impl Economy {
    pub fn new(starting_gold: u32) -> Self {
        Self { gold: starting_gold, ..Self::default() }
    }

    pub fn gold(&self) -> u32 {
        self.gold
    }

    pub fn total_menials(&self) -> u32 {
        self.total_menials
    }

    pub fn idle_menials(&self) -> u32 {
        self.idle_menials
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn enemies_killed(&self) -> u32 {
        self.enemies_killed
    }

    pub fn earn(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    pub fn can_afford(&self, amount: u32) -> bool {
        self.gold >= amount
    }

    pub fn try_spend(&mut self, amount: u32) -> SimResult<()> {
        if !self.can_afford(amount) {
            return Err(SimError::InsufficientGold {
                needed: amount,
                available: self.gold,
            });
        }
        self.gold -= amount;
        Ok(())
    }

    /// Panics if `idle > total`; callers derive both from the roster.
    pub fn set_menial_counts(&mut self, total: u32, idle: u32) {
        assert!(idle <= total, "idle menials {idle} exceed total {total}");
        self.total_menials = total;
        self.idle_menials = idle;
    }

    pub fn record_kill(&mut self) {
        self.enemies_killed += 1;
    }

    pub fn advance_time(&mut self, seconds: f64) {
        self.elapsed_seconds += seconds.max(0.0);
    }
}

impl StateProvider for Economy {
    type Fragment = EconomyState;

    fn name(&self) -> &'static str { "economy" }

    fn project_state(&self) -> EconomyState {
        EconomyState {
            gold:            self.gold,
            total_menials:   self.total_menials,
            idle_menials:    self.idle_menials,
            elapsed_seconds: self.elapsed_seconds,
            enemies_killed:  self.enemies_killed,
        }
    }

    fn reconstruct_from(&mut self, fragment: &EconomyState, warnings: &mut Vec<RestoreWarning>) {
        let mut idle = fragment.idle_menials;
        if idle > fragment.total_menials {
            warnings.push(RestoreWarning::IdleExceedsTotal {
                idle,
                total: fragment.total_menials,
            });
            idle = fragment.total_menials;
        }
        self.gold = fragment.gold;
        self.total_menials = fragment.total_menials;
        self.idle_menials = idle;
        self.elapsed_seconds = fragment.elapsed_seconds.max(0.0);
        self.enemies_killed = fragment.enemies_killed;
    }
}
