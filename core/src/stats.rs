//! Run statistics provider. Every counter only ever goes up.

use crate::{event::RestoreWarning, provider::StateProvider, snapshot::RunStatsState};

#[derive(Debug, Clone, Default)]
pub struct RunStatsTracker {
    stats: RunStatsState,
}

impl RunStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &RunStatsState {
        &self.stats
    }

    pub fn total_kills(&self) -> u32 {
        self.stats.kills_by_enemy.values().sum()
    }

    pub fn record_kill(&mut self, kind: &str, is_boss: bool) {
        *self.stats.kills_by_enemy.entry(kind.to_string()).or_insert(0) += 1;
        if is_boss {
            self.stats.bosses_slain += 1;
        }
    }

    pub fn record_gold_earned(&mut self, amount: u32) {
        self.stats.gold_earned = self.stats.gold_earned.saturating_add(amount);
    }

    pub fn record_gold_spent(&mut self, amount: u32) {
        self.stats.gold_spent = self.stats.gold_spent.saturating_add(amount);
    }

    pub fn record_hire(&mut self, type_id: &str) {
        *self.stats.hires_by_defender.entry(type_id.to_string()).or_insert(0) += 1;
    }

    pub fn record_menial_hired(&mut self) {
        self.stats.menials_hired += 1;
    }

    pub fn record_menial_lost(&mut self) {
        self.stats.menials_lost += 1;
    }

    pub fn record_wall_built(&mut self) {
        self.stats.walls_built += 1;
    }

    pub fn record_wall_repair(&mut self, hp: f32) {
        self.stats.wall_hp_repaired += hp.max(0.0).round() as u32;
    }

    pub fn record_ballista_shot(&mut self) {
        self.stats.ballista_shots += 1;
    }

    pub fn record_refugee_saved(&mut self) {
        self.stats.refugees_saved += 1;
    }

    pub fn record_vegetation_cleared(&mut self) {
        self.stats.vegetation_cleared += 1;
    }

    pub fn record_day_survived(&mut self) {
        self.stats.days_survived += 1;
    }

    pub fn observe_defenders_alive(&mut self, alive: u32) {
        self.stats.peak_defenders_alive = self.stats.peak_defenders_alive.max(alive);
    }
}

impl StateProvider for RunStatsTracker {
    type Fragment = RunStatsState;

    fn name(&self) -> &'static str { "stats" }

    fn project_state(&self) -> RunStatsState {
        self.stats.clone()
    }

    fn reconstruct_from(&mut self, fragment: &RunStatsState, _warnings: &mut Vec<RestoreWarning>) {
        self.stats = fragment.clone();
    }
}
