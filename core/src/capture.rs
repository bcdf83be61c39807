//! Snapshot capture.
//!
//! RULES:
//!   - Capture never mutates live state. Providers are projected in any
//!     order; there is no ordering requirement at capture time.
//!   - An absent provider yields an empty section, never a failed capture.
//!   - With a fixed time source, capturing twice without an intervening
//!     mutation yields equal snapshots.

use crate::{
    context::GameContext,
    error::SimResult,
    provider::project_or_default,
    snapshot::Snapshot,
    store::SimStore,
    types::SaveSlot,
};
use chrono::{DateTime, Utc};

pub const SAVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where capture timestamps come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeSource {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl TimeSource {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            TimeSource::System => Utc::now(),
            TimeSource::Fixed(at) => *at,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CaptureCoordinator {
    pub time: TimeSource,
}

impl CaptureCoordinator {
    pub fn new(time: TimeSource) -> Self {
        Self { time }
    }

    /// Assemble a snapshot of `ctx` without touching the store.
    pub fn project(&self, ctx: &GameContext, slot: SaveSlot) -> Snapshot {
        let saved_at = self.time.now().format(SAVED_AT_FORMAT).to_string();
        Snapshot {
            slot,
            saved_at,
            economy: project_or_default("economy", ctx.economy.as_ref()),
            clock: project_or_default("clock", ctx.clock.as_ref()),
            walls: project_or_default("fortification", ctx.walls.as_ref()),
            ballistas: project_or_default("ballistas", ctx.ballistas.as_ref()),
            defenders: project_or_default("defenders", ctx.defenders.as_ref()),
            enemies: project_or_default("enemies", ctx.enemies.as_ref()),
            menials: project_or_default("menials", ctx.menials.as_ref()),
            loot: project_or_default("loot", ctx.loot.as_ref()),
            purchases: project_or_default("purchases", ctx.purchases.as_ref()),
            run_modifiers: project_or_default("run_modifiers", ctx.run_modifiers.as_ref()),
            daily_event: project_or_default("daily_event", ctx.daily_events.as_ref()),
            stats: project_or_default("stats", ctx.stats.as_ref()),
        }
    }

    /// Project `ctx` and write it to `slot`. The write is synchronous.
    pub fn capture(
        &self,
        ctx: &GameContext,
        slot: SaveSlot,
        store: &SimStore,
    ) -> SimResult<Snapshot> {
        let snapshot = self.project(ctx, slot);
        store.write_slot(&snapshot)?;
        log::info!(
            "slot={slot} capture: day {} {:?}, {} gold, {} walls, {} ballistas",
            snapshot.clock.day,
            snapshot.clock.phase,
            snapshot.economy.gold,
            snapshot.walls.len(),
            snapshot.ballistas.entries.len()
        );
        Ok(snapshot)
    }
}
