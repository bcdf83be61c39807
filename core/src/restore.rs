//! Snapshot restore: rebuilds a live run from a snapshot.
//!
//! STAGE ORDER (fixed, documented, never reordered):
//!    1. Economy, clock
//!    2. Daily event              (feeds hostile scaling in stage 6)
//!    3. Purchase ledger          (must exist before any price is asked)
//!    4. Fortification            (teardown, rebuild, navigation rebuild)
//!    5. Ballistas                (rebuild all, then resolve the manned one)
//!    6. Enemies                  (teardown, compose modifiers, rebuild)
//!    7. Menials                  (teardown, rebuild, reconcile counters)
//!    8. Defenders                (unknown types skipped with a warning)
//!    9. Ground loot
//!   10. Run modifiers            (mutators re-checked, synergies recomputed)
//!   11. Run statistics
//!   12. Completion signal
//!
//! RULES:
//!   - Stages run strictly in sequence. Each may read the snapshot and any
//!     state rebuilt by an earlier stage.
//!   - Every roster is torn down before it is rebuilt, including entities
//!     that default initialization spawned.
//!   - Nothing short of a panic stops the pipeline once it starts. Bad
//!     entries become warnings; a counter mismatch is reported and repaired.
//!   - Running it twice on the same run is the caller's bug. The coordinator
//!     does not deduplicate.

use crate::{
    context::GameContext,
    error::SimError,
    event::{EngineEvent, RestoreWarning},
    modifiers::ModifierSources,
    provider::{RosterProvider, StateProvider},
    run_modifiers::RunModifiers,
    snapshot::Snapshot,
    types::SaveSlot,
};

/// What a finished restore found and did.
#[derive(Debug)]
pub struct RestoreReport {
    pub slot:     SaveSlot,
    pub warnings: Vec<RestoreWarning>,
    /// Set when the economy counters disagreed with the rebuilt roster.
    /// The counters have already been replaced by the roster's counts.
    pub integrity_failure: Option<SimError>,
    /// Events for outside observers, in emission order.
    pub events:   Vec<EngineEvent>,
}

impl RestoreReport {
    fn new(slot: SaveSlot) -> Self {
        Self { slot, warnings: Vec::new(), integrity_failure: None, events: Vec::new() }
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.integrity_failure.is_none()
    }
}

fn rebuild<P: StateProvider>(
    stage: u8,
    provider: Option<&mut P>,
    fragment: &P::Fragment,
    warnings: &mut Vec<RestoreWarning>,
) {
    match provider {
        Some(p) => {
            log::debug!("stage={stage} restore: rebuilding '{}'", p.name());
            p.reconstruct_from(fragment, warnings);
        }
        None => log::warn!("stage={stage} restore: provider absent, section skipped"),
    }
}

fn teardown<P: RosterProvider>(stage: u8, provider: Option<&mut P>) {
    if let Some(p) = provider {
        let destroyed = p.destroy_all_live_defaults();
        log::debug!("stage={stage} restore: destroyed {destroyed} live '{}' entities", p.name());
    }
}

pub struct RestoreCoordinator;

impl RestoreCoordinator {
    /// Restore a pending snapshot, if there is one.
    pub fn restore_pending(
        ctx: &mut GameContext,
        pending: Option<Snapshot>,
    ) -> Option<RestoreReport> {
        pending.map(|snapshot| Self::restore(ctx, snapshot))
    }

    /// Run the full pipeline. The snapshot is consumed.
    pub fn restore(ctx: &mut GameContext, snapshot: Snapshot) -> RestoreReport {
        let mut report = RestoreReport::new(snapshot.slot);
        let warnings = &mut report.warnings;
        log::info!("slot={} restore: begin (saved {})", snapshot.slot, snapshot.saved_at);

        // Stage 1
        rebuild(1, ctx.economy.as_mut(), &snapshot.economy, warnings);
        rebuild(1, ctx.clock.as_mut(), &snapshot.clock, warnings);

        // Stage 2
        rebuild(2, ctx.daily_events.as_mut(), &snapshot.daily_event, warnings);

        // Stage 3
        rebuild(3, ctx.purchases.as_mut(), &snapshot.purchases, warnings);

        // Stage 4
        teardown(4, ctx.walls.as_mut());
        rebuild(4, ctx.walls.as_mut(), &snapshot.walls, warnings);
        if let Some(walls) = ctx.walls.as_mut() {
            if walls.take_nav_dirty() {
                report
                    .events
                    .push(EngineEvent::NavigationRebuildRequested { walls: walls.live_count() });
            }
        }

        // Stage 5
        teardown(5, ctx.ballistas.as_mut());
        rebuild(5, ctx.ballistas.as_mut(), &snapshot.ballistas, warnings);

        // Stage 6: effective modifiers come from the snapshot's inputs, checked
        // against the catalogs, and the event restored in stage 2. Never from a
        // persisted derived value. Stage 10 reports the validation warnings.
        let run_mods = match ctx.run_modifiers.as_ref() {
            Some(run_mods) => run_mods.validate(&snapshot.run_modifiers, &mut Vec::new()),
            None => RunModifiers::new(&ctx.config, snapshot.run_modifiers.difficulty)
                .validate(&snapshot.run_modifiers, &mut Vec::new()),
        };
        let event = ctx.daily_events.as_ref().and_then(|d| d.current_modifiers());
        let mods =
            ModifierSources::resolve(&ctx.config, &run_mods, event, ctx.legacy_points).compose();
        teardown(6, ctx.enemies.as_mut());
        if let Some(enemies) = ctx.enemies.as_mut() {
            enemies.apply_modifiers(&mods);
        }
        rebuild(6, ctx.enemies.as_mut(), &snapshot.enemies, warnings);

        // Stage 7
        teardown(7, ctx.menials.as_mut());
        rebuild(7, ctx.menials.as_mut(), &snapshot.menials, warnings);
        if let (Some(menials), Some(economy)) = (ctx.menials.as_ref(), ctx.economy.as_mut()) {
            let live = menials.counts();
            let expected = &snapshot.economy;
            if live.total != expected.total_menials || live.idle != expected.idle_menials {
                let mismatch = SimError::CounterMismatch {
                    expected_total: expected.total_menials,
                    expected_idle: expected.idle_menials,
                    live_total: live.total,
                    live_idle: live.idle,
                };
                log::error!("stage=7 restore: {mismatch}; roster counts take over");
                economy.set_menial_counts(live.total, live.idle);
                report.integrity_failure = Some(mismatch);
            }
        }

        // Stage 8
        teardown(8, ctx.defenders.as_mut());
        rebuild(8, ctx.defenders.as_mut(), &snapshot.defenders, warnings);

        // Stage 9
        teardown(9, ctx.loot.as_mut());
        rebuild(9, ctx.loot.as_mut(), &snapshot.loot, warnings);

        // Stage 10
        rebuild(10, ctx.run_modifiers.as_mut(), &snapshot.run_modifiers, warnings);

        // Stage 11
        rebuild(11, ctx.stats.as_mut(), &snapshot.stats, warnings);

        // Stage 12
        for warning in &report.warnings {
            log::warn!("slot={} restore: {warning}", report.slot);
            report.events.push(EngineEvent::RestoreWarningRaised { warning: warning.clone() });
        }
        report.events.push(EngineEvent::RestoreCompleted { slot: report.slot });
        log::info!(
            "slot={} restore: complete with {} warning(s){}",
            report.slot,
            report.warnings.len(),
            if report.integrity_failure.is_some() { ", counters repaired" } else { "" }
        );
        report
    }
}
