//! The run engine: bootstrap, save and resume for one run.
//!
//! STARTUP ORDER (fixed, documented, never reordered):
//!   1. initialize defaults    every provider built in its starting state
//!   2. apply pending restore  at most once, only after step 1 completed
//!
//! RULES:
//!   - A restore never races initialization: step 2 is an explicit call,
//!     not something a scheduler decides.
//!   - All randomness flows through the RngBank.
//!   - Observers learn about engine activity only through the outbox.

use crate::{
    capture::{CaptureCoordinator, TimeSource},
    config::EngineConfig,
    context::{GameContext, RunSetup},
    error::{SimError, SimResult},
    event::EngineEvent,
    provider::RosterProvider,
    purchases::UpgradeKind,
    restore::{RestoreCoordinator, RestoreReport},
    rng::{RngBank, RngStream},
    snapshot::Snapshot,
    store::SimStore,
    types::{Day, Phase, SaveSlot},
};
use serde::Serialize;

/// Result of the apply-pending-restore phase.
#[derive(Debug)]
pub enum RestoreOutcome {
    /// The slot was empty. The run continues from defaults.
    NoSnapshot,
    Restored(RestoreReport),
    /// The slot held something unusable. Defaults were rebuilt.
    FellBackToDefaults { reason: String },
}

/// A compact end-of-session view, printed by slot-runner.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub day:                       Day,
    pub phase:                     Phase,
    pub gold:                      u32,
    pub total_menials:             u32,
    pub idle_menials:              u32,
    pub walls:                     usize,
    pub ballistas:                 usize,
    pub active_ballista_damage:    Option<f32>,
    pub active_ballista_fire_rate: Option<f32>,
    pub defenders:                 usize,
    pub enemies:                   usize,
    pub loot_on_ground:            u32,
    pub kills:                     u32,
    pub elapsed_seconds:           f64,
    pub relics:                    Vec<String>,
    pub synergies:                 Vec<String>,
    pub mutators:                  Vec<String>,
    pub daily_event:               Option<String>,
    pub score_multiplier:          f64,
    pub next_wall_cost:            u32,
}

pub struct RunEngine {
    pub context:     GameContext,
    pub store:       SimStore,
    pub rng_bank:    RngBank,
    setup:           RunSetup,
    capture:         CaptureCoordinator,
    restore_applied: bool,
    outbox:          Vec<EngineEvent>,
}

impl RunEngine {
    /// Phase 1: build a run in its default starting state.
    pub fn new(
        config: EngineConfig,
        store: SimStore,
        seed: u64,
        setup: RunSetup,
    ) -> SimResult<Self> {
        let rng_bank = RngBank::new(seed);
        let context = Self::initialize_defaults(config, &setup, &rng_bank)?;
        let mut engine = Self {
            context,
            store,
            rng_bank,
            setup,
            capture: CaptureCoordinator::default(),
            restore_applied: false,
            outbox: Vec::new(),
        };
        engine.outbox.push(EngineEvent::RunInitialized { seed });
        engine.flush_navigation();
        log::info!("engine: run initialized (seed {seed})");
        Ok(engine)
    }

    /// Build an engine on an in-memory store with the test catalogs.
    pub fn build_test(seed: u64) -> SimResult<Self> {
        let store = SimStore::in_memory()?;
        store.migrate()?;
        Self::new(EngineConfig::default_test(), store, seed, RunSetup::default())
    }

    /// Start a run and immediately apply whatever `slot` holds.
    pub fn resume(
        config: EngineConfig,
        store: SimStore,
        seed: u64,
        setup: RunSetup,
        slot: SaveSlot,
    ) -> SimResult<(Self, RestoreOutcome)> {
        let mut engine = Self::new(config, store, seed, setup)?;
        let outcome = engine.apply_pending_restore(slot)?;
        Ok((engine, outcome))
    }

    fn initialize_defaults(
        config: EngineConfig,
        setup: &RunSetup,
        rng_bank: &RngBank,
    ) -> SimResult<GameContext> {
        let mut spawn_rng = rng_bank.for_stream(RngStream::OpeningSpawn);
        GameContext::initialize(config, setup, &mut spawn_rng)
    }

    pub fn with_time_source(mut self, time: TimeSource) -> Self {
        self.capture = CaptureCoordinator::new(time);
        self
    }

    /// Phase 2: load `slot` and rebuild the run from it.
    ///
    /// Panics if called twice on the same engine.
    pub fn apply_pending_restore(&mut self, slot: SaveSlot) -> SimResult<RestoreOutcome> {
        assert!(!self.restore_applied, "restore already applied to this run");
        self.restore_applied = true;

        match self.store.read_slot(slot) {
            Ok(pending) => match RestoreCoordinator::restore_pending(&mut self.context, pending) {
                Some(report) => Ok(RestoreOutcome::Restored(self.finish_restore(report))),
                None => {
                    log::info!("slot={slot} restore: no snapshot, continuing from defaults");
                    Ok(RestoreOutcome::NoSnapshot)
                }
            },
            Err(SimError::MalformedSnapshot { slot: index, source }) => {
                let reason = source.to_string();
                log::warn!(
                    "slot={index} restore: malformed snapshot ({reason}); falling back to defaults"
                );
                self.reset_to_defaults()?;
                self.outbox.push(EngineEvent::RestoreFellBack { slot, reason: reason.clone() });
                Ok(RestoreOutcome::FellBackToDefaults { reason })
            }
            Err(e) => Err(e),
        }
    }

    /// Restore an in-hand snapshot. Subject to the same once-per-run rule.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> RestoreReport {
        assert!(!self.restore_applied, "restore already applied to this run");
        self.restore_applied = true;
        self.restore_snapshot(snapshot)
    }

    fn restore_snapshot(&mut self, snapshot: Snapshot) -> RestoreReport {
        let report = RestoreCoordinator::restore(&mut self.context, snapshot);
        self.finish_restore(report)
    }

    /// Derived values follow the providers as rebuilt, not the stage-6 inputs.
    fn finish_restore(&mut self, report: RestoreReport) -> RestoreReport {
        self.context.refresh_derived();
        self.outbox.extend(report.events.iter().cloned());
        report
    }

    fn reset_to_defaults(&mut self) -> SimResult<()> {
        let config = self.context.config.clone();
        self.context = Self::initialize_defaults(config, &self.setup, &self.rng_bank)?;
        self.flush_navigation();
        Ok(())
    }

    pub fn restore_applied(&self) -> bool {
        self.restore_applied
    }

    // ── Play ──────────────────────────────────────────────────────

    /// Move the clock to the next phase.
    pub fn advance_phase(&mut self) -> SimResult<Phase> {
        let new_day = self
            .context
            .clock
            .as_mut()
            .ok_or(SimError::ProviderUnavailable { name: "clock" })?
            .advance_phase();
        self.after_phase_change(new_day)
    }

    /// Let `seconds` of simulation time pass. The phase turns over when
    /// its timer runs out; at most one phase change per call.
    pub fn tick(&mut self, seconds: f64) -> SimResult<Phase> {
        if let Some(economy) = self.context.economy.as_mut() {
            economy.advance_time(seconds);
        }
        let new_day = self
            .context
            .clock
            .as_mut()
            .ok_or(SimError::ProviderUnavailable { name: "clock" })?
            .tick(seconds);
        self.after_phase_change(new_day)
    }

    /// At dawn the day counter has ticked: enemies still on the field
    /// retreat and the day's event is rolled.
    fn after_phase_change(&mut self, new_day: bool) -> SimResult<Phase> {
        let clock = self
            .context
            .clock
            .as_ref()
            .ok_or(SimError::ProviderUnavailable { name: "clock" })?;
        let (day, phase, is_first_day) = (clock.day, clock.phase, clock.is_first_day);

        if new_day {
            if let Some(enemies) = self.context.enemies.as_mut() {
                enemies.order_retreat();
            }
            if let Some(stats) = self.context.stats.as_mut() {
                stats.record_day_survived();
            }
            if let Some(events) = self.context.daily_events.as_mut() {
                events.start_new_day();
                let mut rng = self.rng_bank.for_stream_on_day(RngStream::DailyEvent, day);
                events.resolve_today(is_first_day, &mut rng);
            }
            self.context.refresh_derived();
        }
        log::debug!("engine: day {day} {phase:?}");
        Ok(phase)
    }

    /// Capture the run into `slot`.
    pub fn save(&mut self, slot: SaveSlot) -> SimResult<Snapshot> {
        let snapshot = self.capture.capture(&self.context, slot, &self.store)?;
        self.outbox.push(EngineEvent::SnapshotCaptured { slot, day: snapshot.clock.day });
        Ok(snapshot)
    }

    /// Take every event emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.outbox)
    }

    fn flush_navigation(&mut self) {
        if let Some(walls) = self.context.walls.as_mut() {
            if walls.take_nav_dirty() {
                self.outbox
                    .push(EngineEvent::NavigationRebuildRequested { walls: walls.live_count() });
            }
        }
    }

    pub fn summary(&self) -> RunSummary {
        let ctx = &self.context;
        let mods = ctx.effective_modifiers();
        let run_mods = ctx.run_modifiers.as_ref();
        RunSummary {
            day: ctx.clock.as_ref().map_or(1, |c| c.day),
            phase: ctx.clock.as_ref().map_or(Phase::Day, |c| c.phase),
            gold: ctx.economy.as_ref().map_or(0, |e| e.gold()),
            total_menials: ctx.economy.as_ref().map_or(0, |e| e.total_menials()),
            idle_menials: ctx.economy.as_ref().map_or(0, |e| e.idle_menials()),
            walls: ctx.walls.as_ref().map_or(0, |w| w.live_count()),
            ballistas: ctx.ballistas.as_ref().map_or(0, |b| b.live_count()),
            active_ballista_damage: ctx
                .ballistas
                .as_ref()
                .and_then(|b| b.active())
                .map(|b| b.effective_damage(&mods)),
            active_ballista_fire_rate: ctx
                .ballistas
                .as_ref()
                .and_then(|b| b.active())
                .map(|b| b.effective_fire_rate(&mods)),
            defenders: ctx.defenders.as_ref().map_or(0, |d| d.live_count()),
            enemies: ctx.enemies.as_ref().map_or(0, |e| e.live_count()),
            loot_on_ground: ctx.loot.as_ref().map_or(0, |l| l.total_value()),
            kills: ctx.stats.as_ref().map_or(0, |s| s.total_kills()),
            elapsed_seconds: ctx.economy.as_ref().map_or(0.0, |e| e.elapsed_seconds()),
            relics: run_mods.map(|r| r.relics().to_vec()).unwrap_or_default(),
            synergies: run_mods.map(|r| r.synergies().to_vec()).unwrap_or_default(),
            mutators: run_mods.map(|r| r.mutators().to_vec()).unwrap_or_default(),
            daily_event: ctx
                .daily_events
                .as_ref()
                .and_then(|d| d.current())
                .map(|e| e.name.clone()),
            score_multiplier: mods.score_multiplier(),
            next_wall_cost: ctx.quote(UpgradeKind::NewWall).unwrap_or(0),
        }
    }
}
