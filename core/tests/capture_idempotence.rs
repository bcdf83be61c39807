//! Capturing twice with nothing in between gives the same snapshot.

use chrono::{TimeZone, Utc};
use marches_core::{
    capture::{CaptureCoordinator, TimeSource},
    engine::RunEngine,
    event::EngineEvent,
    snapshot::RunStatsState,
    types::{Quat, SaveSlot, Vec3},
};

fn fixed() -> TimeSource {
    TimeSource::Fixed(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap())
}

#[test]
fn two_captures_are_equal() {
    let mut engine = RunEngine::build_test(11).unwrap().with_time_source(fixed());
    engine.context.build_wall(Vec3::new(1.0, 0.0, 8.0), Quat::IDENTITY).unwrap();

    let first = engine.save(SaveSlot::new(0)).unwrap();
    let second = engine.save(SaveSlot::new(0)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.saved_at, "2026-01-02 03:04:05");
}

/// The stored rows agree as well, not just the in-memory values.
#[test]
fn two_stored_captures_read_back_equal() {
    let mut engine = RunEngine::build_test(12).unwrap().with_time_source(fixed());

    engine.save(SaveSlot::new(2)).unwrap();
    let first = engine.store.read_slot(SaveSlot::new(2)).unwrap().unwrap();
    engine.save(SaveSlot::new(2)).unwrap();
    let second = engine.store.read_slot(SaveSlot::new(2)).unwrap().unwrap();
    assert_eq!(first, second);
}

/// Capture does not mutate the run.
#[test]
fn capture_leaves_live_state_alone() {
    let mut engine = RunEngine::build_test(13).unwrap().with_time_source(fixed());
    let coordinator = CaptureCoordinator::new(fixed());

    let before = coordinator.project(&engine.context, SaveSlot::new(1));
    engine.save(SaveSlot::new(1)).unwrap();
    let after = coordinator.project(&engine.context, SaveSlot::new(1));
    assert_eq!(before, after);
}

/// A provider that never came up produces an empty section, not a failed save.
#[test]
fn absent_provider_yields_default_section() {
    let mut engine = RunEngine::build_test(14).unwrap().with_time_source(fixed());
    engine.context.stats = None;
    engine.context.loot = None;

    let snapshot = engine.save(SaveSlot::new(0)).unwrap();
    assert_eq!(snapshot.stats, RunStatsState::default());
    assert!(snapshot.loot.is_empty());
    assert_eq!(snapshot.walls.len(), 4);
    assert!(engine.store.slot_exists(SaveSlot::new(0)).unwrap());
}

#[test]
fn save_emits_snapshot_captured() {
    let mut engine = RunEngine::build_test(15).unwrap();
    engine.drain_events();
    engine.save(SaveSlot::new(1)).unwrap();
    assert_eq!(
        engine.drain_events(),
        vec![EngineEvent::SnapshotCaptured { slot: SaveSlot::new(1), day: 1 }]
    );
}
