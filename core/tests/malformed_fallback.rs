//! Unusable saves never take the run down. The engine falls back to a
//! fresh run and says so.

use marches_core::{
    engine::{RestoreOutcome, RunEngine},
    event::EngineEvent,
    types::SaveSlot,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn garbage_falls_back_to_defaults() {
    init_logging();
    let slot = SaveSlot::new(1);
    let mut engine = RunEngine::build_test(21).unwrap();
    engine.store.write_raw_slot(slot, 4, "{not json").unwrap();
    engine.drain_events();

    let outcome = engine.apply_pending_restore(slot).unwrap();
    assert!(matches!(outcome, RestoreOutcome::FellBackToDefaults { .. }), "{outcome:?}");

    let summary = engine.summary();
    assert_eq!(summary.day, 1);
    assert_eq!(summary.gold, 100);
    assert_eq!(summary.walls, 4);
    assert_eq!(summary.total_menials, 3);

    let events = engine.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::RestoreFellBack { slot: s, .. } if *s == slot)));
    assert!(!events.iter().any(|e| matches!(e, EngineEvent::RestoreCompleted { .. })));
}

/// Negative gold cannot be represented and is rejected at parse time.
#[test]
fn negative_gold_is_malformed() {
    init_logging();
    let slot = SaveSlot::new(0);
    let mut engine = RunEngine::build_test(22).unwrap();
    engine
        .store
        .write_raw_slot(slot, 3, r#"{"slot":0,"saved_at":"x","economy":{"gold":-5}}"#)
        .unwrap();

    let outcome = engine.apply_pending_restore(slot).unwrap();
    assert!(matches!(outcome, RestoreOutcome::FellBackToDefaults { .. }));
    assert_eq!(engine.summary().gold, 100);
}

/// A document with only the header parses; every section takes its default.
#[test]
fn missing_sections_default() {
    let slot = SaveSlot::new(0);
    let mut engine = RunEngine::build_test(23).unwrap();
    engine
        .store
        .write_raw_slot(slot, 1, r#"{"slot":0,"saved_at":"2026-01-01 00:00:00"}"#)
        .unwrap();

    let outcome = engine.apply_pending_restore(slot).unwrap();
    let RestoreOutcome::Restored(report) = outcome else {
        panic!("expected a restore, got {outcome:?}");
    };
    assert!(report.is_clean(), "{report:?}");
    let summary = engine.summary();
    assert_eq!((summary.gold, summary.walls, summary.enemies), (0, 0, 0));
    assert_eq!(summary.day, 1);
}

#[test]
fn empty_slot_means_no_snapshot() {
    let mut engine = RunEngine::build_test(24).unwrap();
    let outcome = engine.apply_pending_restore(SaveSlot::new(2)).unwrap();
    assert!(matches!(outcome, RestoreOutcome::NoSnapshot));
    assert!(engine.restore_applied());
    assert_eq!(engine.summary().walls, 4);
}

#[test]
#[should_panic(expected = "restore already applied")]
fn second_restore_panics() {
    let mut engine = RunEngine::build_test(25).unwrap();
    engine.apply_pending_restore(SaveSlot::new(0)).unwrap();
    let _ = engine.apply_pending_restore(SaveSlot::new(0));
}
