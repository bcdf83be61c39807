//! Economy menial counters must agree with the rebuilt menial roster.

use marches_core::{
    capture::CaptureCoordinator,
    engine::RunEngine,
    error::SimError,
    event::RestoreWarning,
    snapshot::{MenialEntry, Snapshot},
    types::{MenialTask, Quat, SaveSlot, Vec3},
};

fn menial(task: MenialTask) -> MenialEntry {
    MenialEntry {
        position: Vec3::new(1.0, 0.0, 1.0),
        rotation: Quat::IDENTITY,
        health: 30.0,
        max_health: 30.0,
        task,
    }
}

fn baseline() -> Snapshot {
    let engine = RunEngine::build_test(1).unwrap();
    CaptureCoordinator::default().project(&engine.context, SaveSlot::new(0))
}

/// idle=2,total=5 with only four menials on record is an integrity failure,
/// and the roster's counts win.
#[test]
fn missing_menial_is_a_counter_mismatch() {
    let mut snapshot = baseline();
    snapshot.economy.total_menials = 5;
    snapshot.economy.idle_menials = 2;
    snapshot.menials = vec![
        menial(MenialTask::Idle),
        menial(MenialTask::Idle),
        menial(MenialTask::Gathering),
        menial(MenialTask::Repairing),
    ];

    let mut engine = RunEngine::build_test(2).unwrap();
    let report = engine.apply_snapshot(snapshot);

    match report.integrity_failure {
        Some(SimError::CounterMismatch {
            expected_total,
            expected_idle,
            live_total,
            live_idle,
        }) => {
            assert_eq!((expected_total, expected_idle), (5, 2));
            assert_eq!((live_total, live_idle), (4, 2));
        }
        other => panic!("expected a counter mismatch, got {other:?}"),
    }
    let economy = engine.context.economy.as_ref().unwrap();
    assert_eq!((economy.total_menials(), economy.idle_menials()), (4, 2));
}

/// The rest of the pipeline still runs after a mismatch.
#[test]
fn mismatch_does_not_stop_later_stages() {
    let mut snapshot = baseline();
    snapshot.economy.total_menials = 9;
    snapshot.run_modifiers.relics = vec!["lucky_coin".into()];
    snapshot.stats.bosses_slain = 3;

    let mut engine = RunEngine::build_test(3).unwrap();
    let report = engine.apply_snapshot(snapshot);

    assert!(report.integrity_failure.is_some());
    assert_eq!(
        engine.context.run_modifiers.as_ref().unwrap().relics().to_vec(),
        vec!["lucky_coin".to_string()]
    );
    assert_eq!(engine.context.stats.as_ref().unwrap().stats().bosses_slain, 3);
}

/// Consistent counters pass untouched.
#[test]
fn matching_counters_pass() {
    let mut snapshot = baseline();
    snapshot.menials = vec![menial(MenialTask::Idle), menial(MenialTask::Building)];
    snapshot.economy.total_menials = 2;
    snapshot.economy.idle_menials = 1;

    let mut engine = RunEngine::build_test(4).unwrap();
    let report = engine.apply_snapshot(snapshot);
    assert!(report.integrity_failure.is_none());
    assert!(report.warnings.is_empty());
}

/// idle > total is clamped with a warning before reconciliation runs.
#[test]
fn idle_above_total_is_clamped_and_reported() {
    let mut snapshot = baseline();
    snapshot.menials = vec![menial(MenialTask::Idle), menial(MenialTask::Idle)];
    snapshot.economy.total_menials = 2;
    snapshot.economy.idle_menials = 3;

    let mut engine = RunEngine::build_test(5).unwrap();
    let report = engine.apply_snapshot(snapshot);

    assert!(report.warnings.contains(&RestoreWarning::IdleExceedsTotal { idle: 3, total: 2 }));
    assert!(report.integrity_failure.is_some());
    let economy = engine.context.economy.as_ref().unwrap();
    assert_eq!((economy.total_menials(), economy.idle_menials()), (2, 2));
}
