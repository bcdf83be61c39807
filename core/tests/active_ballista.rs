//! The manned ballista is saved as an index and found again by position
//! once the whole ballista list has been rebuilt.

use marches_core::{
    capture::CaptureCoordinator,
    engine::RunEngine,
    event::RestoreWarning,
    snapshot::{BallistaEntry, BallistaUpgrades, Snapshot},
    types::{Quat, SaveSlot, Vec3},
};

fn entry(x: f32, damage: f32) -> BallistaEntry {
    BallistaEntry {
        position: Vec3::new(x, 4.0, 0.0),
        rotation: Quat::IDENTITY,
        damage,
        fire_rate: 0.5,
        upgrades: BallistaUpgrades::default(),
    }
}

fn baseline() -> Snapshot {
    let engine = RunEngine::build_test(1).unwrap();
    CaptureCoordinator::default().project(&engine.context, SaveSlot::new(0))
}

/// Whichever of N ballistas was manned, the same one is manned after restore.
#[test]
fn kth_of_n_is_manned_again() {
    for k in 0..4 {
        let mut snapshot = baseline();
        snapshot.ballistas.entries =
            vec![entry(-6.0, 10.0), entry(-2.0, 15.0), entry(2.0, 20.0), entry(6.0, 25.0)];
        snapshot.ballistas.active_index = Some(k);
        let expected = snapshot.ballistas.entries[k].clone();

        let mut engine = RunEngine::build_test(2).unwrap();
        let report = engine.apply_snapshot(snapshot);
        assert!(report.warnings.is_empty(), "k={k}: {:?}", report.warnings);

        let roster = engine.context.ballistas.as_ref().unwrap();
        let active = roster.active().unwrap();
        assert_eq!(active.position, expected.position, "k={k}");
        assert_eq!(active.damage, expected.damage, "k={k}");
        assert_eq!(roster.iter().filter(|b| roster.is_active(&b.id)).count(), 1);
    }
}

/// A run-time choice survives a real save: man the second ballista, save, resume.
#[test]
fn manned_choice_survives_save_and_resume() {
    let mut engine = RunEngine::build_test(3).unwrap();
    let ctx = &mut engine.context;
    ctx.economy.as_mut().unwrap().earn(500);
    let second =
        ctx.build_ballista(Vec3::new(8.0, 4.0, 2.0), Quat::from_yaw_degrees(30.0)).unwrap();
    ctx.man_ballista(&second).unwrap();
    let saved = engine.save(SaveSlot::new(0)).unwrap();

    let mut resumed = RunEngine::build_test(3).unwrap();
    resumed.apply_snapshot(saved);
    let active = resumed.context.ballistas.as_ref().unwrap().active().unwrap().clone();
    assert_eq!(active.position, Vec3::new(8.0, 4.0, 2.0));
    // Fresh ids are handed out on rebuild.
    assert_ne!(active.id, second);
}

/// Two emplacements on the same spot: the recorded index picks between them.
#[test]
fn shared_position_resolves_to_recorded_index() {
    for (k, damage) in [(0, 10.0), (1, 30.0)] {
        let mut snapshot = baseline();
        snapshot.ballistas.entries = vec![entry(0.0, 10.0), entry(0.0, 30.0)];
        snapshot.ballistas.active_index = Some(k);

        let mut engine = RunEngine::build_test(6).unwrap();
        let report = engine.apply_snapshot(snapshot);
        assert!(report.warnings.is_empty(), "k={k}: {:?}", report.warnings);

        let roster = engine.context.ballistas.as_ref().unwrap();
        let active = roster.active().unwrap();
        assert_eq!(active.damage, damage, "k={k}");
        assert_eq!(roster.iter().position(|b| roster.is_active(&b.id)), Some(k));
    }
}

/// An index past the end cannot be resolved; the first ballista is manned instead.
#[test]
fn dangling_index_falls_back_to_first() {
    let mut snapshot = baseline();
    snapshot.ballistas.entries = vec![entry(-3.0, 12.0), entry(3.0, 18.0)];
    snapshot.ballistas.active_index = Some(9);

    let mut engine = RunEngine::build_test(4).unwrap();
    let report = engine.apply_snapshot(snapshot);

    assert_eq!(report.warnings, vec![RestoreWarning::ActiveBallistaUnresolved { index: 9 }]);
    let active = engine.context.ballistas.as_ref().unwrap().active().unwrap();
    assert_eq!(active.damage, 12.0);
}

/// No recorded index means nobody is manning a ballista.
#[test]
fn no_index_means_none_manned() {
    let mut snapshot = baseline();
    snapshot.ballistas.entries = vec![entry(0.0, 10.0)];
    snapshot.ballistas.active_index = None;

    let mut engine = RunEngine::build_test(5).unwrap();
    let report = engine.apply_snapshot(snapshot);
    assert!(report.is_clean());
    assert!(engine.context.ballistas.as_ref().unwrap().active().is_none());
}
