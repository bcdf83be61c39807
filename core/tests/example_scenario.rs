//! The canonical resume: a night-five save with two ballistas and a
//! partly bought wall line.

use marches_core::{
    capture::CaptureCoordinator,
    engine::{RestoreOutcome, RunEngine},
    event::EngineEvent,
    purchases::UpgradeKind,
    snapshot::{BallistaEntry, BallistaUpgrades},
    types::{Phase, Quat, SaveSlot, Vec3},
};

fn ballista(x: f32, damage: f32) -> BallistaEntry {
    BallistaEntry {
        position: Vec3::new(x, 4.0, 0.0),
        rotation: Quat::IDENTITY,
        damage,
        fire_rate: 0.5,
        upgrades: BallistaUpgrades::default(),
    }
}

#[test]
fn night_five_resume() {
    let slot = SaveSlot::new(0);
    let mut engine = RunEngine::build_test(11).unwrap();

    // Plant the save through the store, the way a previous session would have.
    let mut saved = CaptureCoordinator::default().project(&engine.context, slot);
    saved.clock.day = 5;
    saved.clock.phase = Phase::Night;
    saved.clock.is_first_day = false;
    saved.economy.gold = 120;
    saved.ballistas.entries = vec![ballista(-4.0, 10.0), ballista(4.0, 30.0)];
    saved.ballistas.active_index = Some(1);
    saved.purchases.counts.insert("NewWall".into(), 3);
    engine.store.write_slot(&saved).unwrap();

    let report = match engine.apply_pending_restore(slot).unwrap() {
        RestoreOutcome::Restored(report) => report,
        other => panic!("expected a restore, got {other:?}"),
    };
    assert!(report.is_clean(), "{report:?}");

    let ctx = &engine.context;
    let clock = ctx.clock.as_ref().unwrap();
    assert_eq!((clock.day, clock.phase), (5, Phase::Night));
    assert_eq!(ctx.economy.as_ref().unwrap().gold(), 120);

    let ballistas = ctx.ballistas.as_ref().unwrap();
    assert_eq!(ballistas.iter().filter(|b| ballistas.is_active(&b.id)).count(), 1);
    assert_eq!(ballistas.active().unwrap().damage, 30.0);

    // 20 × (1 + 0.25 × 3)
    assert_eq!(ctx.quote(UpgradeKind::NewWall).unwrap(), 35);

    let events = engine.drain_events();
    assert_eq!(events.last(), Some(&EngineEvent::RestoreCompleted { slot }));
    assert!(events.iter().any(|e| matches!(e, EngineEvent::NavigationRebuildRequested { .. })));
}

/// Loading does not consume the slot; the same save can be loaded again.
#[test]
fn slot_survives_being_loaded() {
    let slot = SaveSlot::new(2);
    let mut first = RunEngine::build_test(12).unwrap();
    first.save(slot).unwrap();
    first.apply_pending_restore(slot).unwrap();
    assert!(first.store.slot_exists(slot).unwrap());
}
