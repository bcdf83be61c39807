//! Stage order is observable: the ledger is back before anything is priced,
//! and the day's event is back before enemies are scaled.

use marches_core::{
    capture::CaptureCoordinator,
    engine::RunEngine,
    modifiers::ModifierBundle,
    purchases::{UpgradeKind, FALLBACK_COST_CURVE},
    snapshot::{DailyEventRecord, Snapshot},
    types::{Quat, SaveSlot, Vec3},
};

fn baseline() -> Snapshot {
    let engine = RunEngine::build_test(1).unwrap();
    CaptureCoordinator::default().project(&engine.context, SaveSlot::new(0))
}

/// A ledger implying a higher price than the fallback is what the next purchase pays.
#[test]
fn restored_ledger_sets_next_price() {
    let mut snapshot = baseline();
    snapshot.purchases.counts.insert("NewWall".into(), 6);
    snapshot.economy.gold = 500;

    let mut engine = RunEngine::build_test(2).unwrap();
    engine.apply_snapshot(snapshot);

    // 20 × (1 + 0.25 × 6) = 50
    let quoted = engine.context.quote(UpgradeKind::NewWall).unwrap();
    assert_eq!(quoted, 50);
    assert!(quoted > FALLBACK_COST_CURVE.base);

    engine.context.build_wall(Vec3::new(0.0, 0.0, 12.0), Quat::IDENTITY).unwrap();
    assert_eq!(engine.context.economy.as_ref().unwrap().gold(), 450);
    assert_eq!(engine.context.quote(UpgradeKind::NewWall).unwrap(), 55);
}

/// Purchases made before the restore do not leak into the restored ledger.
#[test]
fn pre_restore_purchases_are_discarded() {
    let snapshot = baseline();

    let mut engine = RunEngine::build_test(3).unwrap();
    engine.context.economy.as_mut().unwrap().earn(200);
    engine.context.build_wall(Vec3::new(0.0, 0.0, 12.0), Quat::IDENTITY).unwrap();
    engine.context.build_wall(Vec3::new(3.0, 0.0, 12.0), Quat::IDENTITY).unwrap();
    assert_eq!(engine.context.quote(UpgradeKind::NewWall).unwrap(), 30);

    engine.apply_snapshot(snapshot);
    assert_eq!(engine.context.quote(UpgradeKind::NewWall).unwrap(), 20);
    assert_eq!(engine.context.walls.as_ref().unwrap().iter().count(), 4);
}

/// Enemy speed after restore reflects the restored event, amplified by an
/// active Chaos Modifiers mutator.
#[test]
fn restored_event_scales_rebuilt_enemies() {
    let mut snapshot = baseline();
    snapshot.run_modifiers.mutators = vec!["chaos_modifiers".into()];
    snapshot.daily_event.event = Some(DailyEventRecord {
        id: "fog".into(),
        name: "Thick Fog".into(),
        description: "Enemies move slower but hit harder".into(),
        modifiers: ModifierBundle { enemy_speed: 0.8, ..ModifierBundle::NEUTRAL },
    });
    snapshot.daily_event.resolved_for_today = true;
    assert!(!snapshot.enemies.is_empty());

    let mut engine = RunEngine::build_test(4).unwrap();
    let report = engine.apply_snapshot(snapshot);
    assert!(report.is_clean(), "{report:?}");

    // grunt speed 2.0 × (1 + (0.8 − 1) × 2) = 1.2
    for enemy in engine.context.enemies.as_ref().unwrap().iter() {
        assert!((enemy.move_speed - 1.2).abs() < 1e-5, "speed {}", enemy.move_speed);
    }
}

/// Once restore finishes, every enemy moves at the speed the live modifiers
/// give it, even when the saved inputs needed cleaning.
#[test]
fn enemy_speeds_match_live_modifiers_after_restore() {
    let mut snapshot = baseline();
    snapshot.run_modifiers.mutators =
        vec!["chaos_modifiers".into(), "moon_gravity".into(), "chaos_modifiers".into()];
    snapshot.daily_event.event = Some(DailyEventRecord {
        id: "fog".into(),
        name: "Thick Fog".into(),
        description: "Enemies move slower but hit harder".into(),
        modifiers: ModifierBundle { enemy_speed: 0.8, ..ModifierBundle::NEUTRAL },
    });
    snapshot.daily_event.resolved_for_today = true;
    assert!(!snapshot.enemies.is_empty());

    let mut engine = RunEngine::build_test(6).unwrap();
    engine.apply_snapshot(snapshot);

    let mods = engine.context.effective_modifiers();
    let enemies = engine.context.enemies.as_ref().unwrap();
    for enemy in enemies.iter() {
        let base = enemies.template(&enemy.kind).unwrap().speed;
        assert_eq!(enemy.move_speed, mods.enemy_speed(base), "{}", enemy.kind);
    }
}

/// Restore tears down what default initialization spawned before rebuilding.
#[test]
fn defaults_are_torn_down_not_merged() {
    let mut snapshot = baseline();
    snapshot.walls.truncate(1);
    snapshot.enemies.clear();

    let mut engine = RunEngine::build_test(5).unwrap();
    assert_eq!(engine.context.walls.as_ref().unwrap().iter().count(), 4);
    assert!(engine.context.enemies.as_ref().unwrap().iter().count() > 0);

    engine.apply_snapshot(snapshot);
    assert_eq!(engine.context.walls.as_ref().unwrap().iter().count(), 1);
    assert_eq!(engine.context.enemies.as_ref().unwrap().iter().count(), 0);
}
