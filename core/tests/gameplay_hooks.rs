//! Run modifiers, legacy bonuses and the day cycle as seen through play.

use marches_core::{
    config::EngineConfig,
    context::RunSetup,
    engine::RunEngine,
    error::SimError,
    purchases::UpgradeKind,
    store::SimStore,
    types::{Phase, Quat, Vec3},
};

fn engine_with(setup: RunSetup) -> Result<RunEngine, SimError> {
    let store = SimStore::in_memory()?;
    store.migrate()?;
    RunEngine::new(EngineConfig::default_test(), store, 31, setup)
}

fn mutators(ids: &[&str]) -> RunSetup {
    RunSetup { mutators: ids.iter().map(|s| s.to_string()).collect(), ..RunSetup::default() }
}

#[test]
fn lone_ballista_forbids_hiring() {
    let mut engine = engine_with(mutators(&["lone_ballista"])).unwrap();
    let err = engine
        .context
        .hire_defender("pikeman", Vec3::ZERO, Quat::IDENTITY)
        .unwrap_err();
    assert!(matches!(err, SimError::HiringForbidden { ref mutator } if mutator == "lone_ballista"));
    assert_eq!(engine.summary().gold, 100, "a refused hire must not charge");
}

#[test]
fn incompatible_mutators_are_rejected_at_setup() {
    let result = engine_with(mutators(&["lone_ballista", "pacifist_run"]));
    assert!(matches!(result, Err(SimError::IncompatibleMutators { .. })));
}

#[test]
fn incompatible_mutator_rejected_mid_run() {
    let mut engine = engine_with(mutators(&["pacifist_run"])).unwrap();
    let err = engine.context.activate_mutator("lone_ballista").unwrap_err();
    assert!(matches!(err, SimError::IncompatibleMutators { .. }));
    assert_eq!(engine.context.run_modifiers.as_ref().unwrap().mutators().len(), 1);
}

#[test]
fn golden_horde_doubles_prices() {
    let engine = engine_with(mutators(&["golden_horde"])).unwrap();
    assert_eq!(engine.context.quote(UpgradeKind::NewWall).unwrap(), 40);
}

#[test]
fn legacy_points_shape_the_opening() {
    let setup = RunSetup { legacy_points: 750, ..RunSetup::default() };
    let engine = engine_with(setup).unwrap();
    let summary = engine.summary();
    assert_eq!(summary.gold, 130);
    assert_eq!(summary.total_menials, 5);
    assert_eq!(summary.idle_menials, 5);
}

#[test]
fn skeleton_crew_starts_with_one_menial() {
    let engine = engine_with(mutators(&["skeleton_crew"])).unwrap();
    assert_eq!(engine.summary().total_menials, 1);
}

#[test]
fn dawn_sends_enemies_home_and_rolls_an_event() {
    let mut engine = engine_with(RunSetup::default()).unwrap();
    assert!(engine.context.daily_events.as_ref().unwrap().current().is_none());

    assert_eq!(engine.advance_phase().unwrap(), Phase::Night);
    let enemies = engine.context.enemies.as_ref().unwrap();
    assert!(enemies.iter().all(|e| !e.retreating));

    assert_eq!(engine.advance_phase().unwrap(), Phase::Day);
    let enemies = engine.context.enemies.as_ref().unwrap();
    assert!(enemies.iter().count() > 0);
    assert!(enemies.iter().all(|e| e.retreating));

    let events = engine.context.daily_events.as_ref().unwrap();
    assert!(events.is_resolved());
    assert!(events.current().is_some());
    assert_eq!(engine.context.stats.as_ref().unwrap().stats().days_survived, 1);
}

#[test]
fn enemies_hit_harder_each_day() {
    let mut engine = engine_with(RunSetup::default()).unwrap();
    for _ in 0..4 {
        engine.advance_phase().unwrap();
    }
    // Day 3: 1 + 0.1 × 2
    assert!((engine.context.enemy_damage_scale() - 1.2).abs() < 1e-6);
    let id =
        engine.context.spawn_enemy("troll", Vec3::new(0.0, 0.0, 30.0), Quat::IDENTITY).unwrap();
    let troll = engine.context.enemies.as_ref().unwrap().get(&id).unwrap();
    assert!((troll.damage_scale - 1.2).abs() < 1e-6);
}

#[test]
fn kills_drop_loot_that_pays_out() {
    let mut engine = engine_with(mutators(&["golden_horde"])).unwrap();
    let ctx = &mut engine.context;
    let grunt = ctx.enemies.as_ref().unwrap().iter().next().unwrap().id.clone();
    // 3 × 3.0
    assert_eq!(ctx.damage_enemy(&grunt, 1_000.0).unwrap(), Some(9));
    let pile = ctx.loot.as_ref().unwrap().iter().next().unwrap().id.clone();
    assert_eq!(ctx.collect_loot(&pile).unwrap(), 9);
    assert_eq!(ctx.economy.as_ref().unwrap().gold(), 109);
    assert_eq!(ctx.economy.as_ref().unwrap().enemies_killed(), 1);
}

#[test]
fn walls_take_damage_and_get_repaired() {
    let mut engine = engine_with(RunSetup::default()).unwrap();
    let ctx = &mut engine.context;
    let wall = ctx.walls.as_ref().unwrap().iter().next().unwrap().id.clone();

    assert!(!ctx.damage_wall(&wall, 50.0).unwrap());
    assert_eq!(ctx.walls.as_ref().unwrap().get(&wall).unwrap().health, 150.0);
    // Repair stops at max health.
    assert_eq!(ctx.repair_wall(&wall, 80.0).unwrap(), 50.0);
    assert_eq!(ctx.stats.as_ref().unwrap().stats().wall_hp_repaired, 50);

    assert!(ctx.damage_wall(&wall, 500.0).unwrap());
    assert_eq!(ctx.walls.as_ref().unwrap().iter().count(), 3);
}

#[test]
fn losing_a_menial_updates_the_counters() {
    let mut engine = engine_with(RunSetup::default()).unwrap();
    let ctx = &mut engine.context;
    let menial = ctx.menials.as_ref().unwrap().iter().next().unwrap().id.clone();

    assert!(!ctx.damage_menial(&menial, 10.0).unwrap());
    assert!(ctx.damage_menial(&menial, 100.0).unwrap());
    let economy = ctx.economy.as_ref().unwrap();
    assert_eq!((economy.total_menials(), economy.idle_menials()), (2, 2));
    assert_eq!(ctx.stats.as_ref().unwrap().stats().menials_lost, 1);
}

#[test]
fn war_drum_shortens_defender_attacks() {
    let mut engine = engine_with(RunSetup::default()).unwrap();
    let ctx = &mut engine.context;
    let pikeman = ctx.hire_defender("pikeman", Vec3::ZERO, Quat::IDENTITY).unwrap();
    let (damage, interval) = ctx.defender_attack(&pikeman).unwrap();
    assert_eq!((damage, interval), (12.0, 1.2));

    ctx.collect_relic("war_drum").unwrap();
    let (_, faster) = ctx.defender_attack(&pikeman).unwrap();
    assert!((faster - 1.2 / 1.1).abs() < 1e-5);

    assert!(!ctx.damage_defender(&pikeman, 20.0).unwrap());
    assert!(ctx.damage_defender(&pikeman, 200.0).unwrap());
    assert!(ctx.defender_attack(&pikeman).is_none());
}

#[test]
fn ticking_runs_the_phase_timer() {
    let mut engine = engine_with(RunSetup::default()).unwrap();
    assert_eq!(engine.tick(100.0).unwrap(), Phase::Day);
    assert_eq!(engine.tick(80.0).unwrap(), Phase::Night);
    assert_eq!(engine.tick(120.0).unwrap(), Phase::Day);
    let summary = engine.summary();
    assert_eq!(summary.day, 2);
    assert_eq!(summary.elapsed_seconds, 300.0);
    assert_eq!(summary.active_ballista_fire_rate, Some(0.5));
}
