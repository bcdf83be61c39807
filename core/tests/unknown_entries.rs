//! Entries naming something the catalogs no longer contain are skipped
//! one by one. Their neighbours are restored normally.

use marches_core::{
    capture::CaptureCoordinator,
    engine::RunEngine,
    event::{EngineEvent, RestoreWarning},
    purchases::UpgradeKind,
    snapshot::{DefenderEntry, EnemyEntry, Snapshot},
    types::{Quat, SaveSlot, Vec3},
};

fn baseline() -> Snapshot {
    let engine = RunEngine::build_test(1).unwrap();
    CaptureCoordinator::default().project(&engine.context, SaveSlot::new(0))
}

fn defender(type_id: &str) -> DefenderEntry {
    DefenderEntry {
        type_id: type_id.into(),
        position: Vec3::new(1.0, 0.0, 3.0),
        rotation: Quat::IDENTITY,
        health: 40.0,
        max_health: 120.0,
    }
}

#[test]
fn unknown_defender_is_skipped() {
    let mut snapshot = baseline();
    snapshot.defenders = vec![defender("pikeman"), defender("necromancer"), defender("wizard")];

    let mut engine = RunEngine::build_test(2).unwrap();
    let report = engine.apply_snapshot(snapshot);

    assert_eq!(
        report.warnings,
        vec![RestoreWarning::UnknownDefenderType { type_id: "necromancer".into() }]
    );
    let raised: Vec<_> = report
        .events
        .iter()
        .filter(|e| matches!(e, EngineEvent::RestoreWarningRaised { .. }))
        .collect();
    assert_eq!(raised.len(), 1);

    let defenders = engine.context.defenders.as_ref().unwrap();
    let types: Vec<_> = defenders.iter().map(|d| d.type_id.as_str()).collect();
    assert_eq!(types, ["pikeman", "wizard"]);
    // Health comes back as recorded, not reset to the template.
    assert_eq!(defenders.iter().next().unwrap().health, 40.0);
}

#[test]
fn unknown_enemy_kind_is_skipped() {
    let mut snapshot = baseline();
    snapshot.enemies = vec![EnemyEntry {
        kind: "dragon".into(),
        position: Vec3::new(0.0, 0.0, 30.0),
        rotation: Quat::IDENTITY,
        health: 500.0,
        max_health: 500.0,
        retreating: false,
        damage_scale: 1.0,
    }];

    let mut engine = RunEngine::build_test(3).unwrap();
    let report = engine.apply_snapshot(snapshot);
    assert_eq!(report.warnings, vec![RestoreWarning::UnknownEnemyKind { kind: "dragon".into() }]);
    assert_eq!(engine.context.enemies.as_ref().unwrap().iter().count(), 0);
}

#[test]
fn unknown_upgrade_kind_is_dropped() {
    let mut snapshot = baseline();
    snapshot.purchases.counts.insert("Catapult".into(), 4);
    snapshot.purchases.counts.insert("HireMenial".into(), 2);

    let mut engine = RunEngine::build_test(4).unwrap();
    let report = engine.apply_snapshot(snapshot);
    assert_eq!(
        report.warnings,
        vec![RestoreWarning::UnknownUpgradeKind { id: "Catapult".into() }]
    );
    // 10 × (1 + 0.2 × 2)
    assert_eq!(engine.context.quote(UpgradeKind::HireMenial).unwrap(), 14);
}

#[test]
fn unknown_modifier_ids_are_dropped() {
    let mut snapshot = baseline();
    snapshot.run_modifiers.mutators = vec!["blood_tide".into(), "moon_gravity".into()];
    snapshot.run_modifiers.commander = Some("ghost_king".into());
    snapshot.run_modifiers.relics = vec!["lucky_coin".into(), "cursed_idol".into()];

    let mut engine = RunEngine::build_test(5).unwrap();
    let report = engine.apply_snapshot(snapshot);
    assert_eq!(
        report.warnings,
        vec![
            RestoreWarning::UnknownMutator { id: "moon_gravity".into() },
            RestoreWarning::UnknownCommander { id: "ghost_king".into() },
            RestoreWarning::UnknownRelic { id: "cursed_idol".into() },
        ]
    );
    let run_mods = engine.context.run_modifiers.as_ref().unwrap();
    assert_eq!(run_mods.mutators().to_vec(), vec!["blood_tide".to_string()]);
    assert_eq!(run_mods.commander(), None);
    assert_eq!(run_mods.relics().to_vec(), vec!["lucky_coin".to_string()]);
}

/// A saved mutator list gets the checks live activation applies: a repeat is
/// dropped, and so is a mutator that clashes with one already accepted.
#[test]
fn repeated_and_clashing_mutators_are_dropped() {
    let mut snapshot = baseline();
    snapshot.run_modifiers.mutators = vec![
        "golden_horde".into(),
        "golden_horde".into(),
        "lone_ballista".into(),
        "pacifist_run".into(),
    ];

    let mut engine = RunEngine::build_test(6).unwrap();
    let report = engine.apply_snapshot(snapshot);
    assert_eq!(
        report.warnings,
        vec![
            RestoreWarning::DuplicateMutator { id: "golden_horde".into() },
            RestoreWarning::IncompatibleMutator {
                id: "pacifist_run".into(),
                conflicts_with: "lone_ballista".into(),
            },
        ]
    );
    let run_mods = engine.context.run_modifiers.as_ref().unwrap();
    assert_eq!(
        run_mods.mutators().to_vec(),
        vec!["golden_horde".to_string(), "lone_ballista".to_string()]
    );
    // Doubled once, not twice.
    assert_eq!(engine.context.quote(UpgradeKind::NewWall).unwrap(), 40);

    // Same composition as a run that activated the survivors live.
    let mut live = RunEngine::build_test(1).unwrap();
    live.context.activate_mutator("golden_horde").unwrap();
    live.context.activate_mutator("lone_ballista").unwrap();
    assert_eq!(engine.context.effective_modifiers(), live.context.effective_modifiers());
}
