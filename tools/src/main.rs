//! slot-runner: headless driver for the save/restore engine.
//!
//! Usage:
//!   slot-runner new    --slot 0 --seed 42 --nights 3 [--difficulty hard]
//!                      [--commander quartermaster] [--mutator blood_tide]
//!   slot-runner list
//!   slot-runner resume --slot 0
//!   slot-runner delete --slot 0
//!
//! Common flags: --db saves.db --data-dir ./data --legacy-points 0

use anyhow::{bail, Context, Result};
use marches_core::{
    config::EngineConfig,
    context::RunSetup,
    engine::{RestoreOutcome, RunEngine},
    store::SimStore,
    types::{Difficulty, MenialTask, Phase, Quat, SaveSlot, Vec3},
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("list");
    let db = flag(&args, "--db").unwrap_or("saves.db");
    let data_dir = flag(&args, "--data-dir").unwrap_or("./data");
    let seed = parse_arg(&args, "--seed", 42u64);
    let slot_index = parse_arg(&args, "--slot", 0u8);
    let Some(slot) = SaveSlot::checked(slot_index) else {
        bail!("--slot must be 0, 1 or 2 (got {slot_index})");
    };

    let store = SimStore::open(db)?;
    store.migrate()?;

    match command {
        "list" => {
            let slots = store.list_slots()?;
            if slots.is_empty() {
                println!("no saved runs in {db}");
            }
            for s in slots {
                println!(
                    "slot {}  day {:>3} {:<5}  {:>5} gold  saved {}",
                    s.slot,
                    s.day,
                    format!("{:?}", s.phase),
                    s.gold,
                    s.saved_at
                );
            }
        }
        "delete" => {
            if store.delete_slot(slot)? {
                println!("deleted slot {slot}");
            } else {
                println!("slot {slot} was already empty");
            }
        }
        "new" => {
            let config = EngineConfig::load(data_dir)?;
            let setup = run_setup(&args)?;
            let nights = parse_arg(&args, "--nights", 2u32);
            let mut engine = RunEngine::new(config, store, seed, setup)?;
            play_opening(&mut engine, nights)?;
            engine.save(slot)?;
            print_session(&mut engine)?;
        }
        "resume" => {
            let config = EngineConfig::load(data_dir)?;
            let setup = run_setup(&args)?;
            let (mut engine, outcome) = RunEngine::resume(config, store, seed, setup, slot)?;
            match &outcome {
                RestoreOutcome::NoSnapshot => println!("slot {slot} is empty; fresh run"),
                RestoreOutcome::FellBackToDefaults { reason } => {
                    println!("slot {slot} unreadable ({reason}); fresh run")
                }
                RestoreOutcome::Restored(report) => {
                    println!("restored slot {slot} with {} warning(s)", report.warnings.len());
                    if let Some(failure) = &report.integrity_failure {
                        println!("  integrity: {failure}");
                    }
                }
            }
            print_session(&mut engine)?;
        }
        other => bail!("unknown command '{other}' (expected new, list, resume or delete)"),
    }

    Ok(())
}

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2).find(|w| w[0] == name).map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag_name: &str, default: T) -> T {
    flag(args, flag_name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn run_setup(args: &[String]) -> Result<RunSetup> {
    let difficulty = match flag(args, "--difficulty").unwrap_or("normal") {
        "easy" => Difficulty::Easy,
        "normal" => Difficulty::Normal,
        "hard" => Difficulty::Hard,
        "nightmare" => Difficulty::Nightmare,
        other => bail!("unknown difficulty '{other}'"),
    };
    let mutators = args
        .windows(2)
        .filter(|w| w[0] == "--mutator")
        .map(|w| w[1].clone())
        .collect();
    Ok(RunSetup {
        difficulty,
        commander: flag(args, "--commander").map(str::to_string),
        mutators,
        legacy_points: parse_arg(args, "--legacy-points", 0u32),
    })
}

const MAX_SHOTS_PER_NIGHT: u32 = 64;

/// A short scripted opening: fortify, staff, then fight through `nights`.
fn play_opening(engine: &mut RunEngine, nights: u32) -> Result<()> {
    let ctx = &mut engine.context;

    let wall = ctx.build_wall(Vec3::new(0.0, 0.0, 9.0), Quat::IDENTITY)?;
    ctx.complete_wall(&wall)?;
    let menial = ctx.hire_menial()?;
    ctx.assign_menial(&menial, MenialTask::Gathering)?;
    if let Err(e) = ctx.hire_defender("pikeman", Vec3::new(2.0, 0.0, 7.0), Quat::IDENTITY) {
        log::info!("slot-runner: no pikeman this run: {e}");
    }

    for _ in 0..nights {
        while engine.advance_phase()? != Phase::Night {}
        let ctx = &mut engine.context;
        let kind = ctx.config.starting.opening_enemy_kind.clone();
        let target =
            ctx.spawn_enemy(&kind, Vec3::new(0.0, 0.0, 30.0), Quat::from_yaw_degrees(180.0))?;
        for _ in 0..MAX_SHOTS_PER_NIGHT {
            if ctx.fire_active_ballista(&target)?.is_some() {
                break;
            }
        }
        let piles: Vec<String> = ctx
            .loot
            .as_ref()
            .context("loot provider missing")?
            .iter()
            .map(|p| p.id.clone())
            .collect();
        for pile in piles {
            ctx.collect_loot(&pile)?;
        }
    }
    Ok(())
}

fn print_session(engine: &mut RunEngine) -> Result<()> {
    for event in engine.drain_events() {
        log::debug!("event: {}", serde_json::to_string(&event)?);
    }
    println!("{}", serde_json::to_string_pretty(&engine.summary())?);
    Ok(())
}
