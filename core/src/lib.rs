//! Save/restore engine for a day/night siege survival run.
//!
//! Leaf-first: snapshot schema → store → providers → capture/restore
//! coordinators → engine. Modifier composition is a pure layer shared by
//! live play and restore.

pub mod ballista;
pub mod capture;
pub mod clock;
pub mod config;
pub mod context;
pub mod daily_event;
pub mod defenders;
pub mod economy;
pub mod enemies;
pub mod engine;
pub mod error;
pub mod event;
pub mod fortification;
pub mod legacy;
pub mod loot;
pub mod menials;
pub mod modifiers;
pub mod provider;
pub mod purchases;
pub mod restore;
pub mod rng;
pub mod roster;
pub mod run_modifiers;
pub mod snapshot;
pub mod stats;
pub mod store;
pub mod types;
