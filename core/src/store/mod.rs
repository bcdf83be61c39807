//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database. Providers and coordinators
//! call store methods; they never execute SQL directly.

mod slots;

pub use slots::SlotSummary;

use crate::error::SimResult;
use rusqlite::Connection;

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the save database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        // WAL is ignored for :memory: databases.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_save_slots.sql"))?;
        Ok(())
    }
}
