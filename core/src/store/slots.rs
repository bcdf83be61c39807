use super::SimStore;
use crate::{
    error::{SimError, SimResult},
    snapshot::Snapshot,
    types::{Day, Phase, SaveSlot},
};
use rusqlite::{params, OptionalExtension};
use serde::Serialize;

/// What a slot picker shows for a filled slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSummary {
    pub slot:     SaveSlot,
    pub saved_at: String,
    pub day:      Day,
    pub phase:    Phase,
    pub gold:     u32,
}

impl SimStore {
    // ── Save slots ────────────────────────────────────────────────

    pub fn slot_exists(&self, slot: SaveSlot) -> SimResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM save_slot WHERE slot = ?1",
                params![slot.index()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    pub fn any_slot_exists(&self) -> SimResult<bool> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM save_slot", [], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Write `snapshot` into its slot. The row is replaced in a single
    /// transaction: either the new snapshot lands or the old one survives.
    pub fn write_slot(&self, snapshot: &Snapshot) -> SimResult<()> {
        let json = serde_json::to_string(snapshot)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO save_slot (slot, saved_at, day, state_json)
             VALUES (?1, ?2, ?3, ?4)",
            params![snapshot.slot.index(), snapshot.saved_at, snapshot.clock.day, json],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Ok(None) for an empty slot. A row that does not parse is a
    /// MalformedSnapshot error, distinct from "no save".
    pub fn read_slot(&self, slot: SaveSlot) -> SimResult<Option<Snapshot>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT state_json FROM save_slot WHERE slot = ?1",
                params![slot.index()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(json) = json else {
            return Ok(None);
        };
        let mut snapshot: Snapshot = serde_json::from_str(&json)
            .map_err(|source| SimError::MalformedSnapshot { slot: slot.index(), source })?;
        // The row key is authoritative over the slot recorded in the document.
        snapshot.slot = slot;
        Ok(Some(snapshot))
    }

    /// Returns true if a row was removed.
    pub fn delete_slot(&self, slot: SaveSlot) -> SimResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM save_slot WHERE slot = ?1", params![slot.index()])?;
        Ok(removed > 0)
    }

    /// One summary per readable slot. Goes through the full read path;
    /// malformed slots are logged and left out.
    pub fn list_slots(&self) -> SimResult<Vec<SlotSummary>> {
        let mut summaries = Vec::new();
        for slot in SaveSlot::all() {
            match self.read_slot(slot) {
                Ok(Some(s)) => summaries.push(SlotSummary {
                    slot,
                    saved_at: s.saved_at,
                    day: s.clock.day,
                    phase: s.clock.phase,
                    gold: s.economy.gold,
                }),
                Ok(None) => {}
                Err(SimError::MalformedSnapshot { slot, source }) => {
                    log::warn!("slot={slot} list: unreadable snapshot: {source}");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(summaries)
    }

    /// Write an arbitrary document into a slot, bypassing serialization.
    /// Exists so tests can plant corrupt or hand-edited saves.
    #[doc(hidden)]
    pub fn write_raw_slot(&self, slot: SaveSlot, day: Day, json: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO save_slot (slot, saved_at, day, state_json)
             VALUES (?1, '', ?2, ?3)",
            params![slot.index(), day, json],
        )?;
        Ok(())
    }
}
