//! Shared primitive types used across the entire engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A day index within a run. Day 1 is the introductory day.
pub type Day = u32;

/// A stable identifier for a live entity. Never persisted: every
/// reconstruction hands out fresh ids.
pub type EntityId = String;

/// Number of save slots the store addresses.
pub const SLOT_COUNT: u8 = 3;

pub fn new_entity_id() -> EntityId {
    uuid::Uuid::new_v4().to_string()
}

// ── Save slots ─────────────────────────────────────────────────────

/// A slot index in `0..SLOT_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SaveSlot(u8);

impl SaveSlot {
    /// Panics on an out-of-range index: callers pick slots from a
    /// fixed menu, so a bad index is a programming error.
    pub fn new(index: u8) -> Self {
        assert!(
            index < SLOT_COUNT,
            "save slot {index} out of range (0..{SLOT_COUNT})"
        );
        Self(index)
    }

    pub fn checked(index: u8) -> Option<Self> {
        (index < SLOT_COUNT).then_some(Self(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = SaveSlot> {
        (0..SLOT_COUNT).map(SaveSlot)
    }
}

impl TryFrom<u8> for SaveSlot {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        SaveSlot::checked(value).ok_or_else(|| format!("save slot {value} out of range"))
    }
}

impl From<SaveSlot> for u8 {
    fn from(slot: SaveSlot) -> u8 {
        slot.0
    }
}

impl fmt::Display for SaveSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Spatial ────────────────────────────────────────────────────────

/// Tolerance used when re-identifying entities by position.
pub const POSITION_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance_squared(&self, other: &Vec3) -> f32 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        dx * dx + dy * dy + dz * dz
    }

    pub fn approx_eq(&self, other: &Vec3) -> bool {
        self.distance_squared(other) <= POSITION_EPSILON * POSITION_EPSILON
    }
}

/// World orientation as a unit quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Rotation about the vertical axis.
    pub fn from_yaw_degrees(degrees: f32) -> Self {
        let half = degrees.to_radians() * 0.5;
        Self { x: 0.0, y: half.sin(), z: 0.0, w: half.cos() }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ── Small shared enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Day,
    Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Nightmare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenialTask {
    #[default]
    Idle,
    Gathering,
    Building,
    Repairing,
}

impl MenialTask {
    pub fn is_idle(self) -> bool {
        matches!(self, MenialTask::Idle)
    }
}

/// Health restored from a record, kept inside `0..=max` without trusting
/// `max` to be sane.
pub fn clamp_health(health: f32, max: f32) -> f32 {
    health.min(max).max(0.0)
}
