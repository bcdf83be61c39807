//! Legacy ranks: cross-run permanent progression.
//!
//! Legacy points accumulate across runs and are never lost. The rank is
//! derived from points at runtime. Bonuses are additive with each other
//! (a +5% and a +5% make +10%, not +10.25%). The top rank doubles every
//! bonus except starting menials, which stay at +2.
//! Legacy state lives outside the run snapshot.

use crate::modifiers::ModifierBundle;

/// (points required, title), indexed by rank.
pub const LEGACY_RANKS: [(u32, &str); 11] = [
    (0, "Recruit"),
    (10, "Militia"),
    (30, "Veteran"),
    (60, "Captain"),
    (100, "Commander"),
    (150, "Marshal"),
    (220, "Warden"),
    (300, "Champion"),
    (400, "Overlord"),
    (550, "Legend"),
    (750, "Mythic"),
];

pub const MAX_RANK: u8 = 10;

/// Points earned by a finished run.
pub fn points_for_score(composite_score: u64) -> u32 {
    (composite_score / 1000).min(u32::MAX as u64) as u32
}

pub fn rank_for_points(points: u32) -> u8 {
    LEGACY_RANKS
        .iter()
        .rposition(|(required, _)| points >= *required)
        .unwrap_or(0) as u8
}

pub fn rank_title(rank: u8) -> &'static str {
    LEGACY_RANKS[rank.min(MAX_RANK) as usize].1
}

/// The combined bonus bundle for a points total.
pub fn legacy_bundle(points: u32) -> ModifierBundle {
    let rank = rank_for_points(points);

    let mut starting_gold = 0i32;
    let mut starting_menials = 0i32;
    let mut menial_speed = 0.0;
    let mut ballista_damage = 0.0;
    let mut attack_speed = 0.0;
    let mut wall_integrity = 0.0;
    let mut loot_value = 0.0;

    if rank >= 1 { starting_gold += 5; }
    if rank >= 2 { menial_speed += 0.05; }
    if rank >= 3 { starting_menials += 1; }
    if rank >= 4 { ballista_damage += 0.05; }
    if rank >= 5 { starting_gold += 10; }
    if rank >= 6 { attack_speed += 0.05; }
    if rank >= 7 { wall_integrity += 0.05; }
    if rank >= 8 { starting_menials += 1; }
    if rank >= 9 { loot_value += 0.10; }

    let scale = if rank >= MAX_RANK { 2.0 } else { 1.0 };

    ModifierBundle {
        starting_gold: (starting_gold as f64 * scale) as i32,
        starting_menials,
        menial_speed: 1.0 + menial_speed * scale,
        ballista_damage: 1.0 + ballista_damage * scale,
        defender_attack_speed: 1.0 + attack_speed * scale,
        wall_integrity: 1.0 + wall_integrity * scale,
        loot_value: 1.0 + loot_value * scale,
        ..ModifierBundle::NEUTRAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_thresholds() {
        assert_eq!(rank_for_points(0), 0);
        assert_eq!(rank_for_points(9), 0);
        assert_eq!(rank_for_points(10), 1);
        assert_eq!(rank_for_points(149), 4);
        assert_eq!(rank_for_points(10_000), MAX_RANK);
        assert_eq!(rank_title(4), "Commander");
    }

    #[test]
    fn no_points_is_neutral() {
        assert_eq!(legacy_bundle(0), ModifierBundle::NEUTRAL);
    }

    #[test]
    fn max_rank_doubles_everything() {
        let b = legacy_bundle(750);
        assert_eq!(b.starting_gold, 30);
        assert_eq!(b.starting_menials, 2);
        assert!((b.menial_speed - 1.10).abs() < 1e-9);
        assert!((b.ballista_damage - 1.10).abs() < 1e-9);
        assert!((b.wall_integrity - 1.10).abs() < 1e-9);
        assert!((b.loot_value - 1.20).abs() < 1e-9);
    }

    #[test]
    fn points_from_score() {
        assert_eq!(points_for_score(8_500), 8);
    }
}
