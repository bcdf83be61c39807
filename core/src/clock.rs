//! Day/night clock provider.
//!
//! Only the state the engine persists lives here. Phase timing math
//! belongs to the gameplay loop; this type just advances monotonically.

use crate::{
    event::RestoreWarning,
    provider::StateProvider,
    snapshot::ClockState,
    types::{Day, Phase},
};

#[derive(Debug, Clone, PartialEq)]
pub struct DayNightClock {
    pub day:                  Day,
    pub phase:                Phase,
    pub phase_time_remaining: f64,
    pub is_first_day:         bool,
    day_length:               f64,
    night_length:             f64,
}

impl DayNightClock {
    pub fn new(day_length: f64, night_length: f64) -> Self {
        Self {
            day: 1,
            phase: Phase::Day,
            phase_time_remaining: day_length,
            is_first_day: true,
            day_length,
            night_length,
        }
    }

    /// Move to the next phase. Returns true when a new day began.
    pub fn advance_phase(&mut self) -> bool {
        match self.phase {
            Phase::Day => {
                self.phase = Phase::Night;
                self.phase_time_remaining = self.night_length;
                false
            }
            Phase::Night => {
                self.phase = Phase::Day;
                self.day += 1;
                self.is_first_day = false;
                self.phase_time_remaining = self.day_length;
                true
            }
        }
    }

    /// Count down the current phase. Returns true when a new day began.
    pub fn tick(&mut self, seconds: f64) -> bool {
        self.phase_time_remaining -= seconds.max(0.0);
        if self.phase_time_remaining > 0.0 {
            return false;
        }
        self.advance_phase()
    }
}

impl StateProvider for DayNightClock {
    type Fragment = ClockState;

    fn name(&self) -> &'static str { "clock" }

    fn project_state(&self) -> ClockState {
        ClockState {
            day: self.day,
            phase: self.phase,
            phase_time_remaining: self.phase_time_remaining,
            is_first_day: self.is_first_day,
        }
    }

    fn reconstruct_from(&mut self, fragment: &ClockState, warnings: &mut Vec<RestoreWarning>) {
        if fragment.day == 0 {
            warnings.push(RestoreWarning::DayIndexClamped { stored: fragment.day });
        }
        self.day = fragment.day.max(1);
        self.phase = fragment.phase;
        self.phase_time_remaining = fragment.phase_time_remaining.max(0.0);
        self.is_first_day = fragment.is_first_day;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn night_rolls_over_to_next_day() {
        let mut clock = DayNightClock::new(10.0, 5.0);
        assert!(!clock.advance_phase());
        assert_eq!(clock.phase, Phase::Night);
        assert!(clock.advance_phase());
        assert_eq!((clock.day, clock.phase, clock.is_first_day), (2, Phase::Day, false));
    }

    #[test]
    fn tick_advances_when_phase_expires() {
        let mut clock = DayNightClock::new(10.0, 5.0);
        assert!(!clock.tick(4.0));
        assert_eq!(clock.phase, Phase::Day);
        clock.tick(6.0);
        assert_eq!(clock.phase, Phase::Night);
        assert_eq!(clock.phase_time_remaining, 5.0);
    }
}
