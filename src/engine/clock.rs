//! Clock advancement and quarter/OT transitions. Grounded on
//! `mock/simulation/engine.rs`'s clock-advancement and two-minute-warning
//! detection, generalized from the teacher's wall-clock-scaled replay
//! loop to a single bounded step called once per resolved play.

use crate::play::Possession;

use super::state::{GameState, Quarter};

pub enum QuarterOutcome {
    Continues,
    /// The game has ended; regulation or overtime concluded.
    GameOver,
    /// A new overtime period begins (tied at the end of the previous one,
    /// and the rules in force allow continuation — playoffs only).
    NewOvertimePeriod,
}

/// Advances the clock by `clock_elapsed` seconds (or less, clamped so it
/// never goes negative), firing the two-minute warning exactly once per
/// half the first time the remaining time in Q2/Q4 crosses below 120 s.
pub fn advance_clock(state: &mut GameState, clock_elapsed: u16, is_clock_stopped: bool) {
    let elapsed = if is_clock_stopped {
        clock_elapsed.min(5)
    } else {
        clock_elapsed
    };
    state.clock_seconds = state.clock_seconds.saturating_sub(elapsed);
    state.is_clock_running = !is_clock_stopped;

    match state.quarter {
        Quarter::Second if !state.two_minute_warning_q2 && state.clock_seconds <= 120 => {
            state.two_minute_warning_q2 = true;
            state.is_clock_running = false;
        }
        Quarter::Fourth if !state.two_minute_warning_q4 && state.clock_seconds <= 120 => {
            state.two_minute_warning_q4 = true;
            state.is_clock_running = false;
        }
        _ => {}
    }
}

/// Called whenever `clock_seconds` has reached zero. Applies quarter or
/// overtime transitions and reports what happened. `allow_overtime`
/// distinguishes playoff games (which must continue past a tied OT
/// period) from regular-season games (which end in a tie).
pub fn handle_clock_expiry(state: &mut GameState, is_playoff: bool) -> QuarterOutcome {
    if state.clock_seconds > 0 {
        return QuarterOutcome::Continues;
    }

    match state.quarter {
        Quarter::First => {
            state.quarter = Quarter::Second;
            state.clock_seconds = 900;
            QuarterOutcome::Continues
        }
        Quarter::Second => {
            state.is_halftime = true;
            state.quarter = Quarter::Third;
            state.clock_seconds = 900;
            state.possession = state.possession.opponent();
            state.kickoff_pending = true;
            state.home_timeouts = 3;
            state.away_timeouts = 3;
            QuarterOutcome::Continues
        }
        Quarter::Third => {
            state.quarter = Quarter::Fourth;
            state.clock_seconds = 900;
            QuarterOutcome::Continues
        }
        Quarter::Fourth => {
            if state.home_score == state.away_score {
                start_overtime_period(state, 1);
                QuarterOutcome::NewOvertimePeriod
            } else {
                QuarterOutcome::GameOver
            }
        }
        Quarter::Overtime => {
            if state.home_score != state.away_score {
                QuarterOutcome::GameOver
            } else if is_playoff && state.ot_period < 6 {
                start_overtime_period(state, state.ot_period + 1);
                QuarterOutcome::NewOvertimePeriod
            } else {
                // Regular season: tie stands. Playoffs past the safety
                // cap of 6 periods: leader-less tie also stands rather
                // than looping forever.
                QuarterOutcome::GameOver
            }
        }
    }
}

fn start_overtime_period(state: &mut GameState, period: u8) {
    state.quarter = Quarter::Overtime;
    state.ot_period = period;
    state.clock_seconds = 600;
    state.kickoff_pending = true;
    state.possession = state.possession.opponent();
    state.home_timeouts = 2;
    state.away_timeouts = 2;
    state.ot_home_possessed = false;
    state.ot_away_possessed = false;
}

/// Called right after a score is applied, while still in overtime.
/// Implements `spec.md` §4.4's sudden-death rule: once both sides have
/// had a possession, the game ends immediately on the next score,
/// provided the scores are no longer tied.
pub fn overtime_ends_after_score(state: &GameState) -> bool {
    matches!(state.quarter, Quarter::Overtime)
        && state.both_ot_sides_have_possessed()
        && state.home_score != state.away_score
}

/// Marks that `team` has started an offensive drive this OT period; a
/// no-op outside overtime.
pub fn note_drive_start(state: &mut GameState, team: Possession) {
    if matches!(state.quarter, Quarter::Overtime) {
        state.mark_ot_possession(team);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_minute_warning_fires_once_in_fourth_quarter() {
        let mut state = GameState::new(Possession::Home);
        state.quarter = Quarter::Fourth;
        state.clock_seconds = 125;

        advance_clock(&mut state, 10, false);
        assert!(state.clock_seconds <= 120);
        assert!(state.two_minute_warning_q4);

        let warned_before = state.two_minute_warning_q4;
        advance_clock(&mut state, 5, false);
        assert_eq!(state.two_minute_warning_q4, warned_before);
    }

    #[test]
    fn two_minute_warning_never_fires_in_q1_or_q3() {
        let mut state = GameState::new(Possession::Home);
        state.quarter = Quarter::First;
        state.clock_seconds = 125;
        advance_clock(&mut state, 10, false);
        assert!(!state.two_minute_warning_q2);
        assert!(!state.two_minute_warning_q4);
    }

    #[test]
    fn clock_never_goes_negative() {
        let mut state = GameState::new(Possession::Home);
        state.clock_seconds = 3;
        advance_clock(&mut state, 50, false);
        assert_eq!(state.clock_seconds, 0);
    }

    #[test]
    fn tied_fourth_quarter_enters_overtime() {
        let mut state = GameState::new(Possession::Home);
        state.quarter = Quarter::Fourth;
        state.clock_seconds = 0;
        state.home_score = 20;
        state.away_score = 20;

        let outcome = handle_clock_expiry(&mut state, false);
        assert!(matches!(outcome, QuarterOutcome::NewOvertimePeriod));
        assert_eq!(state.quarter, Quarter::Overtime);
        assert_eq!(state.clock_seconds, 600);
    }

    #[test]
    fn untied_overtime_ends_at_regular_season_cap() {
        let mut state = GameState::new(Possession::Home);
        state.quarter = Quarter::Overtime;
        state.clock_seconds = 0;
        state.home_score = 23;
        state.away_score = 20;

        let outcome = handle_clock_expiry(&mut state, false);
        assert!(matches!(outcome, QuarterOutcome::GameOver));
    }
}
