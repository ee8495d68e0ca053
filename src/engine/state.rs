//! `GameState`, grounded on `mock/simulation/state.rs`'s `LiveState` field
//! layout, generalized with the overtime possession tracking `spec.md`
//! §4.4 requires and rewired off `rand::rngs::StdRng` entirely (the clock/
//! down/possession fields carry no RNG themselves; `engine::simulate`
//! threads a `GameRng` alongside).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::play::{Down, Possession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Quarter {
    First,
    Second,
    Third,
    Fourth,
    Overtime,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GameState {
    pub home_score: u16,
    pub away_score: u16,
    pub quarter: Quarter,
    /// OT period number; 1 during the first overtime, 2 for a second, etc.
    /// Meaningless outside `Quarter::Overtime`.
    pub ot_period: u8,
    pub clock_seconds: u16,
    pub possession: Possession,
    pub down: Down,
    pub yards_to_go: u8,
    /// 0..100 from the possessing team's own goal line.
    pub ball_position: u8,
    pub home_timeouts: u8,
    pub away_timeouts: u8,
    pub is_clock_running: bool,
    /// One-shot per half; fires the first time the clock crosses below
    /// 120 seconds in Q2 or Q4.
    pub two_minute_warning_q2: bool,
    pub two_minute_warning_q4: bool,
    pub is_halftime: bool,
    pub kickoff_pending: bool,
    pub pat_attempt: bool,
    /// Whether the home/away team has started at least one offensive
    /// drive during the current OT period.
    pub ot_home_possessed: bool,
    pub ot_away_possessed: bool,
}

impl GameState {
    pub fn new(receiving_team: Possession) -> Self {
        Self {
            home_score: 0,
            away_score: 0,
            quarter: Quarter::First,
            ot_period: 0,
            clock_seconds: 900,
            possession: receiving_team,
            down: Down::First,
            yards_to_go: 10,
            ball_position: 25,
            home_timeouts: 3,
            away_timeouts: 3,
            is_clock_running: false,
            two_minute_warning_q2: false,
            two_minute_warning_q4: false,
            is_halftime: false,
            kickoff_pending: true,
            pat_attempt: false,
            ot_home_possessed: false,
            ot_away_possessed: false,
        }
    }

    pub fn score_for(&self, team: Possession) -> u16 {
        match team {
            Possession::Home => self.home_score,
            Possession::Away => self.away_score,
        }
    }

    pub fn score_diff_for_possessor(&self) -> i16 {
        match self.possession {
            Possession::Home => self.home_score as i16 - self.away_score as i16,
            Possession::Away => self.away_score as i16 - self.home_score as i16,
        }
    }

    pub fn is_two_minute_drill(&self) -> bool {
        matches!(self.quarter, Quarter::Fourth) && self.clock_seconds < 120
    }

    pub fn is_in_two_minute(&self) -> bool {
        matches!(self.quarter, Quarter::Second | Quarter::Fourth) && self.clock_seconds <= 120
    }

    pub fn mark_ot_possession(&mut self, team: Possession) {
        match team {
            Possession::Home => self.ot_home_possessed = true,
            Possession::Away => self.ot_away_possessed = true,
        }
    }

    pub fn both_ot_sides_have_possessed(&self) -> bool {
        self.ot_home_possessed && self.ot_away_possessed
    }

    pub fn is_over_by_score(&self) -> bool {
        match self.quarter {
            Quarter::Fourth => self.clock_seconds == 0 && self.home_score != self.away_score,
            Quarter::Overtime => {
                self.clock_seconds == 0 && (self.home_score != self.away_score || self.ot_period > 6)
            }
            _ => false,
        }
    }
}
