//! Drama flags and a momentum scalar derived from event history, as
//! `spec.md` §4.5. No teacher analogue exists for this component (the
//! mock repository has no narrative layer); it is threaded through the
//! engine loop the same way the teacher threads `play_history` in
//! `mock/simulation/state.rs` — snapshots are pushed alongside events in
//! the same loop iteration, not recomputed from scratch per query.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::play::{PenaltyKind, PlayOutcome, Possession, ScoringKind, TurnoverKind};

use super::state::{GameState, Quarter};

const MOMENTUM_WINDOW: usize = 12;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NarrativeSnapshot {
    pub active_threads: Vec<String>,
    pub is_clutch_moment: bool,
    pub is_comeback_brewing: bool,
    pub is_blowout: bool,
    pub is_dominating_performance: Option<bool>,
    pub drama_level: u8,
    pub momentum: f64,
}

/// Tracks momentum and the deficit history needed to detect a brewing
/// comeback across the full event list. Owned by `engine::simulate` for
/// the lifetime of one game.
pub struct MomentumTracker {
    momentum: f64,
    recent_shifts: std::collections::VecDeque<f64>,
    max_deficit_seen: (i16, Possession),
}

impl MomentumTracker {
    pub fn new() -> Self {
        Self {
            momentum: 0.0,
            recent_shifts: std::collections::VecDeque::with_capacity(MOMENTUM_WINDOW),
            max_deficit_seen: (0, Possession::Home),
        }
    }

    /// Registers the play that just happened and the state immediately
    /// after it, returning the snapshot for this event.
    pub fn record(&mut self, state: &GameState, outcome: &PlayOutcome) -> NarrativeSnapshot {
        let raw_shift = event_shift(outcome, state.possession);

        self.recent_shifts.push_back(raw_shift);
        if self.recent_shifts.len() > MOMENTUM_WINDOW {
            self.recent_shifts.pop_front();
        }

        let weighted_shift = self.weighted_recent_shift();

        // Decay toward zero, then apply this event's weighted shift.
        self.momentum *= 0.92;
        self.momentum += weighted_shift;

        let score_diff = state.home_score as i16 - state.away_score as i16;
        let leader_bias = (score_diff.abs() as f64 * 0.5).min(8.0) * score_diff.signum() as f64;
        self.momentum += leader_bias * 0.1;
        self.momentum = self.momentum.clamp(-100.0, 100.0);

        let clutch = matches!(state.quarter, Quarter::Fourth | Quarter::Overtime)
            && state.clock_seconds <= 120
            && score_diff.abs() <= 8;

        let blowout = score_diff.abs() >= 21;

        let trailing_team_diff = match state.possession {
            Possession::Home => -score_diff,
            Possession::Away => score_diff,
        };
        if trailing_team_diff > self.max_deficit_seen.0 {
            self.max_deficit_seen = (trailing_team_diff, state.possession);
        }
        let comeback_brewing = self.max_deficit_seen.0 >= 14
            && self.max_deficit_seen.1 == state.possession
            && trailing_team_diff <= 7
            && trailing_team_diff > 0;

        let two_minute_drill = matches!(state.quarter, Quarter::Fourth)
            && state.clock_seconds < 120
            && trailing_team_diff > 0;

        let red_zone = state.ball_position >= 80;

        let mut active_threads = Vec::new();
        if clutch {
            active_threads.push("clutch_moment".to_string());
        }
        if comeback_brewing {
            active_threads.push("comeback_brewing".to_string());
        }
        if blowout {
            active_threads.push("blowout".to_string());
        }
        if two_minute_drill {
            active_threads.push("two_minute_drill".to_string());
        }
        if red_zone {
            active_threads.push("red_zone".to_string());
        }

        let mut drama_level = (40.0
            + (raw_shift.abs() * 2.0)
            + if clutch { 30.0 } else { 0.0 }
            + if red_zone { 10.0 } else { 0.0 })
        .clamp(0.0, 100.0) as u8;
        if blowout {
            drama_level = drama_level.min(20);
        }

        NarrativeSnapshot {
            active_threads,
            is_clutch_moment: clutch,
            is_comeback_brewing: comeback_brewing,
            is_blowout: blowout,
            is_dominating_performance: if blowout { Some(true) } else { None },
            drama_level,
            momentum: self.momentum,
        }
    }

    fn weighted_recent_shift(&self) -> f64 {
        let n = self.recent_shifts.len();
        if n == 0 {
            return 0.0;
        }
        let mut total = 0.0;
        let mut weight_sum = 0.0;
        for (i, shift) in self.recent_shifts.iter().enumerate() {
            // Linear recency weighting from 0.5 (oldest) to 1.0 (newest).
            let weight = 0.5 + 0.5 * (i as f64 / (n.max(1) - 1).max(1) as f64);
            total += shift * weight;
            weight_sum += weight;
        }
        total / weight_sum.max(1.0)
    }

    /// Modifier exposed to resolvers, capped at ±0.03 per `spec.md` §4.5.
    pub fn resolver_modifier(&self) -> f64 {
        (self.momentum / 100.0 * 0.03).clamp(-0.03, 0.03)
    }
}

fn event_shift(outcome: &PlayOutcome, possessing_team: Possession) -> f64 {
    let sign = |team: Possession| if team == Possession::Home { 1.0 } else { -1.0 };

    if let Some(scoring) = &outcome.scoring {
        let magnitude = match scoring.kind {
            ScoringKind::Touchdown => 30.0,
            ScoringKind::FieldGoal => 15.0,
            ScoringKind::Safety => 20.0,
            ScoringKind::ExtraPoint | ScoringKind::TwoPoint => 5.0,
        };
        return sign(scoring.scoring_team) * magnitude;
    }

    if let Some(turnover) = &outcome.turnover {
        let base = match turnover.kind {
            TurnoverKind::Interception | TurnoverKind::FumbleLost => 25.0,
            _ => 10.0,
        };
        let multiplier = if turnover.return_yards >= 50 { 1.5 } else { 1.0 };
        // Turnovers favor the defense, i.e. the team NOT possessing.
        return -sign(possessing_team) * base * multiplier;
    }

    if let Some(penalty) = &outcome.penalty {
        if penalty.declined || penalty.offsetting {
            return 0.0;
        }
        let magnitude = (penalty.yards.abs() as f64 / 3.0).min(8.0);
        return sign(penalty.against.opponent()) * magnitude;
    }

    use crate::play::PlayType;
    match outcome.play_type {
        PlayType::Sack => -sign(possessing_team) * 12.0,
        _ if outcome.yards_gained >= 20 => sign(possessing_team) * (8.0 + (outcome.yards_gained as f64 / 5.0).min(10.0)),
        _ if outcome.yards_gained > 4 => sign(possessing_team) * 4.0,
        _ if outcome.yards_gained > 0 => sign(possessing_team) * 1.0,
        _ if outcome.yards_gained < 0 => -sign(possessing_team) * 5.0,
        _ if outcome.play_type == PlayType::PassIncomplete => -sign(possessing_team) * 2.0,
        _ => 0.0,
    }
    + if outcome.is_first_down { sign(possessing_team) * 4.0 } else { 0.0 }
}

fn _unused_penalty_kind_reference(_: PenaltyKind) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::play::{PlayType, Scoring};

    fn routine_outcome() -> PlayOutcome {
        PlayOutcome {
            play_type: PlayType::Run,
            yards_gained: 4,
            passer: None,
            rusher: Some("Back".to_string()),
            receiver: None,
            defender: None,
            scoring: None,
            turnover: None,
            penalty: None,
            injury: None,
            clock_elapsed: 30,
            is_clock_stopped: false,
            is_first_down: false,
            is_touchdown: false,
            is_safety: false,
            description: "Rush for 4 yards.".to_string(),
        }
    }

    #[test]
    fn momentum_stays_within_bounds_under_repeated_touchdowns() {
        let mut tracker = MomentumTracker::new();
        let mut state = GameState::new(Possession::Home);

        for _ in 0..50 {
            let outcome = PlayOutcome {
                scoring: Some(Scoring {
                    kind: ScoringKind::Touchdown,
                    points: 6,
                    scoring_team: Possession::Home,
                }),
                ..routine_outcome()
            };
            let snapshot = tracker.record(&state, &outcome);
            assert!(snapshot.momentum >= -100.0 && snapshot.momentum <= 100.0);
            state.home_score += 6;
        }
    }

    #[test]
    fn clutch_boundary_matches_spec_example() {
        let mut tracker = MomentumTracker::new();
        let mut state = GameState::new(Possession::Home);
        state.quarter = Quarter::Fourth;
        state.clock_seconds = 120;
        state.home_score = 20;
        state.away_score = 12;

        let snapshot = tracker.record(&state, &routine_outcome());
        assert!(snapshot.is_clutch_moment);

        state.quarter = Quarter::First;
        let snapshot = tracker.record(&state, &routine_outcome());
        assert!(!snapshot.is_clutch_moment);
    }

    #[test]
    fn blowout_caps_drama_level() {
        let mut tracker = MomentumTracker::new();
        let mut state = GameState::new(Possession::Home);
        state.home_score = 35;
        state.away_score = 10;

        let snapshot = tracker.record(&state, &routine_outcome());
        assert!(snapshot.is_blowout);
        assert!(snapshot.drama_level <= 20);
    }
}
