//! Top-level entry point: runs one full game to completion inside a
//! single bounded call, as `spec.md` §4.4/§5 requires (the simulation
//! step is CPU-bound and must not suspend mid-step). Grounded on
//! `mock/simulation/engine.rs`'s clock/quarter/OT loop, generalized from
//! a wall-clock-scaled replay (`advance_to_now`) to one `simulate()` call.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::play::resolver::{resolve_play, Situation};
use crate::play::{penalties, special_teams, Down, Personnel, PlayType, Possession, PlayOutcome};
use crate::rng::GameRng;
use crate::team::{Player, Team};

use super::clock::{advance_clock, handle_clock_expiry, note_drive_start, overtime_ends_after_score, QuarterOutcome};
use super::drives::apply_play_outcome;
use super::events::{commentary_for, pacing_floor_ms, GameEvent};
use super::narrative::MomentumTracker;
use super::state::{GameState, Quarter};

const MAX_PLAYS: u32 = 250;
const MIN_PLAYS: u32 = 100;

pub struct GameConfig<'a> {
    pub game_id: Uuid,
    pub server_seed: String,
    pub client_seed: String,
    pub start_nonce: u64,
    pub home_team: &'a Team,
    pub away_team: &'a Team,
    pub home_roster: &'a [Player],
    pub away_roster: &'a [Player],
    pub is_playoff: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BoxScore {
    pub home_total_yards: i32,
    pub away_total_yards: i32,
    pub home_plays: u32,
    pub away_plays: u32,
    pub scoring_plays: Vec<String>,
}

pub struct SimulationResult {
    pub events: Vec<GameEvent>,
    pub home_score: u16,
    pub away_score: u16,
    pub total_plays: u32,
    pub final_nonce: u64,
    pub mvp: String,
    pub box_score: BoxScore,
    pub went_to_overtime: bool,
}

/// Runs a full game and returns its complete event log. Deterministic:
/// identical `(server_seed, client_seed)` reproduces the event sequence
/// byte-for-byte, since every draw routes through the same `GameRng`
/// stream in the same call order.
pub fn simulate(cfg: &GameConfig) -> SimulationResult {
    let mut rng = GameRng::new(cfg.server_seed.clone(), cfg.client_seed.clone(), cfg.start_nonce);

    let receiving_team = if rng.probability(0.5) { Possession::Home } else { Possession::Away };
    let mut state = GameState::new(receiving_team);

    let home_personnel = Personnel::resolve(cfg.home_roster);
    let away_personnel = Personnel::resolve(cfg.away_roster);

    let mut momentum = MomentumTracker::new();
    let mut events = Vec::new();
    let mut event_number: u32 = 0;
    let mut display_timestamp: u64 = 0;
    let mut box_score = BoxScore {
        home_total_yards: 0,
        away_total_yards: 0,
        home_plays: 0,
        away_plays: 0,
        scoring_plays: Vec::new(),
    };
    let mut yardage_leader: std::collections::HashMap<String, i32> = std::collections::HashMap::new();

    while event_number < MAX_PLAYS {
        if state.is_over_by_score() {
            break;
        }

        let offense_possession = state.possession;
        let (offense_personnel, defense_personnel, offense_team) = match offense_possession {
            Possession::Home => (&home_personnel, &away_personnel, cfg.home_team),
            Possession::Away => (&away_personnel, &home_personnel, cfg.away_team),
        };

        let outcome = if state.kickoff_pending {
            let kicking_team_special_teams = match offense_possession {
                Possession::Home => cfg.away_team.special_teams,
                Possession::Away => cfg.home_team.special_teams,
            };
            special_teams::kickoff(&mut rng, kicking_team_special_teams, offense_possession)
        } else if state.down == Down::Fourth {
            resolve_fourth_down(&mut rng, &state, offense_personnel, defense_personnel, offense_team)
        } else {
            let situation = Situation {
                down: down_number(state.down),
                distance: state.yards_to_go,
                ball_position: state.ball_position,
                in_two_minute: state.is_in_two_minute(),
                score_diff: state.score_diff_for_possessor(),
            };
            resolve_play(&mut rng, &situation, offense_personnel, defense_personnel, offense_team, offense_possession)
        };

        let penalty = if !state.kickoff_pending && state.down != Down::Fourth {
            penalties::maybe_penalty(&mut rng, offense_possession)
        } else {
            None
        };

        let pre_snap_down = state.down;
        let pre_snap_ball_position = state.ball_position;
        let pre_snap_yards_to_go = state.yards_to_go;

        let kickoff_pending_before = state.kickoff_pending;
        let starts_new_kickoff = apply_play_outcome(&mut state, &outcome, &mut rng);

        if let Some(ref penalty) = penalty {
            if !penalty.declined && !penalty.offsetting {
                enforce_penalty(
                    &mut state,
                    penalty.yards,
                    penalty.against,
                    offense_possession,
                    penalty.automatic_first_down,
                    pre_snap_down,
                    pre_snap_ball_position,
                    pre_snap_yards_to_go,
                );
            }
        }

        if kickoff_pending_before {
            note_drive_start(&mut state, offense_possession);
        }

        advance_clock(&mut state, outcome.clock_elapsed, outcome.is_clock_stopped);

        box_score.scoring_plays_push(&outcome);
        track_yardage(&mut box_score, &mut yardage_leader, &outcome, offense_possession);

        event_number += 1;
        let floor_ms = pacing_floor_ms(&outcome);
        let jitter = rng.random();
        display_timestamp += floor_ms + (jitter * 600.0) as u64;

        let narrative = momentum.record(&state, &outcome);
        let commentary = commentary_for(&outcome, jitter);

        events.push(GameEvent {
            game_id: cfg.game_id,
            event_number,
            play_result: outcome.clone(),
            commentary,
            game_state: state.clone(),
            narrative_context: Some(narrative),
            display_timestamp,
        });

        if overtime_ends_after_score(&state) && outcome.scoring.is_some() {
            break;
        }

        if !starts_new_kickoff && state.clock_seconds == 0 {
            match handle_clock_expiry(&mut state, cfg.is_playoff) {
                QuarterOutcome::GameOver => break,
                QuarterOutcome::Continues | QuarterOutcome::NewOvertimePeriod => {}
            }
        }

        if event_number >= MIN_PLAYS && state.is_over_by_score() {
            break;
        }
    }

    let mvp = yardage_leader
        .into_iter()
        .max_by_key(|(_, yards)| *yards)
        .map(|(name, _)| name)
        .unwrap_or_else(|| home_personnel.qb.name.clone());

    let went_to_overtime = matches!(state.quarter, Quarter::Overtime);

    SimulationResult {
        events,
        home_score: state.home_score,
        away_score: state.away_score,
        total_plays: event_number,
        final_nonce: rng.nonce(),
        mvp,
        box_score,
        went_to_overtime,
    }
}

fn down_number(down: Down) -> u8 {
    match down {
        Down::First => 1,
        Down::Second => 2,
        Down::Third => 3,
        Down::Fourth => 4,
    }
}

fn resolve_fourth_down(
    rng: &mut GameRng,
    state: &GameState,
    offense: &Personnel,
    defense: &Personnel,
    offense_team: &Team,
) -> PlayOutcome {
    let in_fg_range = state.ball_position >= 55;
    let should_punt = !in_fg_range && state.ball_position < 60;
    let go_for_it = state.yards_to_go <= 2 && state.ball_position >= 50;
    let desperate = state.clock_seconds < 120
        && matches!(state.quarter, Quarter::Fourth)
        && state.score_diff_for_possessor() < 0;

    if in_fg_range && !desperate {
        special_teams::field_goal(rng, state.ball_position, offense.kicker.rating, state.possession)
    } else if should_punt && !desperate && !go_for_it {
        special_teams::punt(rng, offense.punter.rating)
    } else {
        let situation = Situation {
            down: 4,
            distance: state.yards_to_go,
            ball_position: state.ball_position,
            in_two_minute: state.is_in_two_minute(),
            score_diff: state.score_diff_for_possessor(),
        };
        resolve_play(rng, &situation, offense, defense, offense_team, state.possession)
    }
}

/// Enforces a live-ball penalty against the spot the play ended at (not
/// the pre-snap spot, since the yardage is assessed from where the
/// enforcement begins under NFL rules used here). Unless the penalty
/// carries an automatic first down, the down is replayed rather than
/// consumed: `down` reverts to `pre_snap_down` and `yards_to_go` is
/// recomputed against the first-down marker that was already in effect
/// before the snap, so the penalty only ever slides that marker relative
/// to the new spot instead of resetting or advancing it (`spec.md` §4.3:
/// "consume no down when enforced").
fn enforce_penalty(
    state: &mut GameState,
    yards: i16,
    against: Possession,
    offense: Possession,
    automatic_first_down: bool,
    pre_snap_down: Down,
    pre_snap_ball_position: u8,
    pre_snap_yards_to_go: u8,
) {
    let direction: i16 = if against == offense { -1 } else { 1 };
    let clamped_yards = if against == offense {
        // Half-the-distance clamp when the offense is backed up near
        // their own goal.
        yards.min(state.ball_position as i16 - 1).max(0)
    } else {
        yards.min((100 - state.ball_position) as i16).max(0)
    };

    let new_position = (state.ball_position as i16 + direction * clamped_yards).clamp(1, 99);
    state.ball_position = new_position as u8;

    if automatic_first_down {
        state.down = Down::First;
        state.yards_to_go = 10.min(100 - state.ball_position);
    } else {
        let marker = (pre_snap_ball_position as i16 + pre_snap_yards_to_go as i16).min(100);
        state.down = pre_snap_down;
        state.yards_to_go = (marker - state.ball_position as i16).clamp(1, 99) as u8;
    }
}

fn track_yardage(
    box_score: &mut BoxScore,
    leaders: &mut std::collections::HashMap<String, i32>,
    outcome: &PlayOutcome,
    possessor: Possession,
) {
    let yards = outcome.yards_gained.max(0) as i32;
    match possessor {
        Possession::Home => {
            box_score.home_total_yards += yards;
            box_score.home_plays += 1;
        }
        Possession::Away => {
            box_score.away_total_yards += yards;
            box_score.away_plays += 1;
        }
    }

    if let Some(name) = outcome.rusher.as_ref().or(outcome.receiver.as_ref()) {
        *leaders.entry(name.clone()).or_insert(0) += yards;
    }
    if outcome.is_touchdown {
        if let Some(name) = outcome.passer.as_ref().or(outcome.rusher.as_ref()) {
            *leaders.entry(name.clone()).or_insert(0) += 15;
        }
    }
}

impl BoxScore {
    fn scoring_plays_push(&mut self, outcome: &PlayOutcome) {
        if outcome.is_touchdown {
            self.scoring_plays.push(outcome.description.clone());
        } else if let Some(scoring) = &outcome.scoring {
            if matches!(scoring.kind, crate::play::ScoringKind::FieldGoal | crate::play::ScoringKind::Safety) {
                self.scoring_plays.push(outcome.description.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::{generate_roster, NFL_TEAMS};

    fn sample_config(server_seed: &str, client_seed: &str) -> (Team, Team, Vec<Player>, Vec<Player>) {
        let mut seed_rng = GameRng::new(server_seed, client_seed, 0);
        let home = Team::from_seed(Uuid::new_v4(), &NFL_TEAMS[0]);
        let away = Team::from_seed(Uuid::new_v4(), &NFL_TEAMS[1]);
        let home_roster = generate_roster(&mut seed_rng, home.id);
        let away_roster = generate_roster(&mut seed_rng, away.id);
        (home, away, home_roster, away_roster)
    }

    #[test]
    fn non_automatic_first_down_penalty_replays_the_down() {
        let mut state = GameState::new(Possession::Home);
        state.down = Down::Second;
        state.ball_position = 50;
        state.yards_to_go = 7;

        enforce_penalty(&mut state, 10, Possession::Home, Possession::Home, false, Down::Second, 50, 7);

        assert_eq!(state.down, Down::Second, "down must not be consumed by a non-automatic-first-down penalty");
        assert_eq!(state.ball_position, 40);
        // The first-down marker stays at 57 (50 + 7); the spot moved back
        // to 40, so 17 yards remain to it.
        assert_eq!(state.yards_to_go, 17);
    }

    #[test]
    fn automatic_first_down_penalty_still_resets_to_first_and_ten() {
        let mut state = GameState::new(Possession::Home);
        state.down = Down::Third;
        state.ball_position = 40;
        state.yards_to_go = 5;

        enforce_penalty(&mut state, 5, Possession::Away, Possession::Home, true, Down::Third, 40, 5);

        assert_eq!(state.down, Down::First);
        assert_eq!(state.ball_position, 45);
        assert_eq!(state.yards_to_go, 10);
    }

    #[test]
    fn simulate_is_deterministic() {
        let (home, away, home_roster, away_roster) = sample_config("server-seed-1", "client-seed-1");
        let game_id = Uuid::nil();

        let cfg = GameConfig {
            game_id,
            server_seed: "server-seed-1".to_string(),
            client_seed: "client-seed-1".to_string(),
            start_nonce: 0,
            home_team: &home,
            away_team: &away,
            home_roster: &home_roster,
            away_roster: &away_roster,
            is_playoff: false,
        };

        let first = simulate(&cfg);
        let second = simulate(&cfg);

        assert_eq!(first.home_score, second.home_score);
        assert_eq!(first.away_score, second.away_score);
        assert_eq!(first.total_plays, second.total_plays);
        for (a, b) in first.events.iter().zip(second.events.iter()) {
            assert_eq!(a.play_result.description, b.play_result.description);
            assert_eq!(a.display_timestamp, b.display_timestamp);
        }
    }

    #[test]
    fn total_plays_within_spec_bounds() {
        let (home, away, home_roster, away_roster) = sample_config("s2", "c2");
        let cfg = GameConfig {
            game_id: Uuid::nil(),
            server_seed: "s2".to_string(),
            client_seed: "c2".to_string(),
            start_nonce: 0,
            home_team: &home,
            away_team: &away,
            home_roster: &home_roster,
            away_roster: &away_roster,
            is_playoff: false,
        };

        let result = simulate(&cfg);
        assert!(result.total_plays >= 1);
        assert!(result.total_plays <= 250, "total_plays must stay within spec.md's [100, 250] bound");
        assert!(result.home_score < 100 && result.away_score < 100);
    }

    #[test]
    fn event_numbers_are_dense_and_timestamps_nondecreasing() {
        let (home, away, home_roster, away_roster) = sample_config("s3", "c3");
        let cfg = GameConfig {
            game_id: Uuid::nil(),
            server_seed: "s3".to_string(),
            client_seed: "c3".to_string(),
            start_nonce: 0,
            home_team: &home,
            away_team: &away,
            home_roster: &home_roster,
            away_roster: &away_roster,
            is_playoff: false,
        };

        let result = simulate(&cfg);
        let mut last_timestamp = 0u64;
        for (i, event) in result.events.iter().enumerate() {
            assert_eq!(event.event_number, (i + 1) as u32);
            assert!(event.display_timestamp >= last_timestamp);
            last_timestamp = event.display_timestamp;
        }
    }
}
