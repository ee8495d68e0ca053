//! Run/pass/sack/turnover resolution. Grounded on
//! `mock/simulation/plays.rs`'s play-type selection by down/distance/
//! quarter/clock and yardage distributions, generalized from fixed
//! probabilities to ones modulated by offense/defense ratings, QB
//! awareness, receiver rating, and defender coverage, and rewired onto
//! `GameRng` instead of `rand::rngs::StdRng`.

use crate::rng::GameRng;
use crate::team::Team;

use super::injury::maybe_injure;
use super::{
    Personnel, PlayOutcome, PlayType, Possession, Scoring, ScoringKind, Turnover, TurnoverKind,
};

/// The situational inputs a resolver needs, independent of the full
/// engine `GameState` so this module has no dependency on `engine`.
pub struct Situation {
    pub down: u8,
    pub distance: u8,
    /// Ball position, 0..100 from the possessing team's own goal line.
    pub ball_position: u8,
    pub in_two_minute: bool,
    pub score_diff: i16,
}

impl Situation {
    pub fn in_red_zone(&self) -> bool {
        self.ball_position >= 80
    }

    fn yards_to_goal(&self) -> i16 {
        100 - self.ball_position as i16
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Call {
    Run,
    Pass,
}

fn select_call(rng: &mut GameRng, situation: &Situation) -> Call {
    let roll = rng.random_int(0, 99);
    let two_minute = situation.in_two_minute;
    let red_zone = situation.in_red_zone();

    match (situation.down, situation.distance) {
        (1, _) => {
            if two_minute {
                if roll < 75 { Call::Pass } else { Call::Run }
            } else if roll < 45 {
                Call::Run
            } else {
                Call::Pass
            }
        }
        (2, 1..=3) => if roll < 55 { Call::Run } else { Call::Pass },
        (2, 4..=7) => if roll < 45 { Call::Run } else { Call::Pass },
        (2, _) => if roll < 30 { Call::Run } else { Call::Pass },
        (3, 1..=3) => {
            if red_zone && roll < 65 {
                Call::Run
            } else if roll < 50 {
                Call::Run
            } else {
                Call::Pass
            }
        }
        (3, 4..=7) => if roll < 25 { Call::Run } else { Call::Pass },
        (3, _) => if roll < 15 { Call::Run } else { Call::Pass },
        _ => Call::Pass,
    }
}

/// Resolves a single non-fourth-down, non-special-teams play.
pub fn resolve_play(
    rng: &mut GameRng,
    situation: &Situation,
    offense: &Personnel,
    defense: &Personnel,
    offense_team: &Team,
    offense_possession: Possession,
) -> PlayOutcome {
    match select_call(rng, situation) {
        Call::Run => resolve_run(rng, situation, offense, defense, offense_team, offense_possession),
        Call::Pass => resolve_pass(rng, situation, offense, defense, offense_possession),
    }
}

fn resolve_run(
    rng: &mut GameRng,
    situation: &Situation,
    offense: &Personnel,
    defense: &Personnel,
    offense_team: &Team,
    offense_possession: Possession,
) -> PlayOutcome {
    // Fumble chance, bumped by a strength mismatch between rusher and
    // the defense's front seven.
    let strength_gap = defense.dl.strength as f64 - offense.rb.strength as f64;
    let fumble_rate = (0.010 + strength_gap.max(0.0) / 4000.0).clamp(0.005, 0.03);

    if rng.probability(fumble_rate) {
        let lost = rng.probability(0.5);
        let injury = maybe_injure(rng, offense.rb, true);
        return PlayOutcome {
            play_type: PlayType::Run,
            yards_gained: if lost { 0 } else { rng.random_int(-3, 0) as i16 },
            passer: None,
            rusher: Some(offense.rb.name.clone()),
            receiver: None,
            defender: Some(defense.lb.name.clone()),
            scoring: None,
            turnover: if lost {
                Some(Turnover { kind: TurnoverKind::FumbleLost, return_yards: 0 })
            } else {
                None
            },
            penalty: None,
            injury,
            clock_elapsed: rng.random_int(5, 10) as u16,
            is_clock_stopped: lost,
            is_first_down: false,
            is_touchdown: false,
            is_safety: false,
            description: if lost {
                "Fumble! Recovered by the defense.".to_string()
            } else {
                "Fumble, recovered by the offense.".to_string()
            },
        };
    }

    let line_edge = offense_team.offense as f64 - defense.dl.rating as f64;
    let mean = 4.0 + line_edge / 25.0;
    let mut yards = rng.gaussian(mean, 4.0, Some((-5.0, 75.0))).round() as i16;
    yards = yards.min(situation.yards_to_goal());

    let would_score = yards >= situation.yards_to_goal();
    let would_safety = situation.ball_position as i16 + yards <= 0;
    let high_impact = yards < 0 || rng.probability(0.15);
    let injury = maybe_injure(rng, offense.rb, high_impact);

    if would_score {
        let gain = situation.yards_to_goal();
        return PlayOutcome {
            play_type: PlayType::Run,
            yards_gained: gain,
            passer: None,
            rusher: Some(offense.rb.name.clone()),
            receiver: None,
            defender: None,
            scoring: Some(Scoring { kind: ScoringKind::Touchdown, points: 6, scoring_team: offense_possession }),
            turnover: None,
            penalty: None,
            injury,
            clock_elapsed: rng.random_int(5, 15) as u16,
            is_clock_stopped: true,
            is_first_down: false,
            is_touchdown: true,
            is_safety: false,
            description: format!("{}-yard rushing touchdown by {}!", gain, offense.rb.name),
        };
    }

    if would_safety {
        return PlayOutcome {
            play_type: PlayType::Run,
            yards_gained: -(situation.ball_position as i16),
            passer: None,
            rusher: Some(offense.rb.name.clone()),
            receiver: None,
            defender: Some(defense.dl.name.clone()),
            scoring: Some(Scoring { kind: ScoringKind::Safety, points: 2, scoring_team: offense_possession.opponent() }),
            turnover: None,
            penalty: None,
            injury,
            clock_elapsed: rng.random_int(5, 10) as u16,
            is_clock_stopped: true,
            is_first_down: false,
            is_touchdown: false,
            is_safety: true,
            description: "Safety! Tackled in the end zone.".to_string(),
        };
    }

    let is_first_down = yards as u8 >= situation.distance;
    let clock_stopped = yards < 0 || rng.probability(0.30);
    let clock_elapsed = if clock_stopped { rng.random_int(5, 15) } else { rng.random_int(25, 45) } as u16;

    PlayOutcome {
        play_type: PlayType::Run,
        yards_gained: yards,
        passer: None,
        rusher: Some(offense.rb.name.clone()),
        receiver: None,
        defender: Some(defense.lb.name.clone()),
        scoring: None,
        turnover: None,
        penalty: None,
        injury,
        clock_elapsed,
        is_clock_stopped: clock_stopped,
        is_first_down,
        is_touchdown: false,
        is_safety: false,
        description: describe_run(yards, &offense.rb.name),
    }
}

fn describe_run(yards: i16, rusher: &str) -> String {
    match yards.cmp(&0) {
        std::cmp::Ordering::Greater => format!("{rusher} rushes for {yards} yards."),
        std::cmp::Ordering::Equal => format!("{rusher} rushes for no gain."),
        std::cmp::Ordering::Less => format!("{rusher} is stopped for a loss of {} yards.", -yards),
    }
}

fn resolve_pass(
    rng: &mut GameRng,
    situation: &Situation,
    offense: &Personnel,
    defense: &Personnel,
    offense_possession: Possession,
) -> PlayOutcome {
    let sack_rate = (0.07 + (defense.dl.rating as f64 - offense.ol.rating as f64) / 1000.0).clamp(0.02, 0.15);
    if rng.probability(sack_rate) {
        let yards_lost = rng.random_int(3, 10);
        let injury = maybe_injure(rng, offense.qb, true);
        return PlayOutcome {
            play_type: PlayType::Sack,
            yards_gained: -yards_lost,
            passer: Some(offense.qb.name.clone()),
            rusher: None,
            receiver: None,
            defender: Some(defense.dl.name.clone()),
            scoring: None,
            turnover: None,
            penalty: None,
            injury,
            clock_elapsed: rng.random_int(25, 40) as u16,
            is_clock_stopped: false,
            is_first_down: false,
            is_touchdown: false,
            is_safety: false,
            description: format!("{} sacked for a loss of {} yards!", offense.qb.name, yards_lost),
        };
    }

    let coverage_edge = defense.cb.awareness as f64 - offense.qb.awareness as f64;
    let int_rate = (0.025 + coverage_edge / 2000.0).clamp(0.005, 0.06);
    if rng.probability(int_rate) {
        return PlayOutcome {
            play_type: PlayType::PassIncomplete,
            yards_gained: 0,
            passer: Some(offense.qb.name.clone()),
            rusher: None,
            receiver: None,
            defender: Some(defense.cb.name.clone()),
            scoring: None,
            turnover: Some(Turnover { kind: TurnoverKind::Interception, return_yards: rng.random_int(0, 20) }),
            penalty: None,
            injury: None,
            clock_elapsed: rng.random_int(5, 10) as u16,
            is_clock_stopped: true,
            is_first_down: false,
            is_touchdown: false,
            is_safety: false,
            description: format!("Intercepted by {}!", defense.cb.name),
        };
    }

    let completion_edge = offense.wr.rating as f64 + offense.qb.awareness as f64 - defense.cb.awareness as f64;
    let incomplete_rate = (0.35 - completion_edge / 2000.0).clamp(0.18, 0.50);
    if rng.probability(incomplete_rate) {
        return PlayOutcome {
            play_type: PlayType::PassIncomplete,
            yards_gained: 0,
            passer: Some(offense.qb.name.clone()),
            rusher: None,
            receiver: Some(offense.wr.name.clone()),
            defender: Some(defense.cb.name.clone()),
            scoring: None,
            turnover: None,
            penalty: None,
            injury: None,
            clock_elapsed: rng.random_int(5, 10) as u16,
            is_clock_stopped: true,
            is_first_down: false,
            is_touchdown: false,
            is_safety: false,
            description: "Pass incomplete.".to_string(),
        };
    }

    let target_boost = if situation.distance >= 5 { 3.0 } else { 0.0 };
    let roll = rng.random_int(0, 99);
    let mut yards = if roll < 10 {
        rng.random_int(-2, 2)
    } else if roll < 35 {
        rng.random_int(3, 7) + (target_boost / 2.0) as i64
    } else if roll < 70 {
        rng.random_int(8, 15) + target_boost as i64
    } else if roll < 90 {
        rng.random_int(16, 30)
    } else {
        rng.random_int(31, 75)
    } as i16;
    yards = yards.min(situation.yards_to_goal());

    let high_impact = rng.probability(0.1);
    let injury = maybe_injure(rng, offense.wr, high_impact);

    if yards >= situation.yards_to_goal() {
        return PlayOutcome {
            play_type: PlayType::PassComplete,
            yards_gained: situation.yards_to_goal(),
            passer: Some(offense.qb.name.clone()),
            rusher: None,
            receiver: Some(offense.wr.name.clone()),
            defender: None,
            scoring: Some(Scoring { kind: ScoringKind::Touchdown, points: 6, scoring_team: offense_possession }),
            turnover: None,
            penalty: None,
            injury,
            clock_elapsed: rng.random_int(5, 15) as u16,
            is_clock_stopped: true,
            is_first_down: false,
            is_touchdown: true,
            is_safety: false,
            description: format!(
                "{} to {} for a {}-yard touchdown!",
                offense.qb.name,
                offense.wr.name,
                situation.yards_to_goal()
            ),
        };
    }

    let is_first_down = yards as u8 >= situation.distance;
    let clock_stopped = rng.probability(0.25);
    let clock_elapsed = if clock_stopped { rng.random_int(5, 15) } else { rng.random_int(25, 45) } as u16;

    PlayOutcome {
        play_type: PlayType::PassComplete,
        yards_gained: yards,
        passer: Some(offense.qb.name.clone()),
        rusher: None,
        receiver: Some(offense.wr.name.clone()),
        defender: Some(defense.cb.name.clone()),
        scoring: None,
        turnover: None,
        penalty: None,
        injury,
        clock_elapsed,
        is_clock_stopped: clock_stopped,
        is_first_down,
        is_touchdown: false,
        is_safety: false,
        description: if yards >= 0 {
            format!("{} complete to {} for {} yards.", offense.qb.name, offense.wr.name, yards)
        } else {
            format!("{} complete to {} for a loss of {} yards.", offense.qb.name, offense.wr.name, -yards)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::{generate_roster, NFL_TEAMS, Team};
    use uuid::Uuid;

    fn sample_team_and_roster(seed_index: usize, rng: &mut GameRng) -> (Team, Vec<crate::team::Player>) {
        let team = Team::from_seed(Uuid::new_v4(), &NFL_TEAMS[seed_index]);
        let roster = generate_roster(rng, team.id);
        (team, roster)
    }

    #[test]
    fn big_play_rate_falls_in_spec_band() {
        let mut rng = GameRng::new("seed", "client", 0);
        let (offense_team, offense_roster) = sample_team_and_roster(0, &mut rng);
        let (_, defense_roster) = sample_team_and_roster(1, &mut rng);
        let offense = Personnel::resolve(&offense_roster);
        let defense = Personnel::resolve(&defense_roster);

        let mut big_plays = 0;
        let mut turnovers = 0;
        const TRIALS: u32 = 3000;
        for i in 0..TRIALS {
            let situation = Situation {
                down: 1,
                distance: 10,
                ball_position: 25 + (i % 50) as u8,
                in_two_minute: false,
                score_diff: 0,
            };
            let outcome = resolve_play(&mut rng, &situation, &offense, &defense, &offense_team, Possession::Home);
            if outcome.turnover.is_some() {
                turnovers += 1;
                continue;
            }
            if outcome.yards_gained >= 20 {
                big_plays += 1;
            }
        }

        let rate = big_plays as f64 / (TRIALS - turnovers) as f64;
        assert!((0.0..=0.20).contains(&rate), "big play rate {rate} too high");
    }
}
