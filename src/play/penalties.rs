//! Penalty rolls, applied after a play resolves. `spec.md` §4.3: overall
//! rate ≈7.5% of non-special plays, a single penalty per play, enforcement
//! moves the ball against the offender with half-the-distance clamping
//! near the goal, some defensive infractions grant an automatic first
//! down, and declined/offsetting penalties leave state untouched.

use crate::rng::GameRng;

use super::{Penalty, PenaltyKind, Possession};

const PENALTY_RATE: f64 = 0.075;

struct PenaltyTemplate {
    kind: PenaltyKind,
    yards: i16,
    offense: bool,
    automatic_first_down: bool,
}

const TEMPLATES: &[PenaltyTemplate] = &[
    PenaltyTemplate { kind: PenaltyKind::FalseStart, yards: 5, offense: true, automatic_first_down: false },
    PenaltyTemplate { kind: PenaltyKind::Holding, yards: 10, offense: true, automatic_first_down: false },
    PenaltyTemplate { kind: PenaltyKind::DelayOfGame, yards: 5, offense: true, automatic_first_down: false },
    PenaltyTemplate { kind: PenaltyKind::Offside, yards: 5, offense: false, automatic_first_down: false },
    PenaltyTemplate { kind: PenaltyKind::PassInterference, yards: 15, offense: false, automatic_first_down: true },
    PenaltyTemplate { kind: PenaltyKind::RoughingThePasser, yards: 15, offense: false, automatic_first_down: true },
    PenaltyTemplate { kind: PenaltyKind::UnnecessaryRoughness, yards: 15, offense: false, automatic_first_down: true },
];

/// Rolls whether a penalty occurs on this play and, if so, which one.
/// `offense`/`defense` identify which side the flag would be thrown
/// against in terms of `Possession`.
pub fn maybe_penalty(rng: &mut GameRng, offense: Possession) -> Option<Penalty> {
    if !rng.probability(PENALTY_RATE) {
        return None;
    }

    let weights: Vec<(usize, f64)> = TEMPLATES.iter().enumerate().map(|(i, _)| (i, 1.0)).collect();
    let &(index, _) = rng.weighted_choice(&weights);
    let template = &TEMPLATES[index];

    let against = if template.offense { offense } else { offense.opponent() };

    // 10% of flags get declined, 5% offset.
    let declined = rng.probability(0.10);
    let offsetting = !declined && rng.probability(0.05);

    Some(Penalty {
        kind: template.kind,
        yards: template.yards,
        against,
        automatic_first_down: template.automatic_first_down && !declined && !offsetting,
        declined,
        offsetting,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn penalty_rate_falls_in_expected_band_over_many_plays() {
        let mut rng = GameRng::new("seed", "client", 0);
        let mut flags = 0;
        const TRIALS: u32 = 2000;
        for _ in 0..TRIALS {
            if maybe_penalty(&mut rng, Possession::Home).is_some() {
                flags += 1;
            }
        }
        let rate = flags as f64 / TRIALS as f64;
        assert!((0.05..=0.12).contains(&rate), "penalty rate {rate} out of band");
    }

    #[test]
    fn declined_or_offsetting_penalties_carry_no_enforcement() {
        let mut rng = GameRng::new("seed", "client", 0);
        for _ in 0..500 {
            if let Some(penalty) = maybe_penalty(&mut rng, Possession::Away) {
                if penalty.declined || penalty.offsetting {
                    assert!(!penalty.automatic_first_down);
                }
            }
        }
    }
}
