//! Injury rolls. `spec.md` §3's `injuryProne` player field and §7's
//! "injury" sub-record are named but never load-bearing in the distilled
//! spec body; this repo makes them load-bearing by consulting a roll after
//! high-impact plays (sacks, big hits on runs), gated behind the
//! participant's `injury_prone` rating, since a complete engine should use
//! the data it models.

use crate::rng::GameRng;
use crate::team::Player;

use super::{Injury, InjurySeverity};

const BASE_RATE: f64 = 0.004;
const INJURY_PRONE_MULTIPLIER: f64 = 2.5;

/// Rolls for an injury to `participant` after a high-impact play. Returns
/// `None` far more often than not — this is a rare event by design.
pub fn maybe_injure(rng: &mut GameRng, participant: &Player, high_impact: bool) -> Option<Injury> {
    if !high_impact {
        return None;
    }

    let rate = if participant.injury_prone {
        BASE_RATE * INJURY_PRONE_MULTIPLIER
    } else {
        BASE_RATE
    };

    if !rng.probability(rate) {
        return None;
    }

    let severity = if rng.probability(0.3) {
        InjurySeverity::Out
    } else {
        InjurySeverity::Questionable
    };

    Some(Injury {
        player_id: participant.id,
        player_name: participant.name.clone(),
        severity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::Position;
    use uuid::Uuid;

    fn player(injury_prone: bool) -> Player {
        Player {
            id: Uuid::new_v4(),
            team_id: Uuid::new_v4(),
            name: "Test Back".to_string(),
            position: Position::Rb,
            jersey_number: 22,
            rating: 80,
            speed: 80,
            strength: 80,
            awareness: 80,
            clutch_rating: 80,
            injury_prone,
        }
    }

    #[test]
    fn no_roll_on_routine_plays() {
        let mut rng = GameRng::new("s", "c", 0);
        let p = player(true);
        for _ in 0..100 {
            assert!(maybe_injure(&mut rng, &p, false).is_none());
        }
    }

    #[test]
    fn injury_prone_players_get_hurt_more_often() {
        let mut prone_rng = GameRng::new("s", "c", 0);
        let mut normal_rng = GameRng::new("s", "c", 0);
        let prone = player(true);
        let normal = player(false);

        let prone_hits = (0..5000).filter(|_| maybe_injure(&mut prone_rng, &prone, true).is_some()).count();
        let normal_hits = (0..5000).filter(|_| maybe_injure(&mut normal_rng, &normal, true).is_some()).count();

        assert!(prone_hits >= normal_hits);
    }
}
