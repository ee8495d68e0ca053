//! Playoff bracket generation and re-seeding. `spec.md` §4.2: four
//! division winners (seeds 1-4) plus three wild cards (seeds 5-7) per
//! conference, a bye for the 1-seed in the wild-card round, re-seeding
//! after every round.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayoffTeam {
    pub team_index: usize,
    pub seed: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayoffMatchup {
    pub home_team_index: usize,
    pub away_team_index: usize,
}

/// Builds the seven-team wild-card-round field for one conference from
/// final-standings order (index 0 = best record). `standings_order` must
/// already reflect the division-winners-first, wild-cards-next ordering
/// the caller's standings query produces.
pub fn seed_conference(standings_order: &[usize]) -> Vec<PlayoffTeam> {
    standings_order
        .iter()
        .take(7)
        .enumerate()
        .map(|(i, &team_index)| PlayoffTeam { team_index, seed: (i + 1) as u8 })
        .collect()
}

/// Wild-card round: 1-seed byes; 2 vs 7, 3 vs 6, 4 vs 5.
pub fn wild_card_round(seeds: &[PlayoffTeam]) -> Vec<PlayoffMatchup> {
    assert_eq!(seeds.len(), 7, "wild card round expects a seeded field of seven");
    let by_seed = |s: u8| seeds.iter().find(|t| t.seed == s).expect("seed present").team_index;
    vec![
        PlayoffMatchup { home_team_index: by_seed(2), away_team_index: by_seed(7) },
        PlayoffMatchup { home_team_index: by_seed(3), away_team_index: by_seed(6) },
        PlayoffMatchup { home_team_index: by_seed(4), away_team_index: by_seed(5) },
    ]
}

/// Re-seeds the remaining field for the next round: the lowest remaining
/// seed always hosts and always plays the highest remaining seed (decided
/// per DESIGN.md's Open Question resolution).
pub fn reseed_round(remaining: &[PlayoffTeam]) -> Vec<PlayoffMatchup> {
    let mut sorted = remaining.to_vec();
    sorted.sort_by_key(|t| t.seed);

    let mut matchups = Vec::with_capacity(sorted.len() / 2);
    let mut lo = 0;
    let mut hi = sorted.len() - 1;
    while lo < hi {
        matchups.push(PlayoffMatchup {
            home_team_index: sorted[lo].team_index,
            away_team_index: sorted[hi].team_index,
        });
        lo += 1;
        hi -= 1;
    }
    matchups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Vec<PlayoffTeam> {
        (1..=7u8).map(|seed| PlayoffTeam { team_index: seed as usize, seed }).collect()
    }

    #[test]
    fn wild_card_round_byes_the_one_seed() {
        let matchups = wild_card_round(&field());
        assert_eq!(matchups.len(), 3);
        for m in &matchups {
            assert_ne!(m.home_team_index, 1);
            assert_ne!(m.away_team_index, 1);
        }
    }

    #[test]
    fn wild_card_round_pairs_lowest_remaining_with_highest() {
        let matchups = wild_card_round(&field());
        assert!(matchups.iter().any(|m| m.home_team_index == 2 && m.away_team_index == 7));
        assert!(matchups.iter().any(|m| m.home_team_index == 3 && m.away_team_index == 6));
        assert!(matchups.iter().any(|m| m.home_team_index == 4 && m.away_team_index == 5));
    }

    #[test]
    fn reseed_round_pairs_lowest_remaining_with_highest_remaining() {
        let remaining = vec![
            PlayoffTeam { team_index: 10, seed: 1 },
            PlayoffTeam { team_index: 20, seed: 3 },
            PlayoffTeam { team_index: 30, seed: 5 },
            PlayoffTeam { team_index: 40, seed: 7 },
        ];
        let matchups = reseed_round(&remaining);
        assert_eq!(matchups.len(), 2);
        assert_eq!(matchups[0], PlayoffMatchup { home_team_index: 10, away_team_index: 40 });
        assert_eq!(matchups[1], PlayoffMatchup { home_team_index: 20, away_team_index: 30 });
    }
}
