//! Season/game/standings domain types, grounded on the entity shapes
//! `spec.md` §3 names. `tick` carries the state machine that advances
//! these; this module only carries the data they're made of.

pub mod tick;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::engine::BoxScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "TEXT")]
#[serde(rename_all = "snake_case")]
pub enum SeasonStatus {
    Active,
    Playoffs,
    Offseason,
}

/// One 22-week cycle: an 18-week regular season followed by a four-round
/// playoff bracket (wild card, divisional, conference, Super Bowl).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Season {
    pub id: Uuid,
    pub season_number: u32,
    pub current_week: u8,
    pub total_weeks: u8,
    pub status: SeasonStatus,
    /// Hex-encoded master seed; derives every game's server seed for the
    /// season, letting a third party re-derive the whole season's RNG
    /// stream from one published value once it's over.
    pub master_seed: String,
}

pub const TOTAL_WEEKS: u8 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "TEXT")]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Regular,
    WildCard,
    Divisional,
    Conference,
    SuperBowl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "TEXT")]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    Broadcasting,
    Completed,
}

/// A single game. `server_seed` is withheld from any external
/// representation until `status` is `Completed` — callers outside the
/// store must always go through `Game::public` rather than serializing
/// this directly.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Game {
    pub id: Uuid,
    pub season_id: Uuid,
    pub week: u8,
    pub game_type: GameType,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub home_score: u16,
    pub away_score: u16,
    pub status: GameStatus,
    pub is_featured: bool,
    pub server_seed_hash: String,
    pub server_seed: Option<String>,
    pub client_seed: String,
    pub nonce: u64,
    pub total_plays: u32,
    pub box_score: Option<BoxScore>,
    pub broadcast_started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

impl Game {
    /// The externally visible projection: `server_seed` is blanked out
    /// until the game is `Completed`, per the provably-fair reveal
    /// protocol (`spec.md` §4.1 — commit at creation, reveal at finish),
    /// and `home_score`/`away_score` are withheld the same way (`spec.md`
    /// §6 — the engine computes the full result the moment broadcasting
    /// starts, so the row already holds the final score well before a
    /// viewer's stream has paced out the last play).
    pub fn public(self) -> PublicGame {
        let is_completed = matches!(self.status, GameStatus::Completed);
        PublicGame {
            id: self.id,
            season_id: self.season_id,
            week: self.week,
            game_type: self.game_type,
            home_team_id: self.home_team_id,
            away_team_id: self.away_team_id,
            home_score: is_completed.then_some(self.home_score),
            away_score: is_completed.then_some(self.away_score),
            status: self.status,
            is_featured: self.is_featured,
            server_seed_hash: self.server_seed_hash,
            server_seed: is_completed.then_some(self.server_seed).flatten(),
            client_seed: self.client_seed,
            nonce: self.nonce,
            total_plays: self.total_plays,
            box_score: self.box_score,
            broadcast_started_at: self.broadcast_started_at,
            completed_at: self.completed_at,
        }
    }
}

/// The shape returned over HTTP. Identical to [`Game`] except
/// `home_score`/`away_score`/`server_seed` are `None` until the game is
/// `Completed` — kept as a distinct type so an accidental `Json(game)`
/// elsewhere can't leak a live score by construction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicGame {
    pub id: Uuid,
    pub season_id: Uuid,
    pub week: u8,
    pub game_type: GameType,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub home_score: Option<u16>,
    pub away_score: Option<u16>,
    pub status: GameStatus,
    pub is_featured: bool,
    pub server_seed_hash: String,
    pub server_seed: Option<String>,
    pub client_seed: String,
    pub nonce: u64,
    pub total_plays: u32,
    pub box_score: Option<BoxScore>,
    pub broadcast_started_at: Option<i64>,
    pub completed_at: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(rename_all = "snake_case", type_name = "TEXT")]
#[serde(rename_all = "snake_case")]
pub enum Streak {
    Win,
    Loss,
    Tie,
    None,
}

/// Per-team, per-season accumulator. Recomputed incrementally after each
/// completed game rather than derived from the full game log each read,
/// so standings reads stay O(1) against the `standings` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct Standings {
    pub season_id: Uuid,
    pub team_id: Uuid,
    pub wins: u16,
    pub losses: u16,
    pub ties: u16,
    pub division_wins: u16,
    pub division_losses: u16,
    pub conference_wins: u16,
    pub conference_losses: u16,
    pub points_for: u32,
    pub points_against: u32,
    pub streak: Streak,
    pub streak_count: u16,
    pub playoff_seed: Option<u8>,
    pub clinched: bool,
}

impl Standings {
    pub fn new(season_id: Uuid, team_id: Uuid) -> Self {
        Self {
            season_id,
            team_id,
            wins: 0,
            losses: 0,
            ties: 0,
            division_wins: 0,
            division_losses: 0,
            conference_wins: 0,
            conference_losses: 0,
            points_for: 0,
            points_against: 0,
            streak: Streak::None,
            streak_count: 0,
            playoff_seed: None,
            clinched: false,
        }
    }

    pub fn win_pct(&self) -> f64 {
        let total = self.wins + self.losses + self.ties;
        if total == 0 {
            return 0.0;
        }
        (self.wins as f64 + self.ties as f64 * 0.5) / total as f64
    }

    /// Applies the result of one completed game from this team's
    /// perspective. `is_division` and `is_conference` describe the
    /// opponent's relationship to this team.
    pub fn apply_result(
        &mut self,
        points_for: u16,
        points_against: u16,
        is_division: bool,
        is_conference: bool,
    ) {
        self.points_for += points_for as u32;
        self.points_against += points_against as u32;

        use std::cmp::Ordering;
        let outcome = points_for.cmp(&points_against);
        match outcome {
            Ordering::Greater => {
                self.wins += 1;
                if is_division {
                    self.division_wins += 1;
                }
                if is_conference {
                    self.conference_wins += 1;
                }
                if matches!(self.streak, Streak::Win) {
                    self.streak_count += 1;
                } else {
                    self.streak = Streak::Win;
                    self.streak_count = 1;
                }
            }
            Ordering::Less => {
                self.losses += 1;
                if is_division {
                    self.division_losses += 1;
                }
                if is_conference {
                    self.conference_losses += 1;
                }
                if matches!(self.streak, Streak::Loss) {
                    self.streak_count += 1;
                } else {
                    self.streak = Streak::Loss;
                    self.streak_count = 1;
                }
            }
            Ordering::Equal => {
                self.ties += 1;
                self.streak = Streak::Tie;
                self.streak_count = 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_game(status: GameStatus) -> Game {
        Game {
            id: Uuid::new_v4(),
            season_id: Uuid::new_v4(),
            week: 1,
            game_type: GameType::Regular,
            home_team_id: Uuid::new_v4(),
            away_team_id: Uuid::new_v4(),
            home_score: 24,
            away_score: 17,
            status,
            is_featured: false,
            server_seed_hash: "abc".to_string(),
            server_seed: Some("secret".to_string()),
            client_seed: "client".to_string(),
            nonce: 0,
            total_plays: 0,
            box_score: None,
            broadcast_started_at: None,
            completed_at: None,
        }
    }

    #[test]
    fn public_game_withholds_seed_until_completed() {
        let game = sample_game(GameStatus::Scheduled).public();
        assert!(game.server_seed.is_none());

        let completed = sample_game(GameStatus::Completed).public();
        assert_eq!(completed.server_seed.as_deref(), Some("secret"));
    }

    #[test]
    fn public_game_withholds_scores_until_completed() {
        let broadcasting = sample_game(GameStatus::Broadcasting).public();
        assert_eq!(broadcasting.home_score, None);
        assert_eq!(broadcasting.away_score, None);

        let completed = sample_game(GameStatus::Completed).public();
        assert_eq!(completed.home_score, Some(24));
        assert_eq!(completed.away_score, Some(17));
    }

    #[test]
    fn standings_track_streaks_across_results() {
        let season_id = Uuid::new_v4();
        let team_id = Uuid::new_v4();
        let mut standings = Standings::new(season_id, team_id);

        standings.apply_result(24, 17, true, true);
        standings.apply_result(28, 14, false, true);
        assert_eq!(standings.wins, 2);
        assert!(matches!(standings.streak, Streak::Win));
        assert_eq!(standings.streak_count, 2);

        standings.apply_result(10, 20, true, true);
        assert_eq!(standings.losses, 1);
        assert!(matches!(standings.streak, Streak::Loss));
        assert_eq!(standings.streak_count, 1);
    }

    #[test]
    fn win_pct_counts_ties_as_half_wins() {
        let mut standings = Standings::new(Uuid::new_v4(), Uuid::new_v4());
        standings.apply_result(20, 20, false, false);
        standings.apply_result(10, 7, false, false);
        assert!((standings.win_pct() - 0.75).abs() < 1e-9);
    }
}
