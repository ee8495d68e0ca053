//! The `tick` state machine. `spec.md` §4.6: a single entry point invoked
//! by an external cron (here, `POST /api/simulate`); on each call it
//! selects at most one action over persisted state and returns its
//! outcome. `Season.status`/`Game.status` transitions are all
//! conditional updates, never read-then-write, so two concurrent
//! invocations can't double-apply the same step (`spec.md` §9).

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::SeasonConfig;
use crate::engine::{simulate, GameConfig};
use crate::error::AppError;
use crate::rng::hash_seed;
use crate::schedule::{self, playoffs};
use crate::season::{GameStatus, GameType, SeasonStatus};
use crate::store::games::NewGame;
use crate::store::{events as store_events, games, players, seasons, standings, teams, Store};
use crate::team::Team;

/// Process-wide advisory lock serializing concurrent `/api/simulate`
/// calls before they even reach the database — the first line of defense
/// against a double-tick; the conditional `UPDATE ... WHERE status = ?`
/// statements in `store` are the second (`SPEC_FULL.md` §4.6).
#[derive(Debug, Default)]
pub struct TickLock(Mutex<()>);

impl TickLock {
    pub fn new() -> Self {
        Self(Mutex::new(()))
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TickOutcome {
    CreatedSeason { season_number: u32 },
    StartedGame { game_id: Uuid },
    Finalized { game_id: Uuid },
    AdvancedWeek { week: u8 },
    GeneratedPlayoffs { week: u8 },
    TransitionedOffseason,
    StartedNextSeason { season_number: u32 },
    Idle,
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// The single entry point. Acquires `lock`, then decides and executes at
/// most one state transition. `config` carries every tunable gap the
/// decision logic consults.
pub async fn tick(store: &Store, config: &SeasonConfig, lock: &Arc<TickLock>) -> Result<TickOutcome, AppError> {
    let _guard = lock.0.lock().await;

    let timeout = std::time::Duration::from_secs(config.action_timeout_secs);
    tokio::time::timeout(timeout, run(store, config)).await.map_err(|_| AppError::Timeout)?
}

async fn run(store: &Store, config: &SeasonConfig) -> Result<TickOutcome, AppError> {
    let pool = store.pool();

    teams::seed_if_empty(pool).await?;

    let Some(season) = seasons::latest(pool).await? else {
        return create_season(store, 1).await;
    };

    match season.status {
        SeasonStatus::Offseason => {
            return create_season(store, season.season_number + 1).await;
        }
        SeasonStatus::Active | SeasonStatus::Playoffs => {}
    }

    if let Some(game) = games::find_broadcasting(pool, season.id).await? {
        let duration_secs = broadcast_duration_secs(pool, game.id).await?;
        let elapsed = now() - game.broadcast_started_at.unwrap_or(now());
        if elapsed < duration_secs {
            return Ok(TickOutcome::Idle);
        }

        let is_div = is_division_matchup(pool, game.home_team_id, game.away_team_id).await?;
        let is_conf = is_conference_matchup(pool, game.home_team_id, game.away_team_id).await?;

        if games::finalize_cas(pool, game.id, now()).await? {
            standings::apply_game_result(
                pool,
                season.id,
                game.home_team_id,
                game.away_team_id,
                game.home_score,
                game.away_score,
                is_div,
                is_conf,
            )
            .await?;
        }
        return Ok(TickOutcome::Finalized { game_id: game.id });
    }

    if let Some(game) = games::find_next_scheduled(pool, season.id, season.current_week).await? {
        if let Some(gate) = earliest_start_gate(pool, season.id, season.current_week, game.id, config).await? {
            if now() < gate {
                return Ok(TickOutcome::Idle);
            }
        }
        return start_game(store, &game).await;
    }

    if games::all_completed_in_week(pool, season.id, season.current_week).await? {
        return advance(store, config, &season).await;
    }

    Ok(TickOutcome::Idle)
}

/// Total wall-clock length of a broadcast: the last event's
/// `display_timestamp`, the millisecond offset from broadcast start.
async fn broadcast_duration_secs(pool: &sqlx::SqlitePool, game_id: Uuid) -> Result<i64, sqlx::Error> {
    let events = store_events::list(pool, game_id).await?;
    Ok(events.last().map(|e| e.display_timestamp as i64 / 1000).unwrap_or(0))
}

async fn earliest_start_gate(
    pool: &sqlx::SqlitePool,
    season_id: Uuid,
    week: u8,
    game_id: Uuid,
    config: &SeasonConfig,
) -> Result<Option<i64>, sqlx::Error> {
    let week_games = games::list_by_week(pool, season_id, week).await?;
    let position = week_games.iter().position(|g| g.id == game_id).unwrap_or(0);
    if position == 0 {
        return Ok(None);
    }
    // Gate on the previous game in the week having completed; in practice
    // `find_next_scheduled` already only returns a game once prior ones
    // have started, so this reduces to the configured inter-game gap from
    // the most recently completed game's `completed_at`.
    let previous_completed_at = week_games
        .iter()
        .take(position)
        .filter_map(|g| g.completed_at)
        .max();
    Ok(previous_completed_at.map(|t| t + config.inter_game_gap_secs))
}

async fn is_division_matchup(pool: &sqlx::SqlitePool, home_id: Uuid, away_id: Uuid) -> Result<bool, sqlx::Error> {
    let home = teams::get(pool, home_id).await?;
    let away = teams::get(pool, away_id).await?;
    Ok(matches!((home, away), (Some(h), Some(a)) if h.conference == a.conference && h.division == a.division))
}

async fn is_conference_matchup(pool: &sqlx::SqlitePool, home_id: Uuid, away_id: Uuid) -> Result<bool, sqlx::Error> {
    let home = teams::get(pool, home_id).await?;
    let away = teams::get(pool, away_id).await?;
    Ok(matches!((home, away), (Some(h), Some(a)) if h.conference == a.conference))
}

async fn create_season(store: &Store, season_number: u32) -> Result<TickOutcome, AppError> {
    let pool = store.pool();
    let master_seed = hash_seed(&format!("season-{}-{}", season_number, Uuid::new_v4()));
    let season = seasons::create(pool, season_number, &master_seed).await?;

    let teams = teams::list(pool).await?;
    standings::init_for_season(pool, season.id, &teams.iter().map(|t| t.id).collect::<Vec<_>>()).await?;

    let schedule = schedule::generate_regular_season(&teams, &season.master_seed);
    let new_games: Vec<NewGame> = schedule
        .iter()
        .enumerate()
        .map(|(index, g)| {
            let server_seed = hash_seed(&format!("{}:{}:{}", season.master_seed, g.week, index));
            NewGame {
                season_id: season.id,
                week: g.week,
                game_type: GameType::Regular,
                home_team_id: teams[g.home_team_index].id,
                away_team_id: teams[g.away_team_index].id,
                is_featured: g.is_division_game,
                server_seed_hash: hash_seed(&server_seed),
                server_seed,
                client_seed: format!("season-{}-w{}-g{}", season_number, g.week, index),
            }
        })
        .collect();
    games::create_batch(pool, &new_games).await?;

    Ok(TickOutcome::CreatedSeason { season_number })
}

async fn start_game(store: &Store, game: &crate::season::Game) -> Result<TickOutcome, AppError> {
    let pool = store.pool();
    let home_team = teams::get(pool, game.home_team_id)
        .await?
        .ok_or_else(|| AppError::NotFound("home team".to_string()))?;
    let away_team = teams::get(pool, game.away_team_id)
        .await?
        .ok_or_else(|| AppError::NotFound("away team".to_string()))?;
    let home_roster = players::roster_for_team(pool, home_team.id).await?;
    let away_roster = players::roster_for_team(pool, away_team.id).await?;

    let server_seed = game
        .server_seed
        .clone()
        .ok_or_else(|| AppError::InvalidState("scheduled game has no server seed".to_string()))?;

    let cfg = GameConfig {
        game_id: game.id,
        server_seed,
        client_seed: game.client_seed.clone(),
        start_nonce: game.nonce,
        home_team: &home_team,
        away_team: &away_team,
        home_roster: &home_roster,
        away_roster: &away_roster,
        is_playoff: !matches!(game.game_type, GameType::Regular),
    };

    let result = simulate(&cfg);
    store_events::append(pool, &result.events).await?;

    let started_at = now();
    games::start_game_cas(
        pool,
        game.id,
        started_at,
        result.home_score,
        result.away_score,
        result.final_nonce,
        result.total_plays,
        &result.box_score,
    )
    .await?;

    Ok(TickOutcome::StartedGame { game_id: game.id })
}

async fn advance(store: &Store, config: &SeasonConfig, season: &crate::season::Season) -> Result<TickOutcome, AppError> {
    let pool = store.pool();

    if season.current_week < schedule::REGULAR_SEASON_WEEKS {
        let advanced = seasons::advance_week_cas(pool, season.id, season.current_week, season.current_week + 1).await?;
        return Ok(if advanced {
            TickOutcome::AdvancedWeek { week: season.current_week + 1 }
        } else {
            TickOutcome::Idle
        });
    }

    if season.current_week == schedule::REGULAR_SEASON_WEEKS {
        return generate_wild_card_round(store, season).await;
    }

    // Weeks 19-21 are playoff rounds; week 22 is the Super Bowl. Advance
    // through each by re-seeding the remaining field from the prior
    // round's results.
    if season.current_week < schedule::REGULAR_SEASON_WEEKS + 4 {
        if let Some(outcome) = generate_next_playoff_round(store, season).await? {
            return Ok(outcome);
        }
    }

    if set_offseason(store, config, season).await? {
        return Ok(TickOutcome::TransitionedOffseason);
    }

    Ok(TickOutcome::Idle)
}

async fn generate_wild_card_round(store: &Store, season: &crate::season::Season) -> Result<TickOutcome, AppError> {
    let pool = store.pool();
    let teams = teams::list(pool).await?;
    let team_index = |id: Uuid| teams.iter().position(|t| t.id == id).unwrap();
    let afc: Vec<(Uuid, crate::team::Division)> =
        teams.iter().filter(|t| t.conference == crate::team::Conference::Afc).map(|t| (t.id, t.division)).collect();
    let nfc: Vec<(Uuid, crate::team::Division)> =
        teams.iter().filter(|t| t.conference == crate::team::Conference::Nfc).map(|t| (t.id, t.division)).collect();

    let afc_order = standings::assign_playoff_seeds(pool, season.id, &afc).await?;
    let nfc_order = standings::assign_playoff_seeds(pool, season.id, &nfc).await?;

    let new_week = season.current_week + 1;
    let mut new_games = Vec::new();
    for conf_order in [&afc_order, &nfc_order] {
        let indices: Vec<usize> = conf_order.iter().map(|&id| team_index(id)).collect();
        let field = playoffs::seed_conference(&indices);
        for matchup in playoffs::wild_card_round(&field) {
            new_games.push(matchup_to_new_game(season, new_week, &matchup, &teams));
        }
    }

    games::create_batch(pool, &new_games).await?;
    seasons::set_status_cas(pool, season.id, SeasonStatus::Active, SeasonStatus::Playoffs).await?;
    seasons::advance_week_cas(pool, season.id, season.current_week, new_week).await?;

    Ok(TickOutcome::GeneratedPlayoffs { week: new_week })
}

fn matchup_to_new_game(
    season: &crate::season::Season,
    week: u8,
    matchup: &playoffs::PlayoffMatchup,
    teams: &[Team],
) -> NewGame {
    let server_seed = hash_seed(&format!(
        "{}:playoffs:{}:{}:{}",
        season.master_seed, week, matchup.home_team_index, matchup.away_team_index
    ));
    NewGame {
        season_id: season.id,
        week,
        game_type: playoff_game_type(week),
        home_team_id: teams[matchup.home_team_index].id,
        away_team_id: teams[matchup.away_team_index].id,
        is_featured: true,
        server_seed_hash: hash_seed(&server_seed),
        server_seed,
        client_seed: format!("season-{}-w{}-playoff", season.season_number, week),
    }
}

fn playoff_game_type(week: u8) -> GameType {
    match week {
        w if w == schedule::REGULAR_SEASON_WEEKS + 1 => GameType::WildCard,
        w if w == schedule::REGULAR_SEASON_WEEKS + 2 => GameType::Divisional,
        w if w == schedule::REGULAR_SEASON_WEEKS + 3 => GameType::Conference,
        _ => GameType::SuperBowl,
    }
}

/// Re-seeds and schedules the next playoff round from the prior round's
/// winners. Returns `None` once only the Super Bowl remains to be played
/// (no further round to generate).
async fn generate_next_playoff_round(store: &Store, season: &crate::season::Season) -> Result<Option<TickOutcome>, AppError> {
    let pool = store.pool();
    let prior_week = season.current_week;
    let prior_games = games::list_by_week(pool, season.id, prior_week).await?;
    if prior_games.len() <= 1 {
        return Ok(None);
    }

    let teams = teams::list(pool).await?;
    let team_index = |id: Uuid| teams.iter().position(|t| t.id == id).unwrap();
    let standings_rows = standings::list_for_season(pool, season.id).await?;
    let seed_of = |id: Uuid| standings_rows.iter().find(|s| s.team_id == id).and_then(|s| s.playoff_seed);

    let mut winners = Vec::new();
    let mut played_team_ids = std::collections::HashSet::new();
    for game in &prior_games {
        let winner_id = if game.home_score >= game.away_score { game.home_team_id } else { game.away_team_id };
        played_team_ids.insert(game.home_team_id);
        played_team_ids.insert(game.away_team_id);
        let seed = seed_of(winner_id).ok_or_else(|| AppError::InvalidState("winner has no playoff seed".to_string()))?;
        winners.push(playoffs::PlayoffTeam { team_index: team_index(winner_id), seed });
    }

    // The wild-card round byes each conference's 1-seed; it never appears
    // in that week's games, so it has to be added back in by hand before
    // the divisional round is reseeded.
    let was_wild_card_round = matches!(prior_games[0].game_type, GameType::WildCard);
    if was_wild_card_round {
        for one_seed in standings_rows.iter().filter(|s| s.playoff_seed == Some(1)) {
            if !played_team_ids.contains(&one_seed.team_id) {
                winners.push(playoffs::PlayoffTeam { team_index: team_index(one_seed.team_id), seed: 1 });
            }
        }
    }

    let new_week = prior_week + 1;
    let afc_winners: Vec<playoffs::PlayoffTeam> =
        winners.iter().copied().filter(|w| teams[w.team_index].conference == crate::team::Conference::Afc).collect();
    let nfc_winners: Vec<playoffs::PlayoffTeam> =
        winners.iter().copied().filter(|w| teams[w.team_index].conference == crate::team::Conference::Nfc).collect();

    let mut new_games = Vec::new();
    if afc_winners.len() == 1 && nfc_winners.len() == 1 {
        // Both conference championships are settled: the Super Bowl pairs
        // the two conference champions directly, better seed at home.
        let (home, away) = if afc_winners[0].seed <= nfc_winners[0].seed {
            (afc_winners[0], nfc_winners[0])
        } else {
            (nfc_winners[0], afc_winners[0])
        };
        new_games.push(matchup_to_new_game(
            season,
            new_week,
            &playoffs::PlayoffMatchup { home_team_index: home.team_index, away_team_index: away.team_index },
            &teams,
        ));
    } else {
        for conf_winners in [&afc_winners, &nfc_winners] {
            for matchup in playoffs::reseed_round(conf_winners) {
                new_games.push(matchup_to_new_game(season, new_week, &matchup, &teams));
            }
        }
    }

    games::create_batch(pool, &new_games).await?;
    seasons::advance_week_cas(pool, season.id, prior_week, new_week).await?;

    Ok(Some(TickOutcome::GeneratedPlayoffs { week: new_week }))
}

async fn set_offseason(store: &Store, config: &SeasonConfig, season: &crate::season::Season) -> Result<bool, AppError> {
    let pool = store.pool();
    let super_bowl = games::list_by_week(pool, season.id, season.current_week).await?;
    let Some(game) = super_bowl.first() else { return Ok(false) };
    let Some(completed_at) = game.completed_at else { return Ok(false) };

    if now() < completed_at + config.offseason_gap_secs {
        return Ok(false);
    }

    Ok(seasons::set_status_cas(pool, season.id, SeasonStatus::Playoffs, SeasonStatus::Offseason).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SeasonConfig {
        SeasonConfig {
            inter_game_gap_secs: 0,
            inter_week_gap_secs: 0,
            offseason_gap_secs: 0,
            action_timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn first_tick_on_empty_league_creates_season_one_with_full_schedule() {
        let store = Store::connect_in_memory().await;
        let lock = Arc::new(TickLock::new());

        let outcome = tick(&store, &config(), &lock).await.unwrap();
        assert!(matches!(outcome, TickOutcome::CreatedSeason { season_number: 1 }));

        let season = seasons::latest(store.pool()).await.unwrap().unwrap();
        let week1 = games::list_by_week(store.pool(), season.id, 1).await.unwrap();
        assert!(!week1.is_empty());

        let standings_rows = standings::list_for_season(store.pool(), season.id).await.unwrap();
        assert_eq!(standings_rows.len(), 32);
        assert!(standings_rows.iter().all(|s| s.wins == 0 && s.losses == 0 && s.ties == 0));
    }

    #[tokio::test]
    async fn second_tick_starts_a_scheduled_game() {
        let store = Store::connect_in_memory().await;
        let lock = Arc::new(TickLock::new());

        tick(&store, &config(), &lock).await.unwrap();
        let outcome = tick(&store, &config(), &lock).await.unwrap();
        assert!(matches!(outcome, TickOutcome::StartedGame { .. }));

        let season = seasons::latest(store.pool()).await.unwrap().unwrap();
        let game = games::find_broadcasting(store.pool(), season.id).await.unwrap().unwrap();
        assert!(game.total_plays >= 100 && game.total_plays <= 260);
    }

    #[tokio::test]
    async fn concurrent_ticks_serialize_through_the_lock() {
        let store = Store::connect_in_memory().await;
        let lock = Arc::new(TickLock::new());

        let (a, b) = tokio::join!(tick(&store, &config(), &lock), tick(&store, &config(), &lock));
        let outcomes = [a.unwrap(), b.unwrap()];
        assert!(outcomes.iter().any(|o| matches!(o, TickOutcome::CreatedSeason { .. })));
    }
}
