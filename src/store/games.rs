//! Game rows. `tick` is the sole writer; every status transition is a
//! conditional `UPDATE ... WHERE status = ?` so two concurrent `tick`
//! invocations can't both start or finalize the same game.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::engine::BoxScore;
use crate::season::{Game, GameStatus, GameType};

#[derive(sqlx::FromRow)]
struct GameRow {
    id: String,
    season_id: String,
    week: i64,
    game_type: GameType,
    home_team_id: String,
    away_team_id: String,
    home_score: i64,
    away_score: i64,
    status: GameStatus,
    is_featured: i64,
    server_seed_hash: String,
    server_seed: Option<String>,
    client_seed: String,
    nonce: i64,
    total_plays: i64,
    box_score: Option<String>,
    broadcast_started_at: Option<i64>,
    completed_at: Option<i64>,
}

impl GameRow {
    fn into_game(self) -> Game {
        Game {
            id: Uuid::parse_str(&self.id).expect("game id column is a valid uuid"),
            season_id: Uuid::parse_str(&self.season_id).expect("season_id column is a valid uuid"),
            week: self.week as u8,
            game_type: self.game_type,
            home_team_id: Uuid::parse_str(&self.home_team_id).expect("home_team_id column is a valid uuid"),
            away_team_id: Uuid::parse_str(&self.away_team_id).expect("away_team_id column is a valid uuid"),
            home_score: self.home_score as u16,
            away_score: self.away_score as u16,
            status: self.status,
            is_featured: self.is_featured != 0,
            server_seed_hash: self.server_seed_hash,
            server_seed: self.server_seed,
            client_seed: self.client_seed,
            nonce: self.nonce as u64,
            total_plays: self.total_plays as u32,
            box_score: self.box_score.map(|s| serde_json::from_str(&s).expect("stored box_score is valid json")),
            broadcast_started_at: self.broadcast_started_at,
            completed_at: self.completed_at,
        }
    }
}

/// One game awaiting insertion, produced from a generated schedule entry
/// plus its freshly-minted seed triple.
pub struct NewGame {
    pub season_id: Uuid,
    pub week: u8,
    pub game_type: GameType,
    pub home_team_id: Uuid,
    pub away_team_id: Uuid,
    pub is_featured: bool,
    pub server_seed: String,
    pub server_seed_hash: String,
    pub client_seed: String,
}

/// Inserts a full week (or bracket round) of games in one transaction.
pub async fn create_batch(pool: &SqlitePool, games: &[NewGame]) -> Result<Vec<Uuid>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut ids = Vec::with_capacity(games.len());

    for game in games {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"INSERT INTO games
                (id, season_id, week, game_type, home_team_id, away_team_id, home_score, away_score,
                 status, is_featured, server_seed_hash, server_seed, client_seed, nonce, total_plays,
                 box_score, broadcast_started_at, completed_at)
               VALUES (?, ?, ?, ?, ?, ?, 0, 0, ?, ?, ?, ?, ?, 0, 0, NULL, NULL, NULL)"#,
        )
        .bind(id.to_string())
        .bind(game.season_id.to_string())
        .bind(game.week as i64)
        .bind(game.game_type)
        .bind(game.home_team_id.to_string())
        .bind(game.away_team_id.to_string())
        .bind(GameStatus::Scheduled)
        .bind(game.is_featured as i64)
        .bind(&game.server_seed_hash)
        .bind(&game.server_seed)
        .bind(&game.client_seed)
        .execute(&mut *tx)
        .await?;
        ids.push(id);
    }

    tx.commit().await?;
    Ok(ids)
}

pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<Option<Game>, sqlx::Error> {
    let row: Option<GameRow> =
        sqlx::query_as("SELECT * FROM games WHERE id = ?").bind(id.to_string()).fetch_optional(pool).await?;
    Ok(row.map(GameRow::into_game))
}

pub async fn list_by_week(pool: &SqlitePool, season_id: Uuid, week: u8) -> Result<Vec<Game>, sqlx::Error> {
    let rows: Vec<GameRow> = sqlx::query_as("SELECT * FROM games WHERE season_id = ? AND week = ? ORDER BY rowid")
        .bind(season_id.to_string())
        .bind(week as i64)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(GameRow::into_game).collect())
}

pub async fn find_broadcasting(pool: &SqlitePool, season_id: Uuid) -> Result<Option<Game>, sqlx::Error> {
    let row: Option<GameRow> = sqlx::query_as("SELECT * FROM games WHERE season_id = ? AND status = ? LIMIT 1")
        .bind(season_id.to_string())
        .bind(GameStatus::Broadcasting)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(GameRow::into_game))
}

/// The earliest not-yet-started game in `week`, in the order the schedule
/// was inserted — the deterministic tie-break `tick` step 5 needs.
pub async fn find_next_scheduled(pool: &SqlitePool, season_id: Uuid, week: u8) -> Result<Option<Game>, sqlx::Error> {
    let row: Option<GameRow> = sqlx::query_as(
        "SELECT * FROM games WHERE season_id = ? AND week = ? AND status = ? ORDER BY rowid LIMIT 1",
    )
    .bind(season_id.to_string())
    .bind(week as i64)
    .bind(GameStatus::Scheduled)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(GameRow::into_game))
}

pub async fn all_completed_in_week(pool: &SqlitePool, season_id: Uuid, week: u8) -> Result<bool, sqlx::Error> {
    let remaining: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM games WHERE season_id = ? AND week = ? AND status != ?",
    )
    .bind(season_id.to_string())
    .bind(week as i64)
    .bind(GameStatus::Completed)
    .fetch_one(pool)
    .await?;
    Ok(remaining.0 == 0)
}

/// Marks a `scheduled` game `broadcasting` and records the simulated
/// outcome in the same write, since the engine's run is CPU-bound and
/// completes synchronously within this `tick` action (`spec.md` §4.4, §5).
#[allow(clippy::too_many_arguments)]
pub async fn start_game_cas(
    pool: &SqlitePool,
    id: Uuid,
    broadcast_started_at: i64,
    home_score: u16,
    away_score: u16,
    final_nonce: u64,
    total_plays: u32,
    box_score: &BoxScore,
) -> Result<bool, sqlx::Error> {
    let box_score_json = serde_json::to_string(box_score).expect("BoxScore serializes");
    let result = sqlx::query(
        r#"UPDATE games
             SET status = ?, broadcast_started_at = ?, home_score = ?, away_score = ?,
                 nonce = ?, total_plays = ?, box_score = ?
           WHERE id = ? AND status = ?"#,
    )
    .bind(GameStatus::Broadcasting)
    .bind(broadcast_started_at)
    .bind(home_score as i64)
    .bind(away_score as i64)
    .bind(final_nonce as i64)
    .bind(total_plays as i64)
    .bind(box_score_json)
    .bind(id.to_string())
    .bind(GameStatus::Scheduled)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn finalize_cas(pool: &SqlitePool, id: Uuid, completed_at: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE games SET status = ?, completed_at = ? WHERE id = ? AND status = ?")
        .bind(GameStatus::Completed)
        .bind(completed_at)
        .bind(id.to_string())
        .bind(GameStatus::Broadcasting)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::hash_seed;
    use crate::store::{seasons, Store};

    async fn sample_game(store: &Store) -> Uuid {
        let season = seasons::create(store.pool(), 1, &"a".repeat(64)).await.unwrap();
        let home = Uuid::new_v4();
        let away = Uuid::new_v4();
        let server_seed = "b".repeat(64);
        let new_game = NewGame {
            season_id: season.id,
            week: 1,
            game_type: GameType::Regular,
            home_team_id: home,
            away_team_id: away,
            is_featured: true,
            server_seed_hash: hash_seed(&server_seed),
            server_seed,
            client_seed: "client".to_string(),
        };
        create_batch(store.pool(), &[new_game]).await.unwrap()[0]
    }

    #[tokio::test]
    async fn created_game_withholds_seed_only_through_public_projection() {
        let store = Store::connect_in_memory().await;
        let id = sample_game(&store).await;
        let game = get(store.pool(), id).await.unwrap().unwrap();
        assert!(matches!(game.status, GameStatus::Scheduled));
        assert!(game.server_seed.is_some());
        assert!(game.public().server_seed.is_none());
    }

    #[tokio::test]
    async fn start_then_finalize_cas_rejects_out_of_order_transitions() {
        let store = Store::connect_in_memory().await;
        let id = sample_game(&store).await;

        assert!(!finalize_cas(store.pool(), id, 1000).await.unwrap());

        let box_score = BoxScore::default();
        assert!(start_game_cas(store.pool(), id, 0, 24, 17, 400, 150, &box_score).await.unwrap());
        assert!(!start_game_cas(store.pool(), id, 0, 24, 17, 400, 150, &box_score).await.unwrap());

        assert!(finalize_cas(store.pool(), id, 1000).await.unwrap());
        let game = get(store.pool(), id).await.unwrap().unwrap();
        assert!(matches!(game.status, GameStatus::Completed));
        assert_eq!(game.completed_at, Some(1000));
    }
}
