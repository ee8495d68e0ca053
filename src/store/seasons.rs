//! Season rows. `tick` is the sole mutator; every write here is a
//! conditional `UPDATE ... WHERE status = ?` / `WHERE current_week = ?`
//! so concurrent invocations of `tick` cannot double-apply a transition
//! (`spec.md` §4.6, §9's "idempotent tick via conditional updates").

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::season::{Season, SeasonStatus, TOTAL_WEEKS};

#[derive(sqlx::FromRow)]
struct SeasonRow {
    id: String,
    season_number: i64,
    current_week: i64,
    total_weeks: i64,
    status: SeasonStatus,
    master_seed: String,
}

impl SeasonRow {
    fn into_season(self) -> Season {
        Season {
            id: Uuid::parse_str(&self.id).expect("season id column is a valid uuid"),
            season_number: self.season_number as u32,
            current_week: self.current_week as u8,
            total_weeks: self.total_weeks as u8,
            status: self.status,
            master_seed: self.master_seed,
        }
    }
}

pub async fn create(pool: &SqlitePool, season_number: u32, master_seed: &str) -> Result<Season, sqlx::Error> {
    let season = Season {
        id: Uuid::new_v4(),
        season_number,
        current_week: 1,
        total_weeks: TOTAL_WEEKS,
        status: SeasonStatus::Active,
        master_seed: master_seed.to_string(),
    };

    sqlx::query(
        r#"INSERT INTO seasons (id, season_number, current_week, total_weeks, status, master_seed)
           VALUES (?, ?, ?, ?, ?, ?)"#,
    )
    .bind(season.id.to_string())
    .bind(season.season_number as i64)
    .bind(season.current_week as i64)
    .bind(season.total_weeks as i64)
    .bind(season.status)
    .bind(&season.master_seed)
    .execute(pool)
    .await?;

    Ok(season)
}

/// The most recently created season, regardless of status — `tick` uses
/// this to decide whether a brand new season is needed.
pub async fn latest(pool: &SqlitePool) -> Result<Option<Season>, sqlx::Error> {
    let row: Option<SeasonRow> =
        sqlx::query_as("SELECT * FROM seasons ORDER BY season_number DESC LIMIT 1").fetch_optional(pool).await?;
    Ok(row.map(SeasonRow::into_season))
}

pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<Option<Season>, sqlx::Error> {
    let row: Option<SeasonRow> =
        sqlx::query_as("SELECT * FROM seasons WHERE id = ?").bind(id.to_string()).fetch_optional(pool).await?;
    Ok(row.map(SeasonRow::into_season))
}

/// Conditionally advances `current_week`, only applying the write if the
/// row is still at `expected_week` — the compare-and-set `spec.md` §9
/// asks for instead of read-then-write.
pub async fn advance_week_cas(
    pool: &SqlitePool,
    id: Uuid,
    expected_week: u8,
    new_week: u8,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE seasons SET current_week = ? WHERE id = ? AND current_week = ?")
        .bind(new_week as i64)
        .bind(id.to_string())
        .bind(expected_week as i64)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn set_status_cas(
    pool: &SqlitePool,
    id: Uuid,
    expected: SeasonStatus,
    new_status: SeasonStatus,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE seasons SET status = ? WHERE id = ? AND status = ?")
        .bind(new_status)
        .bind(id.to_string())
        .bind(expected)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[tokio::test]
    async fn create_then_fetch_round_trips() {
        let store = Store::connect_in_memory().await;
        let season = create(store.pool(), 1, &"a".repeat(64)).await.unwrap();
        let fetched = get(store.pool(), season.id).await.unwrap().unwrap();
        assert_eq!(fetched.season_number, 1);
        assert_eq!(fetched.current_week, 1);
        assert!(matches!(fetched.status, SeasonStatus::Active));
    }

    #[tokio::test]
    async fn advance_week_cas_rejects_stale_expectation() {
        let store = Store::connect_in_memory().await;
        let season = create(store.pool(), 1, &"a".repeat(64)).await.unwrap();

        assert!(!advance_week_cas(store.pool(), season.id, 5, 6).await.unwrap());
        assert!(advance_week_cas(store.pool(), season.id, 1, 2).await.unwrap());

        let fetched = get(store.pool(), season.id).await.unwrap().unwrap();
        assert_eq!(fetched.current_week, 2);
    }

    #[tokio::test]
    async fn status_cas_is_one_shot_under_race() {
        let store = Store::connect_in_memory().await;
        let season = create(store.pool(), 1, &"a".repeat(64)).await.unwrap();

        let a = set_status_cas(store.pool(), season.id, SeasonStatus::Active, SeasonStatus::Playoffs).await.unwrap();
        let b = set_status_cas(store.pool(), season.id, SeasonStatus::Active, SeasonStatus::Playoffs).await.unwrap();
        assert!(a);
        assert!(!b);
    }
}
