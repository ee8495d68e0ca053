//! Durable persistence, grounded on the teacher's repository pattern
//! (`mock/simulation/repository.rs`'s `GameRepository`: an `Arc`-guarded
//! handle, cheap to clone, carried through `AppState`) but backed by an
//! `sqlx::SqlitePool` instead of an in-memory map, since GridBlitz's data
//! model needs a durable ordered log surviving process restarts.

pub mod admin;
pub mod events;
pub mod games;
pub mod players;
pub mod seasons;
pub mod standings;
pub mod teams;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Cheap to clone (an `Arc` around the pool internally); carried through
/// `AppState` the same way the teacher carries its `EspnClient`.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().max_connections(5).connect_with(options).await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// In-memory store for tests, per `SPEC_FULL.md`'s test tooling note —
    /// avoids any file-system fixture. Gated behind `test-util` (rather
    /// than bare `#[cfg(test)]`) so integration tests under `tests/`,
    /// which link this crate as an ordinary dependency, can reach it too.
    #[cfg(any(test, feature = "test-util"))]
    pub async fn connect_in_memory() -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite connects");
        let store = Self { pool };
        store.migrate().await.expect("in-memory schema migrates");
        store
    }

    async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
