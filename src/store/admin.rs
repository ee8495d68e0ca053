//! Administrative operations. `spec.md` §3/§6: the league is destroyed
//! "never, except an admin reset" — `reset_league` is that one escape
//! hatch. No HTTP route wires it (admin endpoints are out of scope for
//! the surface per §1); it exists and is tested so the door stays open.

use sqlx::SqlitePool;

/// Cascading delete of every row in the league. Table order matters only
/// for foreign-key-enforcing backends; SQLite's default pragma doesn't
/// enforce them, but the order is kept parent-to-child for clarity.
pub async fn reset_league(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM game_events").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM standings").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM games").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM seasons").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM teams").execute(&mut *tx).await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{seasons, teams, Store};

    #[tokio::test]
    async fn reset_league_clears_every_table() {
        let store = Store::connect_in_memory().await;
        teams::seed_if_empty(store.pool()).await.unwrap();
        seasons::create(store.pool(), 1, &"a".repeat(64)).await.unwrap();

        reset_league(store.pool()).await.unwrap();

        assert!(teams::list(store.pool()).await.unwrap().is_empty());
        assert!(seasons::latest(store.pool()).await.unwrap().is_none());
    }
}
