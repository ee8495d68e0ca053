//! Player rows. Rosters are generated once per team at league bootstrap
//! (deterministically, from the team id) and never regenerated per game —
//! `engine::simulate` reads the same persisted roster every time a team
//! plays, the way a real roster persists game to game.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::rng::GameRng;
use crate::team::{generate_roster, Player, Position};

#[derive(sqlx::FromRow)]
struct PlayerRow {
    id: String,
    team_id: String,
    name: String,
    position: Position,
    jersey_number: i64,
    rating: i64,
    speed: i64,
    strength: i64,
    awareness: i64,
    clutch_rating: i64,
    injury_prone: i64,
}

impl PlayerRow {
    fn into_player(self) -> Player {
        Player {
            id: Uuid::parse_str(&self.id).expect("player id column is a valid uuid"),
            team_id: Uuid::parse_str(&self.team_id).expect("team_id column is a valid uuid"),
            name: self.name,
            position: self.position,
            jersey_number: self.jersey_number as u8,
            rating: self.rating as u8,
            speed: self.speed as u8,
            strength: self.strength as u8,
            awareness: self.awareness as u8,
            clutch_rating: self.clutch_rating as u8,
            injury_prone: self.injury_prone != 0,
        }
    }
}

/// Seeds a roster for `team_id` if it does not already have one. The
/// generator is seeded from the team id itself, so re-running bootstrap
/// against an already-populated team is a no-op rather than a duplicate
/// roster.
pub async fn seed_roster_if_empty(pool: &SqlitePool, team_id: Uuid) -> Result<(), sqlx::Error> {
    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM players WHERE team_id = ?").bind(team_id.to_string()).fetch_one(pool).await?;
    if count.0 > 0 {
        return Ok(());
    }

    let mut rng = GameRng::new(team_id.to_string(), "roster-bootstrap", 0);
    let roster = generate_roster(&mut rng, team_id);

    let mut tx = pool.begin().await?;
    for player in &roster {
        sqlx::query(
            r#"INSERT INTO players
                (id, team_id, name, position, jersey_number, rating, speed, strength,
                 awareness, clutch_rating, injury_prone)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(player.id.to_string())
        .bind(player.team_id.to_string())
        .bind(&player.name)
        .bind(player.position)
        .bind(player.jersey_number as i64)
        .bind(player.rating as i64)
        .bind(player.speed as i64)
        .bind(player.strength as i64)
        .bind(player.awareness as i64)
        .bind(player.clutch_rating as i64)
        .bind(player.injury_prone as i64)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn roster_for_team(pool: &SqlitePool, team_id: Uuid) -> Result<Vec<Player>, sqlx::Error> {
    let rows: Vec<PlayerRow> =
        sqlx::query_as("SELECT * FROM players WHERE team_id = ?").bind(team_id.to_string()).fetch_all(pool).await?;
    Ok(rows.into_iter().map(PlayerRow::into_player).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[tokio::test]
    async fn seeds_roster_once_and_is_idempotent() {
        let store = Store::connect_in_memory().await;
        let team_id = Uuid::new_v4();
        seed_roster_if_empty(store.pool(), team_id).await.unwrap();
        seed_roster_if_empty(store.pool(), team_id).await.unwrap();

        let roster = roster_for_team(store.pool(), team_id).await.unwrap();
        assert!(roster.len() >= 26);
        assert!(roster.iter().any(|p| p.position == Position::Qb));
    }
}
