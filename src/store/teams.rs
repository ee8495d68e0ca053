//! Static team rows, seeded once at league bootstrap from
//! [`crate::team::NFL_TEAMS`] (`spec.md` §3; grounded on `mock/teams.rs`'s
//! `NFL_TEAMS` constant, extended with the ratings/play-style fields here).

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::team::{Color, Conference, Division, PlayStyle, Team, NFL_TEAMS};

#[derive(sqlx::FromRow)]
struct TeamRow {
    id: String,
    abbreviation: String,
    city: String,
    mascot: String,
    conference: Conference,
    division: Division,
    offense: i64,
    defense: i64,
    special_teams: i64,
    play_style: PlayStyle,
    primary_color: String,
    secondary_color: String,
}

impl TeamRow {
    fn into_team(self) -> Team {
        Team {
            id: Uuid::parse_str(&self.id).expect("team id column is a valid uuid"),
            abbreviation: self.abbreviation,
            city: self.city,
            mascot: self.mascot,
            conference: self.conference,
            division: self.division,
            offense: self.offense as u8,
            defense: self.defense as u8,
            special_teams: self.special_teams as u8,
            play_style: self.play_style,
            primary_color: Color::from_hex(&self.primary_color).expect("stored hex color is valid"),
            secondary_color: Color::from_hex(&self.secondary_color).expect("stored hex color is valid"),
        }
    }
}

/// Seeds the `teams` table (and each team's roster) from [`NFL_TEAMS`] if
/// empty. Idempotent: a league that already has teams is left untouched.
pub async fn seed_if_empty(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM teams").fetch_one(pool).await?;
    if count.0 > 0 {
        return Ok(());
    }

    let mut team_ids = Vec::with_capacity(NFL_TEAMS.len());
    let mut tx = pool.begin().await?;
    for seed in NFL_TEAMS {
        let team = Team::from_seed(Uuid::new_v4(), seed);
        sqlx::query(
            r#"INSERT INTO teams
                (id, abbreviation, city, mascot, conference, division, offense, defense,
                 special_teams, play_style, primary_color, secondary_color)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(team.id.to_string())
        .bind(&team.abbreviation)
        .bind(&team.city)
        .bind(&team.mascot)
        .bind(team.conference)
        .bind(team.division)
        .bind(team.offense as i64)
        .bind(team.defense as i64)
        .bind(team.special_teams as i64)
        .bind(team.play_style)
        .bind(team.primary_color.to_hex())
        .bind(team.secondary_color.to_hex())
        .execute(&mut *tx)
        .await?;
        team_ids.push(team.id);
    }
    tx.commit().await?;

    for team_id in team_ids {
        super::players::seed_roster_if_empty(pool, team_id).await?;
    }
    Ok(())
}

pub async fn list(pool: &SqlitePool) -> Result<Vec<Team>, sqlx::Error> {
    let rows: Vec<TeamRow> = sqlx::query_as("SELECT * FROM teams").fetch_all(pool).await?;
    Ok(rows.into_iter().map(TeamRow::into_team).collect())
}

pub async fn get(pool: &SqlitePool, id: Uuid) -> Result<Option<Team>, sqlx::Error> {
    let row: Option<TeamRow> =
        sqlx::query_as("SELECT * FROM teams WHERE id = ?").bind(id.to_string()).fetch_optional(pool).await?;
    Ok(row.map(TeamRow::into_team))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[tokio::test]
    async fn seeds_exactly_thirty_two_teams_once() {
        let store = Store::connect_in_memory().await;
        seed_if_empty(store.pool()).await.unwrap();
        seed_if_empty(store.pool()).await.unwrap();

        let teams = list(store.pool()).await.unwrap();
        assert_eq!(teams.len(), 32);
    }

    #[tokio::test]
    async fn round_trips_team_fields() {
        let store = Store::connect_in_memory().await;
        seed_if_empty(store.pool()).await.unwrap();

        let teams = list(store.pool()).await.unwrap();
        let bills = teams.iter().find(|t| t.abbreviation == "BUF").unwrap();
        assert_eq!(bills.city, "Buffalo");
        assert_eq!(bills.conference, Conference::Afc);

        let fetched = get(store.pool(), bills.id).await.unwrap().unwrap();
        assert_eq!(fetched.abbreviation, "BUF");
    }
}
