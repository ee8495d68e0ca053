//! Per-season standings. Recomputed incrementally (one row updated per
//! team per completed game) rather than derived from the event log on
//! every read, so `/api/game/current`-adjacent queries stay cheap.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::season::{Standings, Streak};
use crate::team::Division;

#[derive(sqlx::FromRow)]
struct StandingsRow {
    season_id: String,
    team_id: String,
    wins: i64,
    losses: i64,
    ties: i64,
    division_wins: i64,
    division_losses: i64,
    conference_wins: i64,
    conference_losses: i64,
    points_for: i64,
    points_against: i64,
    streak: Streak,
    streak_count: i64,
    playoff_seed: Option<i64>,
    clinched: i64,
}

impl StandingsRow {
    fn into_standings(self) -> Standings {
        Standings {
            season_id: Uuid::parse_str(&self.season_id).expect("season_id column is a valid uuid"),
            team_id: Uuid::parse_str(&self.team_id).expect("team_id column is a valid uuid"),
            wins: self.wins as u16,
            losses: self.losses as u16,
            ties: self.ties as u16,
            division_wins: self.division_wins as u16,
            division_losses: self.division_losses as u16,
            conference_wins: self.conference_wins as u16,
            conference_losses: self.conference_losses as u16,
            points_for: self.points_for as u32,
            points_against: self.points_against as u32,
            streak: self.streak,
            streak_count: self.streak_count as u16,
            playoff_seed: self.playoff_seed.map(|s| s as u8),
            clinched: self.clinched != 0,
        }
    }
}

/// Inserts a zeroed row per team, called once when a season is created.
pub async fn init_for_season(pool: &SqlitePool, season_id: Uuid, team_ids: &[Uuid]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for team_id in team_ids {
        sqlx::query(
            r#"INSERT INTO standings
                (season_id, team_id, wins, losses, ties, division_wins, division_losses,
                 conference_wins, conference_losses, points_for, points_against, streak,
                 streak_count, playoff_seed, clinched)
               VALUES (?, ?, 0, 0, 0, 0, 0, 0, 0, 0, 0, ?, 0, NULL, 0)"#,
        )
        .bind(season_id.to_string())
        .bind(team_id.to_string())
        .bind(Streak::None)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn list_for_season(pool: &SqlitePool, season_id: Uuid) -> Result<Vec<Standings>, sqlx::Error> {
    let rows: Vec<StandingsRow> =
        sqlx::query_as("SELECT * FROM standings WHERE season_id = ?").bind(season_id.to_string()).fetch_all(pool).await?;
    Ok(rows.into_iter().map(StandingsRow::into_standings).collect())
}

async fn get(pool: &SqlitePool, season_id: Uuid, team_id: Uuid) -> Result<Standings, sqlx::Error> {
    let row: StandingsRow = sqlx::query_as("SELECT * FROM standings WHERE season_id = ? AND team_id = ?")
        .bind(season_id.to_string())
        .bind(team_id.to_string())
        .fetch_one(pool)
        .await?;
    Ok(row.into_standings())
}

async fn save(pool: &SqlitePool, standings: &Standings) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"UPDATE standings
             SET wins = ?, losses = ?, ties = ?, division_wins = ?, division_losses = ?,
                 conference_wins = ?, conference_losses = ?, points_for = ?, points_against = ?,
                 streak = ?, streak_count = ?, playoff_seed = ?, clinched = ?
           WHERE season_id = ? AND team_id = ?"#,
    )
    .bind(standings.wins as i64)
    .bind(standings.losses as i64)
    .bind(standings.ties as i64)
    .bind(standings.division_wins as i64)
    .bind(standings.division_losses as i64)
    .bind(standings.conference_wins as i64)
    .bind(standings.conference_losses as i64)
    .bind(standings.points_for as i64)
    .bind(standings.points_against as i64)
    .bind(standings.streak)
    .bind(standings.streak_count as i64)
    .bind(standings.playoff_seed.map(|s| s as i64))
    .bind(standings.clinched as i64)
    .bind(standings.season_id.to_string())
    .bind(standings.team_id.to_string())
    .execute(pool)
    .await?;
    Ok(())
}

/// Applies one completed game's result to both teams' rows. Called once
/// per finalized game, inside the same CAS-guarded transition that marks
/// the game `completed` — there is no concurrent writer to race against.
pub async fn apply_game_result(
    pool: &SqlitePool,
    season_id: Uuid,
    home_team_id: Uuid,
    away_team_id: Uuid,
    home_score: u16,
    away_score: u16,
    is_division: bool,
    is_conference: bool,
) -> Result<(), sqlx::Error> {
    let mut home = get(pool, season_id, home_team_id).await?;
    home.apply_result(home_score, away_score, is_division, is_conference);
    save(pool, &home).await?;

    let mut away = get(pool, season_id, away_team_id).await?;
    away.apply_result(away_score, home_score, is_division, is_conference);
    save(pool, &away).await?;

    Ok(())
}

/// Ranks two standings rows the same way regardless of which bracket
/// they're being compared within: win percentage first, point
/// differential to break ties — a simplified stand-in for the NFL's full
/// tiebreaker procedure, which `spec.md` §4.2 does not fully specify;
/// recorded as an open-question resolution in DESIGN.md.
fn tiebreak_order(a: &Standings, b: &Standings) -> std::cmp::Ordering {
    b.win_pct()
        .partial_cmp(&a.win_pct())
        .unwrap()
        .then((b.points_for as i32 - b.points_against as i32).cmp(&(a.points_for as i32 - a.points_against as i32)))
}

/// Assigns playoff seeds for one conference: each division's leader takes
/// seeds 1-4 (ranked against each other by [`tiebreak_order`]), then the
/// best three of the remaining twelve teams take seeds 5-7, matching
/// `spec.md` §4.2's "four division winners 1-4, three wild cards 5-7."
/// The rest of the conference fills out 8-16 in the same tiebreak order,
/// though nothing downstream reads past seed 7. Returns team IDs in seed
/// order; `conference_teams` need not be sorted.
pub async fn assign_playoff_seeds(
    pool: &SqlitePool,
    season_id: Uuid,
    conference_teams: &[(Uuid, Division)],
) -> Result<Vec<Uuid>, sqlx::Error> {
    let mut rows = Vec::with_capacity(conference_teams.len());
    for &(team_id, division) in conference_teams {
        rows.push((division, get(pool, season_id, team_id).await?));
    }

    let mut division_winners = Vec::with_capacity(4);
    let mut rest = Vec::new();
    for division in [Division::North, Division::South, Division::East, Division::West] {
        let mut members: Vec<Standings> = rows.iter().filter(|(d, _)| *d == division).map(|(_, s)| *s).collect();
        members.sort_by(tiebreak_order);
        let mut members = members.into_iter();
        if let Some(winner) = members.next() {
            division_winners.push(winner);
        }
        rest.extend(members);
    }
    division_winners.sort_by(tiebreak_order);
    rest.sort_by(tiebreak_order);

    let seeded: Vec<Standings> = division_winners.into_iter().chain(rest).collect();

    let mut ordered = Vec::with_capacity(seeded.len());
    for (i, mut standings) in seeded.into_iter().enumerate() {
        standings.playoff_seed = Some((i + 1) as u8);
        ordered.push(standings.team_id);
        save(pool, &standings).await?;
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[tokio::test]
    async fn apply_game_result_updates_both_sides() {
        let store = Store::connect_in_memory().await;
        let season_id = Uuid::new_v4();
        let home = Uuid::new_v4();
        let away = Uuid::new_v4();
        init_for_season(store.pool(), season_id, &[home, away]).await.unwrap();

        apply_game_result(store.pool(), season_id, home, away, 24, 17, true, true).await.unwrap();

        let home_standings = get(store.pool(), season_id, home).await.unwrap();
        let away_standings = get(store.pool(), season_id, away).await.unwrap();
        assert_eq!(home_standings.wins, 1);
        assert_eq!(away_standings.losses, 1);
        assert_eq!(home_standings.points_for, 24);
        assert_eq!(away_standings.points_against, 24);
    }

    #[tokio::test]
    async fn assign_playoff_seeds_orders_by_win_percentage() {
        let store = Store::connect_in_memory().await;
        let season_id = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        init_for_season(store.pool(), season_id, &[a, b]).await.unwrap();

        apply_game_result(store.pool(), season_id, a, b, 30, 10, false, true).await.unwrap();

        let teams = [(a, Division::North), (b, Division::South)];
        let seeded = assign_playoff_seeds(store.pool(), season_id, &teams).await.unwrap();
        assert_eq!(seeded[0], a);
        assert_eq!(seeded[1], b);
    }

    /// A wild-card team with a better record than a division winner still
    /// seeds behind every division winner, per `spec.md` §4.2.
    #[tokio::test]
    async fn division_winners_always_outseed_wild_cards() {
        let store = Store::connect_in_memory().await;
        let season_id = Uuid::new_v4();

        let e = Uuid::new_v4(); // North winner, 1-1 (.500)
        let f = Uuid::new_v4(); // North also-ran, 0-2
        let g = Uuid::new_v4(); // South wild card, 2-1 (.667) — beats e's record
        let h = Uuid::new_v4(); // South winner, 1-0 (1.000)

        init_for_season(store.pool(), season_id, &[e, f, g, h]).await.unwrap();

        apply_game_result(store.pool(), season_id, h, g, 30, 0, true, true).await.unwrap();
        apply_game_result(store.pool(), season_id, e, f, 20, 10, true, true).await.unwrap();
        apply_game_result(store.pool(), season_id, g, e, 25, 0, false, false).await.unwrap();
        apply_game_result(store.pool(), season_id, g, f, 15, 0, false, false).await.unwrap();

        let teams = [(e, Division::North), (f, Division::North), (g, Division::South), (h, Division::South)];
        let seeded = assign_playoff_seeds(store.pool(), season_id, &teams).await.unwrap();

        let division_winners = [h, e];
        assert!(division_winners.contains(&seeded[0]));
        assert!(division_winners.contains(&seeded[1]));
        assert_eq!(seeded[2], g, "g has a better record than e but isn't a division winner");
        assert_eq!(seeded[3], f);
    }
}
