//! Append-only event log. `spec.md` §4.7: `appendEvents` batches
//! internally (chunked, 50 per insert), `listEvents` ordered by
//! `eventNumber` ascending, unique `(game_id, event_number)`. No update,
//! no delete.

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::engine::GameEvent;
use crate::engine::events::Commentary;
use crate::engine::narrative::NarrativeSnapshot;
use crate::engine::state::GameState;

const CHUNK_SIZE: usize = 50;

#[derive(sqlx::FromRow)]
struct EventRow {
    game_id: String,
    event_number: i64,
    play_result: String,
    commentary: String,
    game_state: String,
    narrative_context: Option<String>,
    display_timestamp: i64,
}

impl EventRow {
    fn into_event(self) -> GameEvent {
        GameEvent {
            game_id: Uuid::parse_str(&self.game_id).expect("game_id column is a valid uuid"),
            event_number: self.event_number as u32,
            play_result: serde_json::from_str(&self.play_result).expect("stored play_result is valid json"),
            commentary: serde_json::from_str::<Commentary>(&self.commentary).expect("stored commentary is valid json"),
            game_state: serde_json::from_str::<GameState>(&self.game_state).expect("stored game_state is valid json"),
            narrative_context: self
                .narrative_context
                .map(|s| serde_json::from_str::<NarrativeSnapshot>(&s).expect("stored narrative_context is valid json")),
            display_timestamp: self.display_timestamp as u64,
        }
    }
}

/// Appends `events` for `game_id` in chunks of [`CHUNK_SIZE`], each chunk
/// its own transaction. Relies on the `(game_id, event_number)` primary
/// key to reject accidental duplicate appends.
pub async fn append(pool: &SqlitePool, events: &[GameEvent]) -> Result<(), sqlx::Error> {
    for chunk in events.chunks(CHUNK_SIZE) {
        let mut tx = pool.begin().await?;
        for event in chunk {
            let play_result = serde_json::to_string(&event.play_result).expect("PlayOutcome serializes");
            let commentary = serde_json::to_string(&event.commentary).expect("Commentary serializes");
            let game_state = serde_json::to_string(&event.game_state).expect("GameState serializes");
            let narrative_context = event
                .narrative_context
                .as_ref()
                .map(|n| serde_json::to_string(n).expect("NarrativeSnapshot serializes"));

            sqlx::query(
                r#"INSERT INTO game_events
                    (game_id, event_number, play_result, commentary, game_state, narrative_context, display_timestamp)
                   VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(event.game_id.to_string())
            .bind(event.event_number as i64)
            .bind(play_result)
            .bind(commentary)
            .bind(game_state)
            .bind(narrative_context)
            .bind(event.display_timestamp as i64)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
    }
    Ok(())
}

pub async fn list(pool: &SqlitePool, game_id: Uuid) -> Result<Vec<GameEvent>, sqlx::Error> {
    let rows: Vec<EventRow> =
        sqlx::query_as("SELECT * FROM game_events WHERE game_id = ? ORDER BY event_number ASC")
            .bind(game_id.to_string())
            .fetch_all(pool)
            .await?;
    Ok(rows.into_iter().map(EventRow::into_event).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::{pacing_floor_ms, commentary_for};
    use crate::play::{PlayOutcome, PlayType};
    use crate::store::Store;

    fn sample_outcome() -> PlayOutcome {
        PlayOutcome {
            play_type: PlayType::Run,
            yards_gained: 4,
            passer: None,
            rusher: Some("Test Back".to_string()),
            receiver: None,
            defender: None,
            scoring: None,
            turnover: None,
            penalty: None,
            injury: None,
            clock_elapsed: 6,
            is_clock_stopped: false,
            is_first_down: false,
            is_touchdown: false,
            is_safety: false,
            description: "Test Back runs for 4 yards".to_string(),
        }
    }

    fn sample_events(game_id: Uuid, count: u32) -> Vec<GameEvent> {
        (1..=count)
            .map(|n| {
                let outcome = sample_outcome();
                GameEvent {
                    game_id,
                    event_number: n,
                    commentary: commentary_for(&outcome, 0.0),
                    display_timestamp: pacing_floor_ms(&outcome) * n as u64,
                    play_result: outcome,
                    game_state: GameState::new(crate::play::Possession::Home),
                    narrative_context: None,
                }
            })
            .collect()
    }

    #[tokio::test]
    async fn appends_in_chunks_and_lists_in_order() {
        let store = Store::connect_in_memory().await;
        let game_id = Uuid::new_v4();
        let events = sample_events(game_id, 123);

        append(store.pool(), &events).await.unwrap();

        let listed = list(store.pool(), game_id).await.unwrap();
        assert_eq!(listed.len(), 123);
        for (i, event) in listed.iter().enumerate() {
            assert_eq!(event.event_number, (i + 1) as u32);
        }
    }

    #[tokio::test]
    async fn duplicate_event_number_is_rejected() {
        let store = Store::connect_in_memory().await;
        let game_id = Uuid::new_v4();
        let events = sample_events(game_id, 1);

        append(store.pool(), &events).await.unwrap();
        let result = append(store.pool(), &events).await;
        assert!(result.is_err());
    }
}
