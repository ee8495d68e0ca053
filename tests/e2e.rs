//! Cross-component scenarios that don't fit a single module's
//! `#[cfg(test)]` block: E4 exercises the store and the `tick` controller
//! together, E5 exercises the store and the broadcast module together.

use std::sync::Arc;

use gridblitz::broadcast::partition_events;
use gridblitz::config::SeasonConfig;
use gridblitz::season::tick::{tick, TickLock, TickOutcome};
use gridblitz::store::{events, games, seasons, standings, Store};

fn instant_config() -> SeasonConfig {
    SeasonConfig {
        inter_game_gap_secs: 0,
        inter_week_gap_secs: 0,
        offseason_gap_secs: 0,
        action_timeout_secs: 5,
    }
}

/// E4: ticking an empty league creates season 1 with a full 272-game,
/// 18-week regular season schedule and 32 standings rows, every one of
/// them at 0-0-0.
#[tokio::test]
async fn tick_on_empty_league_creates_full_season_one() {
    let store = Store::connect_in_memory().await;
    let lock = Arc::new(TickLock::new());

    let outcome = tick(&store, &instant_config(), &lock).await.unwrap();
    assert!(matches!(outcome, TickOutcome::CreatedSeason { season_number: 1 }));

    let season = seasons::latest(store.pool()).await.unwrap().unwrap();
    assert_eq!(season.current_week, 1);

    let mut total_games = 0usize;
    for week in 1..=18u8 {
        let week_games = games::list_by_week(store.pool(), season.id, week).await.unwrap();
        assert!(!week_games.is_empty(), "week {} has no games", week);
        total_games += week_games.len();
    }
    assert_eq!(total_games, 272);

    let standings_rows = standings::list_for_season(store.pool(), season.id).await.unwrap();
    assert_eq!(standings_rows.len(), 32);
    assert!(standings_rows.iter().all(|s| s.wins == 0 && s.losses == 0 && s.ties == 0));
}

/// E5: two viewers open the same game's stream at different points in its
/// broadcast. Together, the events each would have already received
/// (catchup) plus the events still ahead of them (future) account for
/// every event in the game exactly once, no matter when they joined.
#[tokio::test]
async fn viewers_joining_at_different_times_together_see_every_event() {
    let store = Store::connect_in_memory().await;
    let lock = Arc::new(TickLock::new());

    tick(&store, &instant_config(), &lock).await.unwrap(); // creates season 1
    let outcome = tick(&store, &instant_config(), &lock).await.unwrap(); // starts game 1
    let game_id = match outcome {
        TickOutcome::StartedGame { game_id } => game_id,
        other => panic!("expected StartedGame, got {:?}", other),
    };

    let game = games::get(store.pool(), game_id).await.unwrap().unwrap();

    let log = events::list(store.pool(), game_id).await.unwrap();
    assert_eq!(log.len(), game.total_plays as usize);

    // Viewer A joins the instant the broadcast starts; viewer B joins five
    // minutes in. Neither sees the game as already completed.
    let (early_catchup, early_future) = partition_events(log.clone(), 0, false);
    assert_eq!(early_catchup.len(), 0);
    assert_eq!(early_future.len(), log.len());

    let (late_catchup, late_future) = partition_events(log.clone(), 5 * 60 * 1000, false);
    assert_eq!(late_catchup.len() + late_future.len(), log.len());

    // Every event late-joining viewer B already missed is one viewer A
    // will have played out live by the time B catches up.
    assert!(late_catchup.iter().all(|e| early_future.iter().any(|f| f.event_number == e.event_number)));
}
