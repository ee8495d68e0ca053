//! `GET /api/game/{gameId}`, `GET /api/game/current` (`spec.md` §6). The
//! SSE stream itself lives in [`crate::broadcast`]; this module only
//! covers the two plain-JSON reads.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{AppError, ErrorResponse};
use crate::season::{Game, PublicGame, SeasonStatus};
use crate::store::games;
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct WeekProgress {
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentGameResponse {
    pub current_game: Option<PublicGame>,
    pub next_game: Option<PublicGame>,
    pub season_status: Option<SeasonStatus>,
    pub current_week: Option<u8>,
    pub season_number: Option<u32>,
    pub week_progress: Option<WeekProgress>,
}

#[utoipa::path(
    get,
    path = "/api/game/{game_id}",
    params(("game_id" = Uuid, Path, description = "Game to fetch")),
    responses(
        (status = 200, description = "Game record; serverSeed/scores hidden until completed", body = PublicGame),
        (status = 404, description = "No such game", body = ErrorResponse),
    ),
    tag = "game"
)]
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<Uuid>,
) -> Result<Json<PublicGame>, AppError> {
    let game = games::get(state.store.pool(), game_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("game {}", game_id)))?;
    Ok(Json(game.public()))
}

#[utoipa::path(
    get,
    path = "/api/game/current",
    responses((status = 200, description = "Current broadcast state", body = CurrentGameResponse)),
    tag = "game"
)]
pub async fn get_current_game(State(state): State<Arc<AppState>>) -> Result<Json<CurrentGameResponse>, AppError> {
    let pool = state.store.pool();

    let Some(season) = crate::store::seasons::latest(pool).await? else {
        return Ok(Json(CurrentGameResponse {
            current_game: None,
            next_game: None,
            season_status: None,
            current_week: None,
            season_number: None,
            week_progress: None,
        }));
    };

    let current_game = games::find_broadcasting(pool, season.id).await?;
    let next_game = games::find_next_scheduled(pool, season.id, season.current_week).await?;
    let week_games = games::list_by_week(pool, season.id, season.current_week).await?;
    let completed = week_games
        .iter()
        .filter(|g| matches!(g.status, crate::season::GameStatus::Completed))
        .count();

    Ok(Json(CurrentGameResponse {
        current_game: current_game.map(Game::public),
        next_game: next_game.map(Game::public),
        season_status: Some(season.status),
        current_week: Some(season.current_week),
        season_number: Some(season.season_number),
        week_progress: Some(WeekProgress { completed, total: week_games.len() }),
    }))
}
