//! `POST /api/simulate` — the single action endpoint, gated behind the
//! cron bearer token (`spec.md` §6). Every call runs at most one `tick`
//! step; the response is the outcome's tag plus whatever identifiers it
//! carries.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::auth::BearerToken;
use crate::error::{AppError, ErrorResponse};
use crate::season::tick::{self, TickOutcome};
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/simulate",
    responses(
        (status = 200, description = "One tick action applied", body = TickOutcome),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 500, description = "Action failed or timed out", body = ErrorResponse),
    ),
    security(("cron_secret" = [])),
    tag = "simulate"
)]
pub async fn simulate(
    _token: BearerToken,
    State(state): State<Arc<AppState>>,
) -> Result<Json<TickOutcome>, AppError> {
    let outcome = tick::tick(&state.store, &state.config.season, &state.tick_lock).await?;
    Ok(Json(outcome))
}
