use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use std::sync::Arc;

use crate::AppState;
use crate::error::AppError;

/// Bearer-token extractor that validates `Authorization: Bearer <cronSecret>`
/// against the configured cron secret. Used to gate `/api/simulate`, the
/// single action endpoint that advances league state.
pub struct BearerToken;

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::MissingAuth)?;

        let token = header.strip_prefix("Bearer ").ok_or(AppError::MissingAuth)?;

        if token == app_state.config.cron_secret {
            Ok(BearerToken)
        } else {
            Err(AppError::Unauthorized)
        }
    }
}
