use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// Application error types, matching the error kinds named in the core
/// error handling design: `NotFound`, `InvalidState`, `SeedMismatch`,
/// `TransportClosed`, `PersistenceFailure`, `Timeout`, plus the auth
/// rejections the bearer-token extractor produces.
#[derive(Debug)]
pub enum AppError {
    /// Game, season, or team does not exist.
    NotFound(String),
    /// Operation attempted against an entity in the wrong status.
    InvalidState(String),
    /// Committed hash does not match a revealed seed.
    SeedMismatch,
    /// SSE peer disconnected or the stream controller already closed.
    TransportClosed,
    /// The store rejected a write; the calling action's transaction was
    /// rolled back untouched.
    PersistenceFailure(String),
    /// A `tick` action exceeded its configured budget.
    Timeout,
    /// Missing `Authorization` header on a bearer-gated route.
    MissingAuth,
    /// `Authorization` header present but does not match the cron secret.
    Unauthorized,
    /// Malformed path or query parameter.
    BadRequest(String),
}

/// Error response body
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "unauthorized")
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::NotFound(what) => (
                StatusCode::NOT_FOUND,
                "not_found".to_string(),
                what,
            ),
            AppError::InvalidState(msg) => (
                StatusCode::CONFLICT,
                "invalid_state".to_string(),
                msg,
            ),
            AppError::SeedMismatch => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "seed_mismatch".to_string(),
                "Revealed server seed does not match the committed hash".to_string(),
            ),
            AppError::TransportClosed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "transport_closed".to_string(),
                "Stream already closed".to_string(),
            ),
            AppError::PersistenceFailure(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "persistence_failure".to_string(),
                msg,
            ),
            AppError::Timeout => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "timeout".to_string(),
                "Action exceeded its time budget".to_string(),
            ),
            AppError::MissingAuth => (
                StatusCode::UNAUTHORIZED,
                "missing_auth".to_string(),
                "Authorization: Bearer <cronSecret> header is required".to_string(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized".to_string(),
                "Invalid cron secret".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request".to_string(), msg),
        };

        tracing::debug!(error = %error, message = %message, "request failed");

        let body = ErrorResponse { error, message };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
            other => AppError::PersistenceFailure(other.to_string()),
        }
    }
}
