//! HTTP handlers, grounded on `mock/handler.rs`'s shape: `State<Arc<AppState>>`
//! plus an auth extractor, a `#[utoipa::path(...)]` annotation, and a
//! `Result<Json<T>, AppError>` return.

pub mod game;
pub mod simulate;
