use std::sync::Arc;

use gridblitz::config::AppConfig;
use gridblitz::season::tick::TickLock;
use gridblitz::store::Store;
use gridblitz::{build_router, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::load();
    let bind_address = config.bind_address();

    let store = Store::connect(&config.database_url).await.expect("failed to connect to database");

    let app_state = Arc::new(AppState {
        store,
        config,
        tick_lock: Arc::new(TickLock::new()),
    });

    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();
    tracing::info!("Server running on http://{}", bind_address);
    axum::serve(listener, app).await.unwrap();
}
