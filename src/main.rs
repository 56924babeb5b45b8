//! Server: connects the store, ensures the schema, mounts all routes and serves until signalled.

use devhub::{app, ensure_schema, shutdown::shutdown_signal, AppState, PgStore, Settings};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::from_env()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("devhub=info")),
        )
        .init();

    let store = PgStore::connect(&settings.database_url, settings.max_connections).await?;
    ensure_schema(store.pool()).await?;
    tracing::info!("database ready");

    let state = AppState::new(store.clone());
    let router = app(state, settings.body_limit_bytes);

    let listener = TcpListener::bind(settings.bind_addr()).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("store closed");
    Ok(())
}
