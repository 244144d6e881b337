//! Server entry point: load settings, prepare the database, serve the API.

use fornecedor_api::{app, ensure_database_exists, ensure_tables, AppState, PgSupplierStore, PgUserStore, Settings};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fornecedor_api=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;

    ensure_database_exists(&settings.database.url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;
    ensure_tables(&pool).await?;

    let state = AppState::new(
        Arc::new(PgSupplierStore::new(pool.clone())),
        Arc::new(PgUserStore::new(pool)),
        settings.jwt.clone(),
        settings.lockout,
    );
    let router = app(state, &settings.server);

    let listener = TcpListener::bind(settings.server.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutting down");
}
