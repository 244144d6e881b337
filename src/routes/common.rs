//! Operational routes: liveness, readiness and build version. None require a token.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::time::Instant;

#[derive(Serialize)]
struct Probe {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    database: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    elapsed_ms: Option<u128>,
}

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
}

async fn health() -> Json<Probe> {
    Json(Probe {
        status: "ok",
        database: None,
        elapsed_ms: None,
    })
}

/// 200 when the supplier store answers, 503 otherwise.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<Probe>) {
    let started = Instant::now();
    let outcome = state.suppliers.ping().await;
    let elapsed_ms = Some(started.elapsed().as_millis());
    match outcome {
        Ok(()) => (
            StatusCode::OK,
            Json(Probe {
                status: "ok",
                database: Some("ok"),
                elapsed_ms,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Probe {
                    status: "degraded",
                    database: Some("unavailable"),
                    elapsed_ms,
                }),
            )
        }
    }
}

async fn version() -> Json<VersionInfo> {
    Json(VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
