//! Anonymous account routes.

use crate::handlers::account::{login, register};
use crate::state::AppState;
use axum::{routing::post, Router};

pub fn account_routes(state: AppState) -> Router {
    Router::new()
        .route("/registro", post(register))
        .route("/login", post(login))
        .with_state(state)
}
