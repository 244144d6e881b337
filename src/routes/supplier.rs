//! Supplier routes. Every route requires a bearer token; delete also requires the delete claim.

use crate::handlers::supplier::{create, delete, get_by_key, list_active, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn supplier_routes(state: AppState) -> Router {
    Router::new()
        .route("/fornecedor", get(list_active).post(create))
        .route("/fornecedor/:key", get(get_by_key).put(update).delete(delete))
        .with_state(state)
}
