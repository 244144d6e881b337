//! Router assembly: supplier, account and common routes plus the tower-http stack.

mod account;
mod common;
mod supplier;

pub use account::account_routes;
pub use common::common_routes;
pub use supplier::supplier_routes;

use crate::config::ServerSettings;
use crate::openapi::docs_routes;
use crate::state::AppState;
use axum::Router;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

/// Request bodies larger than this are refused with 413.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// The complete application router.
pub fn app(state: AppState, server: &ServerSettings) -> Router {
    let mut router = Router::new()
        .merge(common_routes(state.clone()))
        .merge(account_routes(state.clone()))
        .merge(supplier_routes(state));
    if server.enable_docs {
        router = router.merge(docs_routes());
    }
    router
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(server.request_timeout))
        .layer(TraceLayer::new_for_http())
}
