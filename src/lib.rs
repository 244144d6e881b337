//! Fornecedor API: supplier CRUD over PostgreSQL with JWT-authenticated routes.

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod store;

pub use auth::{build_token, IdentityService, DELETE_SUPPLIER_CLAIM};
pub use config::Settings;
pub use error::{AppError, ConfigError};
pub use routes::app;
pub use state::AppState;
pub use store::{
    ensure_database_exists, ensure_tables, MemorySupplierStore, MemoryUserStore, PgSupplierStore, PgUserStore,
    SupplierStore, UserStore,
};
