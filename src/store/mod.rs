//! Persistence gateways for suppliers and identity users.
//!
//! Handlers only see the traits; `postgres` is the production backend and `memory`
//! backs tests and local runs without a database.

pub mod memory;
pub mod postgres;

use crate::error::AppError;
use crate::models::{Supplier, SupplierFields, User, UserClaim};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use memory::{MemorySupplierStore, MemoryUserStore};
pub use postgres::{ensure_database_exists, ensure_tables, PgSupplierStore, PgUserStore};

#[async_trait]
pub trait SupplierStore: Send + Sync {
    /// Suppliers with `active = true`, ordered by name.
    async fn list_active(&self) -> Result<Vec<Supplier>, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Supplier>, AppError>;

    /// Insert one row under a freshly generated id.
    async fn create(&self, fields: SupplierFields) -> Result<Supplier, AppError>;

    /// Overwrite name, document and active. `None` when no row has `id`.
    async fn update(&self, id: Uuid, fields: SupplierFields) -> Result<Option<Supplier>, AppError>;

    /// Hard delete. Returns whether a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Case-insensitive substring match on name or document, ordered by name.
    async fn search(&self, term: &str) -> Result<Vec<Supplier>, AppError>;

    /// Round-trip to the backend, for readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Outcome of counting one failed sign-in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailedSignIn {
    /// Failure recorded; the account now has this many consecutive failures.
    Counted(i32),
    /// This failure reached the limit: `lockout_end` was set and the count reset.
    LockedOut,
    /// The account was already locked out at `now`; nothing was recorded.
    AlreadyLockedOut,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Lookup by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Insert a new user. A taken normalized email yields a `DuplicateUserName` identity error.
    async fn insert(&self, user: &User) -> Result<(), AppError>;

    /// Clear the failure count and any lockout.
    async fn reset_failed_sign_ins(&self, id: Uuid) -> Result<(), AppError>;

    /// Increment the failure count in one atomic step. When it reaches
    /// `max_failed_attempts` the account is locked until `lockout_end`.
    async fn record_failed_sign_in(
        &self,
        id: Uuid,
        max_failed_attempts: i32,
        now: DateTime<Utc>,
        lockout_end: DateTime<Utc>,
    ) -> Result<FailedSignIn, AppError>;

    async fn claims(&self, user_id: Uuid) -> Result<Vec<UserClaim>, AppError>;

    async fn add_claim(&self, user_id: Uuid, claim: &UserClaim) -> Result<(), AppError>;
}
