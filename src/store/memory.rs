//! In-memory stores. Same contract as the PostgreSQL stores; used by tests and local runs.

use crate::auth::IdentityError;
use crate::error::AppError;
use crate::models::{Supplier, SupplierFields, User, UserClaim};
use crate::store::{FailedSignIn, SupplierStore, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemorySupplierStore {
    rows: RwLock<HashMap<Uuid, Supplier>>,
}

impl MemorySupplierStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sorted_by_name(mut rows: Vec<Supplier>) -> Vec<Supplier> {
    rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    rows
}

#[async_trait]
impl SupplierStore for MemorySupplierStore {
    async fn list_active(&self) -> Result<Vec<Supplier>, AppError> {
        let rows = self.rows.read().await;
        Ok(sorted_by_name(rows.values().filter(|s| s.active).cloned().collect()))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Supplier>, AppError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn create(&self, fields: SupplierFields) -> Result<Supplier, AppError> {
        let supplier = Supplier::new(Uuid::new_v4(), fields);
        self.rows.write().await.insert(supplier.id, supplier.clone());
        Ok(supplier)
    }

    async fn update(&self, id: Uuid, fields: SupplierFields) -> Result<Option<Supplier>, AppError> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(&id).map(|row| {
            *row = Supplier::new(id, fields);
            row.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }

    async fn search(&self, term: &str) -> Result<Vec<Supplier>, AppError> {
        let rows = self.rows.read().await;
        Ok(sorted_by_name(rows.values().filter(|s| s.matches_term(term)).cloned().collect()))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
    claims: RwLock<HashMap<Uuid, Vec<UserClaim>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let normalized = crate::models::user::normalize_email(email);
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.normalized_email == normalized).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.normalized_email == user.normalized_email) {
            return Err(AppError::Identity(vec![IdentityError::duplicate_user_name(&user.email)]));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn reset_failed_sign_ins(&self, id: Uuid) -> Result<(), AppError> {
        if let Some(user) = self.users.write().await.get_mut(&id) {
            user.access_failed_count = 0;
            user.lockout_end = None;
        }
        Ok(())
    }

    async fn record_failed_sign_in(
        &self,
        id: Uuid,
        max_failed_attempts: i32,
        now: DateTime<Utc>,
        lockout_end: DateTime<Utc>,
    ) -> Result<FailedSignIn, AppError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;
        if user.is_locked_out(now) {
            return Ok(FailedSignIn::AlreadyLockedOut);
        }
        let failures = user.access_failed_count + 1;
        if failures >= max_failed_attempts {
            user.access_failed_count = 0;
            user.lockout_end = Some(lockout_end);
            return Ok(FailedSignIn::LockedOut);
        }
        user.access_failed_count = failures;
        Ok(FailedSignIn::Counted(failures))
    }

    async fn claims(&self, user_id: Uuid) -> Result<Vec<UserClaim>, AppError> {
        Ok(self.claims.read().await.get(&user_id).cloned().unwrap_or_default())
    }

    async fn add_claim(&self, user_id: Uuid, claim: &UserClaim) -> Result<(), AppError> {
        if !self.users.read().await.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("user {}", user_id)));
        }
        self.claims
            .write()
            .await
            .entry(user_id)
            .or_default()
            .push(claim.clone());
        Ok(())
    }
}
