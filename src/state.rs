//! Shared application state handed to every handler through axum `State`.

use crate::auth::IdentityService;
use crate::config::{JwtSettings, LockoutSettings};
use crate::store::{SupplierStore, UserStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub suppliers: Arc<dyn SupplierStore>,
    pub identity: Arc<IdentityService>,
    pub jwt: Arc<JwtSettings>,
}

impl AppState {
    pub fn new(
        suppliers: Arc<dyn SupplierStore>,
        users: Arc<dyn UserStore>,
        jwt: JwtSettings,
        lockout: LockoutSettings,
    ) -> Self {
        AppState {
            suppliers,
            identity: Arc::new(IdentityService::new(users, lockout)),
            jwt: Arc::new(jwt),
        }
    }
}
