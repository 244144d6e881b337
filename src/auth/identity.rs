//! User registration and password sign-in with lockout.

use crate::auth::password::{PasswordPolicy, PasswordService};
use crate::config::LockoutSettings;
use crate::error::AppError;
use crate::models::{User, UserClaim};
use crate::store::{FailedSignIn, UserStore};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// One reason a user operation was refused, e.g. `PasswordRequiresDigit`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IdentityError {
    pub code: String,
    pub description: String,
}

impl IdentityError {
    pub fn new(code: &str, description: impl Into<String>) -> Self {
        IdentityError {
            code: code.to_string(),
            description: description.into(),
        }
    }

    pub fn duplicate_user_name(email: &str) -> Self {
        IdentityError::new("DuplicateUserName", format!("Username '{}' is already taken.", email))
    }
}

#[derive(Debug)]
pub enum SignInResult {
    Succeeded(User),
    Failed,
    LockedOut,
}

pub struct IdentityService {
    users: Arc<dyn UserStore>,
    policy: PasswordPolicy,
    lockout: LockoutSettings,
}

async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || PasswordService::hash(&password))
        .await
        .map_err(|e| AppError::Internal(format!("hashing task: {}", e)))?
        .map_err(|e| AppError::Internal(e.to_string()))
}

async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || PasswordService::verify(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verification task: {}", e)))?
        .map_err(|e| AppError::Internal(e.to_string()))
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserStore>, lockout: LockoutSettings) -> Self {
        IdentityService {
            users,
            policy: PasswordPolicy::default(),
            lockout,
        }
    }

    /// Create a user after checking the password policy and email uniqueness.
    pub async fn create_user(&self, email: &str, password: &str) -> Result<User, AppError> {
        let mut errors = self.policy.check(password);
        if self.users.find_by_email(email).await?.is_some() {
            errors.push(IdentityError::duplicate_user_name(email));
        }
        if !errors.is_empty() {
            return Err(AppError::Identity(errors));
        }
        let hash = hash_password(password.to_string()).await?;
        let user = User::new(email, hash);
        self.users.insert(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Check a password, counting failures toward lockout.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResult, AppError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            return Ok(SignInResult::Failed);
        };
        let now = Utc::now();
        if user.is_locked_out(now) {
            return Ok(SignInResult::LockedOut);
        }

        if verify_password(password.to_string(), user.password_hash.clone()).await? {
            if user.access_failed_count != 0 || user.lockout_end.is_some() {
                self.users.reset_failed_sign_ins(user.id).await?;
            }
            return Ok(SignInResult::Succeeded(user));
        }

        let lockout = chrono::Duration::from_std(self.lockout.duration)
            .map_err(|e| AppError::Internal(format!("lockout duration: {}", e)))?;
        let max_failed_attempts = i32::try_from(self.lockout.max_failed_attempts).unwrap_or(i32::MAX);
        match self
            .users
            .record_failed_sign_in(user.id, max_failed_attempts, now, now + lockout)
            .await?
        {
            FailedSignIn::Counted(_) => Ok(SignInResult::Failed),
            FailedSignIn::LockedOut => {
                tracing::warn!(user_id = %user.id, "user locked out after repeated failed sign-ins");
                Ok(SignInResult::LockedOut)
            }
            FailedSignIn::AlreadyLockedOut => Ok(SignInResult::LockedOut),
        }
    }

    pub async fn claims(&self, user: &User) -> Result<Vec<UserClaim>, AppError> {
        self.users.claims(user.id).await
    }
}
