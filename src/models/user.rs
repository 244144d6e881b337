//! Identity user and its granted claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub normalized_email: String,
    pub password_hash: String,
    pub access_failed_count: i32,
    pub lockout_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: &str, password_hash: String) -> Self {
        User {
            id: Uuid::new_v4(),
            email: email.trim().to_string(),
            normalized_email: normalize_email(email),
            password_hash,
            access_failed_count: 0,
            lockout_end: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_locked_out(&self, now: DateTime<Utc>) -> bool {
        self.lockout_end.map(|end| end > now).unwrap_or(false)
    }
}

/// Lookup key for emails: trimmed and upper-cased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_uppercase()
}

/// A named grant attached to a user and copied into issued tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct UserClaim {
    #[serde(rename = "type")]
    pub claim_type: String,
    #[serde(rename = "value")]
    pub claim_value: String,
}

impl UserClaim {
    pub fn new(claim_type: impl Into<String>, claim_value: impl Into<String>) -> Self {
        UserClaim {
            claim_type: claim_type.into(),
            claim_value: claim_value.into(),
        }
    }
}
