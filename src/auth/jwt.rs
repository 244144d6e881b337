//! Bearer token construction and validation (HS256 JWT).

use crate::config::JwtSettings;
use crate::error::AppError;
use crate::models::{User, UserClaim};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

/// Claim type required to delete suppliers.
pub const DELETE_SUPPLIER_CLAIM: &str = "DeleteFornecedor";

const REGISTERED_CLAIMS: &[&str] = &["sub", "email", "jti", "nbf", "iat", "exp", "iss", "aud"];

/// JWT payload. User claims are flattened in as top-level members; a claim type
/// granted more than once becomes an array.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub email: String,
    pub jti: String,
    pub nbf: i64,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TokenClaims {
    pub fn has_claim(&self, claim_type: &str) -> bool {
        self.extra.contains_key(claim_type)
    }
}

/// Body returned by registration and login.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: f64,
    pub user_token: UserToken,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct UserToken {
    pub id: String,
    pub email: String,
    pub claims: Vec<UserClaim>,
}

fn insert_claim(extra: &mut BTreeMap<String, Value>, claim: &UserClaim) {
    let value = Value::String(claim.claim_value.clone());
    match extra.get_mut(&claim.claim_type) {
        Some(Value::Array(values)) => values.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            extra.insert(claim.claim_type.clone(), value);
        }
    }
}

/// Sign a token for `user` carrying its granted `claims`.
pub fn build_token(user: &User, claims: &[UserClaim], settings: &JwtSettings) -> Result<UserResponse, AppError> {
    let now = Utc::now();
    let lifetime = Duration::hours(i64::from(settings.expiration_hours));

    let mut extra = BTreeMap::new();
    for claim in claims {
        if REGISTERED_CLAIMS.contains(&claim.claim_type.as_str()) {
            tracing::warn!(claim = %claim.claim_type, "skipping user claim that shadows a registered claim");
            continue;
        }
        insert_claim(&mut extra, claim);
    }

    let token_claims = TokenClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        jti: Uuid::new_v4().to_string(),
        nbf: now.timestamp(),
        iat: now.timestamp(),
        exp: (now + lifetime).timestamp(),
        iss: settings.issuer.clone(),
        aud: settings.audience.clone(),
        extra,
    };

    let access_token = encode(
        &Header::new(Algorithm::HS256),
        &token_claims,
        &EncodingKey::from_secret(settings.secret_key.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token creation failed: {}", e)))?;

    let mut listed = vec![
        UserClaim::new("sub", token_claims.sub.clone()),
        UserClaim::new("email", token_claims.email.clone()),
        UserClaim::new("jti", token_claims.jti.clone()),
        UserClaim::new("nbf", token_claims.nbf.to_string()),
        UserClaim::new("iat", token_claims.iat.to_string()),
    ];
    listed.extend(
        claims
            .iter()
            .filter(|c| !REGISTERED_CLAIMS.contains(&c.claim_type.as_str()))
            .cloned(),
    );

    Ok(UserResponse {
        access_token,
        expires_in: lifetime.num_seconds() as f64,
        user_token: UserToken {
            id: user.id.to_string(),
            email: user.email.clone(),
            claims: listed,
        },
    })
}

/// Verify signature, expiry, issuer and audience.
pub fn validate_token(token: &str, settings: &JwtSettings) -> Result<TokenClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[settings.issuer.as_str()]);
    validation.set_audience(&[settings.audience.as_str()]);
    validation.validate_nbf = true;
    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(settings.secret_key.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("invalid token: {}", e)))
}
