//! Bearer-token extractor: rejects the request with 401 unless it carries a valid token.

use crate::auth::{validate_token, TokenClaims};
use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

/// Caller authenticated from `Authorization: Bearer <token>`.
#[derive(Clone, Debug)]
pub struct AuthUser(pub TokenClaims);

impl AuthUser {
    pub fn claims(&self) -> &TokenClaims {
        &self.0
    }

    /// 403 unless the token carries `claim_type`.
    pub fn require_claim(&self, claim_type: &str) -> Result<(), AppError> {
        if self.0.has_claim(claim_type) {
            Ok(())
        } else {
            tracing::warn!(sub = %self.0.sub, claim = claim_type, "missing required claim");
            Err(AppError::Forbidden(format!("claim '{}' required", claim_type)))
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;
        let claims = validate_token(token, &state.jwt)?;
        Ok(AuthUser(claims))
    }
}
