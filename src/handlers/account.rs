//! Anonymous account handlers: registration and login, both answering with a bearer token.

use crate::auth::{build_token, SignInResult, UserResponse};
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Deserialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    #[validate(
        required(message = "The Email field is required."),
        email(message = "The Email field is not a valid e-mail address.")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "The Password field is required."),
        length(min = 6, max = 100, message = "The Password field must be between 6 and 100 characters.")
    )]
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

impl RegisterUser {
    /// Field rules plus the password confirmation, which compares two fields.
    fn check(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);
        if self.confirm_password != self.password {
            errors.add(
                "confirm_password",
                ValidationError::new("must_match").with_message("The passwords do not match.".into()),
            );
        }
        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    #[validate(
        required(message = "The Email field is required."),
        email(message = "The Email field is not a valid e-mail address.")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "The Password field is required."),
        length(min = 6, max = 100, message = "The Password field must be between 6 and 100 characters.")
    )]
    pub password: Option<String>,
}

/// `confirm_password` -> `confirmPassword`
fn json_name(field: &str) -> String {
    let mut parts = field.split('_');
    let mut name = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name
}

/// Field errors keyed by their JSON (camelCase) names.
fn validation_problem(errors: ValidationErrors) -> AppError {
    let mut problems: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        problems.insert(json_name(&field), messages);
    }
    AppError::ValidationProblem(problems)
}

fn credentials(email: Option<String>, password: Option<String>) -> (String, String) {
    (email.unwrap_or_default(), password.unwrap_or_default())
}

#[utoipa::path(
    post,
    path = "/registro",
    tag = "Auth",
    operation_id = "RegistroUsuario",
    request_body = RegisterUser,
    responses(
        (status = 200, description = "User created; token issued", body = UserResponse),
        (status = 400, description = "Missing body, invalid fields, weak password or duplicate email"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Option<RegisterUser>>,
) -> Result<Json<UserResponse>, AppError> {
    let body = body.ok_or_else(|| AppError::BadRequest("user not provided".into()))?;
    body.check().map_err(validation_problem)?;
    let (email, password) = credentials(body.email, body.password);

    let user = state.identity.create_user(&email, &password).await?;
    let claims = state.identity.claims(&user).await?;
    Ok(Json(build_token(&user, &claims, &state.jwt)?))
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "LoginUsuario",
    request_body = LoginUser,
    responses(
        (status = 200, description = "Token issued", body = UserResponse),
        (status = 400, description = "Missing body, invalid fields, bad credentials or locked out"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<Option<LoginUser>>,
) -> Result<Json<UserResponse>, AppError> {
    let body = body.ok_or_else(|| AppError::BadRequest("user not provided".into()))?;
    body.validate().map_err(validation_problem)?;
    let (email, password) = credentials(body.email, body.password);

    match state.identity.sign_in(&email, &password).await? {
        SignInResult::Succeeded(user) => {
            let claims = state.identity.claims(&user).await?;
            Ok(Json(build_token(&user, &claims, &state.jwt)?))
        }
        SignInResult::LockedOut => Err(AppError::BadRequest("user locked out".into())),
        SignInResult::Failed => {
            tracing::warn!("rejected sign-in");
            Err(AppError::BadRequest("invalid user or password".into()))
        }
    }
}
