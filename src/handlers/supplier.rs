//! Supplier handlers: list active, get by id or search, create, update, delete.

use crate::auth::DELETE_SUPPLIER_CLAIM;
use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::models::{Supplier, SupplierInput};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/fornecedor",
    tag = "Fornecedor",
    operation_id = "GetFornecedorAllActive",
    responses(
        (status = 200, description = "Active suppliers", body = Vec<Supplier>),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = []))
)]
pub async fn list_active(_auth: AuthUser, State(state): State<AppState>) -> Result<Json<Vec<Supplier>>, AppError> {
    let rows = state.suppliers.list_active().await?;
    Ok(Json(rows))
}

/// `GET /fornecedor/{key}`: a UUID key reads one supplier, anything else searches.
#[utoipa::path(
    get,
    path = "/fornecedor/{key}",
    tag = "Fornecedor",
    operation_id = "GetFornecedorByIdOrTerm",
    params(("key" = String, Path, description = "Supplier id (UUID) or a search term")),
    responses(
        (status = 200, description = "The supplier (id) or the matching suppliers (term)", body = Vec<Supplier>),
        (status = 404, description = "Unknown id or blank term"),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = []))
)]
pub async fn get_by_key(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    match Uuid::parse_str(key.trim()) {
        Ok(id) => get_by_id(&state, id).await.map(IntoResponse::into_response),
        Err(_) => search(&state, &key).await.map(IntoResponse::into_response),
    }
}

async fn get_by_id(state: &AppState, id: Uuid) -> Result<Json<Supplier>, AppError> {
    let row = state
        .suppliers
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("supplier {}", id)))?;
    Ok(Json(row))
}

async fn search(state: &AppState, term: &str) -> Result<Json<Vec<Supplier>>, AppError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(AppError::NotFound("blank search term".into()));
    }
    let rows = state.suppliers.search(term).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    post,
    path = "/fornecedor",
    tag = "Fornecedor",
    operation_id = "CreateFornecedor",
    request_body = SupplierInput,
    responses(
        (status = 201, description = "Created", body = Supplier),
        (status = 422, description = "Name or document missing or too long"),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = []))
)]
pub async fn create(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SupplierInput>,
) -> Result<impl IntoResponse, AppError> {
    let fields = input.into_fields()?;
    let row = state.suppliers.create(fields).await?;
    tracing::info!(supplier_id = %row.id, "supplier created");
    let location = format!("/fornecedor/{}", row.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(row)))
}

/// An unknown id is a 400 even when the body is also invalid; body checks (422) come second.
#[utoipa::path(
    put,
    path = "/fornecedor/{id}",
    tag = "Fornecedor",
    operation_id = "UpdateFornecedor",
    params(("id" = Uuid, Path, description = "Supplier id")),
    request_body = SupplierInput,
    responses(
        (status = 200, description = "Updated", body = Supplier),
        (status = 400, description = "Unknown or malformed id"),
        (status = 422, description = "Name or document missing or too long"),
        (status = 401, description = "Missing or invalid bearer token"),
    ),
    security(("bearer" = []))
)]
pub async fn update(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SupplierInput>,
) -> Result<Json<Supplier>, AppError> {
    let missing = || AppError::BadRequest(format!("supplier {} does not exist", id));
    if state.suppliers.find(id).await?.is_none() {
        return Err(missing());
    }
    let fields = input.into_fields()?;
    let row = state.suppliers.update(id, fields).await?.ok_or_else(missing)?;
    tracing::info!(supplier_id = %row.id, "supplier updated");
    Ok(Json(row))
}

#[utoipa::path(
    delete,
    path = "/fornecedor/{id}",
    tag = "Fornecedor",
    operation_id = "DeleteFornecedor",
    params(("id" = Uuid, Path, description = "Supplier id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Unknown id"),
        (status = 401, description = "Missing or invalid bearer token"),
        (status = 403, description = "Token lacks the DeleteFornecedor claim"),
    ),
    security(("bearer" = []))
)]
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_claim(DELETE_SUPPLIER_CLAIM)?;
    if !state.suppliers.delete(id).await? {
        return Err(AppError::NotFound(format!("supplier {}", id)));
    }
    tracing::info!(supplier_id = %id, sub = %auth.claims().sub, "supplier deleted");
    Ok(StatusCode::NO_CONTENT)
}
