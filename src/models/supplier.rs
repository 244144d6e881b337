//! Supplier (fornecedor) record, request body and validation.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Column limits of `fornecedores.name` / `fornecedores.document`.
pub const NAME_MAX_LEN: usize = 200;
pub const DOCUMENT_MAX_LEN: usize = 20;

/// A persisted supplier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    /// Tax / registration identifier.
    pub document: String,
    pub active: bool,
}

/// Body of create and update requests. Any `id` sent by the client is ignored.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct SupplierInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "documento")]
    pub document: Option<String>,
    #[serde(default, alias = "ativo")]
    pub active: bool,
}

/// Validated fields ready to be written by a store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupplierFields {
    pub name: String,
    pub document: String,
    pub active: bool,
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

impl SupplierInput {
    /// True iff `name` and `document` are both present and not blank.
    pub fn validate(&self) -> bool {
        present(&self.name) && present(&self.document)
    }

    /// Check presence and column lengths, yielding the fields to persist.
    pub fn into_fields(self) -> Result<SupplierFields, AppError> {
        if !self.validate() {
            return Err(AppError::Validation("name and document are required".into()));
        }
        let name = self.name.unwrap_or_default();
        let document = self.document.unwrap_or_default();
        if name.chars().count() > NAME_MAX_LEN {
            return Err(AppError::Validation(format!(
                "name must be at most {} characters",
                NAME_MAX_LEN
            )));
        }
        if document.chars().count() > DOCUMENT_MAX_LEN {
            return Err(AppError::Validation(format!(
                "document must be at most {} characters",
                DOCUMENT_MAX_LEN
            )));
        }
        Ok(SupplierFields {
            name,
            document,
            active: self.active,
        })
    }
}

impl Supplier {
    pub fn new(id: Uuid, fields: SupplierFields) -> Self {
        Supplier {
            id,
            name: fields.name,
            document: fields.document,
            active: fields.active,
        }
    }

    /// Case-insensitive substring match on name or document.
    pub fn matches_term(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.document.to_lowercase().contains(&term)
    }
}
