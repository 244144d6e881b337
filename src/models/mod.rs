//! Domain records: suppliers and identity users.

pub mod supplier;
pub mod user;

pub use supplier::{Supplier, SupplierFields, SupplierInput, DOCUMENT_MAX_LEN, NAME_MAX_LEN};
pub use user::{User, UserClaim};
