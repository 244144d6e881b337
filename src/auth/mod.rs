//! Identity: password hashing and policy, sign-in with lockout, bearer tokens.

pub mod identity;
pub mod jwt;
pub mod password;

pub use identity::{IdentityError, IdentityService, SignInResult};
pub use jwt::{build_token, validate_token, TokenClaims, UserResponse, UserToken, DELETE_SUPPLIER_CLAIM};
pub use password::{PasswordPolicy, PasswordService};
