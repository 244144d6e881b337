//! HTTP handlers for suppliers and accounts.

pub mod account;
pub mod supplier;
