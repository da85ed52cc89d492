//! Error types shared across the Numa type system.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TypesError>;

/// Validation errors for the canonical domain types.
///
/// These are the errors the Ledger's preconditions (spec §4.1) raise before
/// a `Transaction` is ever constructed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("amount must be greater than zero, got {amount}")]
    InvalidAmount { amount: String },

    #[error("concept must not be empty")]
    InvalidConcept,

    #[error("{label} is not a recognized category")]
    UnknownCategory { label: String },
}
