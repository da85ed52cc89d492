//! Errors raised by Ledger operations (spec §7).

use numa_types::TypesError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("invalid amount: {0}")]
    InvalidAmount(TypesError),

    #[error("invalid concept: {0}")]
    InvalidConcept(TypesError),

    #[error("owner {owner} is not registered")]
    UnknownOwner { owner: String },

    /// Covers both "no such transaction" and "wrong owner" — a cross-tenant
    /// access attempt must be indistinguishable from not-found (spec §7).
    #[error("transaction not found")]
    NotOwner,

    #[error("transaction is not in PROVISIONAL status")]
    NotProvisional,

    #[error("merchant is required to verify a transaction")]
    MissingMerchant,

    #[error("verification document has no usable amount")]
    InvalidDocument,
}

pub type Result<T> = std::result::Result<T, LedgerError>;
