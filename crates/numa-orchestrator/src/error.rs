//! Errors raised by the Orchestrator (spec §7).

use numa_guard::GuardError;
use numa_intent::FimError;
use numa_ledger::LedgerError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum OrchestratorError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Fim(#[from] FimError),

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error("WRITE_LOG record is missing its {0}; FIM should have emitted CLARIFY instead")]
    MissingEntity(&'static str),

    #[error("clause did not resolve to a loggable transaction: {0}")]
    UnresolvedClause(String),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// The error-kind discriminator carried on an `error`-typed envelope, so
/// the HTTP façade can pick a status code without string-matching the
/// message (spec §7's error kinds table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnintelligibleAudio,
    Timeout,
    InvalidEntity,
    NotProvisional,
    NotOwner,
    MissingMerchant,
    ProviderError,
}

impl From<&OrchestratorError> for ErrorKind {
    fn from(err: &OrchestratorError) -> Self {
        match err {
            OrchestratorError::Ledger(LedgerError::NotOwner) => ErrorKind::NotOwner,
            OrchestratorError::Ledger(LedgerError::UnknownOwner { .. }) => ErrorKind::NotOwner,
            OrchestratorError::Ledger(LedgerError::NotProvisional) => ErrorKind::NotProvisional,
            OrchestratorError::Ledger(LedgerError::MissingMerchant) => ErrorKind::MissingMerchant,
            OrchestratorError::Ledger(LedgerError::InvalidAmount(_)) => ErrorKind::InvalidEntity,
            OrchestratorError::Ledger(LedgerError::InvalidConcept(_)) => ErrorKind::InvalidEntity,
            OrchestratorError::Ledger(LedgerError::InvalidDocument) => ErrorKind::InvalidEntity,
            OrchestratorError::Fim(FimError::UnintelligibleAudio) => ErrorKind::UnintelligibleAudio,
            OrchestratorError::Fim(FimError::Timeout) => ErrorKind::Timeout,
            OrchestratorError::Fim(FimError::ProviderError(_)) => ErrorKind::ProviderError,
            OrchestratorError::Fim(FimError::InvalidDocument(_)) => ErrorKind::InvalidEntity,
            OrchestratorError::Guard(_) => ErrorKind::ProviderError,
            OrchestratorError::MissingEntity(_) => ErrorKind::InvalidEntity,
            OrchestratorError::UnresolvedClause(_) => ErrorKind::InvalidEntity,
        }
    }
}
