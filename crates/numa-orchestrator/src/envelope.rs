//! The response envelope returned by every Orchestrator entry point (spec §4.3).

use numa_types::Transaction;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, OrchestratorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeKind {
    Transaction,
    Chat,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    pub data: Option<Vec<Transaction>>,
    pub message: Option<String>,
    /// Not in the spec's envelope shape directly, but carried so the HTTP
    /// façade can choose a status code without parsing `message`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ResponseEnvelope {
    pub fn transactions(txs: Vec<Transaction>) -> Self {
        let total: Decimal = txs.iter().fold(Decimal::ZERO, |acc, t| acc + t.amount.value());
        let message = match txs.as_slice() {
            [single] => format!("Registrado: {} ({})", single.concept, single.amount),
            many => format!("{} movimientos registrados, total {}", many.len(), total),
        };
        Self {
            kind: EnvelopeKind::Transaction,
            data: Some(txs),
            message: Some(message),
            error_kind: None,
        }
    }

    pub fn chat(message: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::Chat,
            data: None,
            message: Some(message.into()),
            error_kind: None,
        }
    }

    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind: EnvelopeKind::Error,
            data: None,
            message: Some(message.into()),
            error_kind: Some(kind),
        }
    }

    pub fn from_error(err: &OrchestratorError) -> Self {
        Self::error(ErrorKind::from(err), err.to_string())
    }

    /// The shape for a multi-WRITE_LOG utterance where one write failed
    /// partway through (spec §5: "aborts remaining writes and returns a
    /// partial envelope listing what succeeded plus an error indicator").
    pub fn partial_write(succeeded: Vec<Transaction>, failure: &OrchestratorError) -> Self {
        Self {
            kind: EnvelopeKind::Error,
            data: if succeeded.is_empty() { None } else { Some(succeeded) },
            message: Some(format!("some movements were not saved: {failure}")),
            error_kind: Some(ErrorKind::from(failure)),
        }
    }
}
