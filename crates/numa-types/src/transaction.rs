//! The `Transaction` entity and its state machine (spec §3).

use crate::amount::Amount;
use crate::error::{Result, TypesError};
use crate::ids::{TransactionId, UserId};
use crate::taxonomy::Category;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Expense,
    Income,
    Debt,
}

/// A Transaction transitions only PROVISIONAL -> VERIFIED or
/// PROVISIONAL -> VERIFIED_MANUAL (spec §3 invariant 4); both terminal
/// states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Provisional,
    Verified,
    VerifiedManual,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Provisional)
    }
}

/// An atomic financial movement, owned by exactly one [`UserId`] (spec §3
/// invariant 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub owner_id: UserId,
    pub kind: TransactionType,
    pub amount: Amount,
    pub concept: String,
    pub category: Option<Category>,
    pub merchant: Option<String>,
    pub status: TransactionStatus,
    pub transaction_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Validate `concept` against invariant 2 ("concept is never empty").
    pub fn validate_concept(concept: &str) -> Result<()> {
        if concept.trim().is_empty() {
            return Err(TypesError::InvalidConcept);
        }
        Ok(())
    }

    pub fn merchant_is_set(&self) -> bool {
        self.merchant.as_deref().is_some_and(|m| !m.trim().is_empty())
    }
}
