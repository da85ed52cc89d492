//! Transient classifier output (spec §3 "IntentRecord").
//!
//! `IntentRecord` is never persisted — it lives for the duration of one
//! request and is discarded once the Orchestrator has dispatched it.

use crate::amount::Amount;
use crate::taxonomy::Category;
use crate::transaction::TransactionType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    WriteLog,
    ReadQuery,
    Plan,
    Advice,
    Steer,
    ConfirmUpdate,
    Clarify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SteerKind {
    Meta,
    Social,
}

/// A time window a READ_QUERY or aggregation can be scoped to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Period {
    Today,
    ThisWeek,
    ThisMonth,
    Range { start: NaiveDate, end: NaiveDate },
}

/// Entities recognized by the FIM cascade (spec §3): `amount`, `concept`,
/// `category`, `merchant`, `period`, `date`. Modeled as typed optional
/// fields rather than a loosely-typed map so downstream handlers can't
/// reach for a key that was never extracted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Populated only for CLARIFY records: what stopped resolution, e.g.
    /// `"unintelligible"` or the names of missing fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// One resolved classification, produced by [`crate::intent`] consumers —
/// the Financial Intent Motor is the sole producer (spec §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentRecord {
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_intent: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steer_kind: Option<SteerKind>,
    pub entities: Entities,
    pub confidence: f32,
}

impl IntentRecord {
    pub fn clarify(reason: impl Into<String>) -> Self {
        Self {
            intent: Intent::Clarify,
            sub_intent: None,
            steer_kind: None,
            entities: Entities {
                reason: Some(reason.into()),
                ..Default::default()
            },
            confidence: 1.0,
        }
    }

    pub fn steer(kind: SteerKind) -> Self {
        Self {
            intent: Intent::Steer,
            sub_intent: None,
            steer_kind: Some(kind),
            entities: Entities::default(),
            confidence: 1.0,
        }
    }
}
