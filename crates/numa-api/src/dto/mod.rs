//! Request/response bodies for the HTTP façade.
//!
//! Deliberately thin: the Orchestrator's [`numa_orchestrator::ResponseEnvelope`]
//! and `numa_types::Transaction` already serialize to the shapes spec §4.3
//! and §6 describe, so most handlers return those directly. This module
//! only covers the request side and the query-string -> `ListFilter`
//! translation.

use chrono::NaiveDate;
use numa_types::{Category, Period, TransactionStatus, TransactionType};
use numa_ledger::ListFilter;
use serde::Deserialize;

/// Body of `POST /v1/users` — registration is outside the spec's scope
/// (credential verification belongs to `auth.secret`, spec §6), but the
/// core still needs an owner to exist before it accepts writes against it.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub credential_hash: String,
}

/// Body of `POST /v1/messages` (spec §6 `text_message`).
#[derive(Debug, Deserialize)]
pub struct TextMessageRequest {
    pub text: String,
}

/// Query string of `GET /v1/transactions` (spec §6 `list_transactions`).
///
/// `period` accepts `today`, `this_week`, `this_month`, or is left unset to
/// apply no date constraint; `range_start`/`range_end` together select
/// [`Period::Range`].
#[derive(Debug, Default, Deserialize)]
pub struct ListTransactionsQuery {
    pub period: Option<String>,
    pub range_start: Option<NaiveDate>,
    pub range_end: Option<NaiveDate>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub kind: Option<String>,
}

impl ListTransactionsQuery {
    pub fn into_filter(self) -> Result<ListFilter, String> {
        let period = match self.period.as_deref() {
            None => None,
            Some("today") => Some(Period::Today),
            Some("this_week") => Some(Period::ThisWeek),
            Some("this_month") => Some(Period::ThisMonth),
            Some("range") => match (self.range_start, self.range_end) {
                (Some(start), Some(end)) => Some(Period::Range { start, end }),
                _ => return Err("range period requires range_start and range_end".to_string()),
            },
            Some(other) => return Err(format!("unrecognized period '{other}'")),
        };

        let category = match self.category.as_deref() {
            None => None,
            Some(label) => {
                Some(Category::parse(label).ok_or_else(|| format!("unrecognized category '{label}'"))?)
            }
        };

        let status = match self.status.as_deref() {
            None => None,
            Some("provisional") => Some(TransactionStatus::Provisional),
            Some("verified") => Some(TransactionStatus::Verified),
            Some("verified_manual") => Some(TransactionStatus::VerifiedManual),
            Some(other) => return Err(format!("unrecognized status '{other}'")),
        };

        let kind = match self.kind.as_deref() {
            None => None,
            Some("expense") => Some(TransactionType::Expense),
            Some("income") => Some(TransactionType::Income),
            Some("debt") => Some(TransactionType::Debt),
            Some(other) => return Err(format!("unrecognized kind '{other}'")),
        };

        Ok(ListFilter { period, category, status, kind })
    }
}

/// Query string of `GET /v1/summary/daily` (spec §6 `daily_summary`).
#[derive(Debug, Default, Deserialize)]
pub struct DailySummaryQuery {
    pub date: Option<NaiveDate>,
}
