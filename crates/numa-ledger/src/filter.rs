//! Query filters and aggregation result shapes (spec §4.1).

use chrono::{Datelike, NaiveDate, Utc};
use numa_types::{Category, Period, Transaction, TransactionStatus, TransactionType};
use rust_decimal::Decimal;
use serde::Serialize;

/// Filter applied by `list_by_owner` / `sum_by_owner`. Every field is
/// optional; an unset field imposes no constraint.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub period: Option<Period>,
    pub category: Option<Category>,
    pub status: Option<TransactionStatus>,
    pub kind: Option<TransactionType>,
}

impl ListFilter {
    pub fn matches(&self, t: &Transaction) -> bool {
        if let Some(category) = self.category {
            if t.category != Some(category) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if t.status != status {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if t.kind != kind {
                return false;
            }
        }
        if let Some(period) = &self.period {
            let (start, end) = period_bounds(period);
            match t.transaction_date {
                Some(d) => {
                    if d < start || d > end {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }
}

/// Resolve a [`Period`] into an inclusive `[start, end]` date range,
/// anchored on the current date.
pub fn period_bounds(period: &Period) -> (NaiveDate, NaiveDate) {
    let today = Utc::now().date_naive();
    match period {
        Period::Today => (today, today),
        Period::ThisWeek => {
            let weekday = today.weekday().num_days_from_monday();
            let start = today - chrono::Duration::days(weekday as i64);
            let end = start + chrono::Duration::days(6);
            (start, end)
        }
        Period::ThisMonth => {
            let start = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap();
            let end = if today.month() == 12 {
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1).unwrap()
            } else {
                NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1).unwrap()
            } - chrono::Duration::days(1);
            (start, end)
        }
        Period::Range { start, end } => (*start, *end),
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct SumResult {
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct Bucket {
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct ValidationGroup {
    pub income: Bucket,
    pub expense: Bucket,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct DailySummary {
    pub validated: ValidationGroup,
    pub provisional: ValidationGroup,
}
