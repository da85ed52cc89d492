//! The contract the document analyzer returns for a verification upload
//! (spec §4.1 `verify_with_document`, concretized in SPEC_FULL §3).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ground truth extracted from a receipt/document. `vendor` becomes
/// `Transaction.merchant`; `total_amount` overwrites the provisional amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentData {
    pub vendor: String,
    pub date: NaiveDate,
    pub total_amount: Decimal,
}
