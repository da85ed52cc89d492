//! Read handlers (spec §6 `list_transactions` / `daily_summary`).

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use numa_ledger::DailySummary;
use numa_types::Transaction;
use std::sync::Arc;

use crate::dto::{DailySummaryQuery, ListTransactionsQuery};
use crate::error::ApiError;
use crate::extractors::Owner;
use crate::state::AppState;

pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Query(query): Query<ListTransactionsQuery>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let filter = query.into_filter().map_err(ApiError::bad_request)?;
    let transactions = state.orchestrator.list_transactions(&owner, &filter).await;
    Ok(Json(transactions))
}

pub async fn daily_summary(
    State(state): State<Arc<AppState>>,
    Owner(owner): Owner,
    Query(query): Query<DailySummaryQuery>,
) -> Json<DailySummary> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let summary = state.orchestrator.daily_summary(&owner, date).await;
    Json(summary)
}
