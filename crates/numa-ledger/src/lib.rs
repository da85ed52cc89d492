//! Numa Ledger - owner-scoped transaction store and state machine
//!
//! The ledger is:
//! - Owner-scoped (every query filters by `owner_id`, spec §3 invariant)
//! - A one-way state machine: PROVISIONAL -> VERIFIED / VERIFIED_MANUAL
//! - Merchant-integrity enforced: no transaction leaves PROVISIONAL without
//!   a merchant
//!
//! # Invariants
//!
//! 1. `amount > 0` for every persisted transaction
//! 2. `concept` is never empty
//! 3. Every transaction has exactly one owner; every query filters by it
//! 4. PROVISIONAL -> {VERIFIED, VERIFIED_MANUAL} only, never the reverse
//! 5. Verification without a merchant is rejected
//! 6. `verified_at` is set once and never changes again

pub mod classifier;
pub mod error;
pub mod filter;

use chrono::{NaiveDate, Utc};
use numa_types::{
    Amount, Category, DocumentData, Transaction, TransactionId, TransactionStatus, TransactionType,
    User, UserId,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub use classifier::{CategoryClassifier, NullClassifier};
pub use error::{LedgerError, Result};
pub use filter::{Bucket, DailySummary, ListFilter, SumResult, ValidationGroup};

/// The confidence threshold above which an auto-categorization result is
/// accepted outright (spec §6 `intent.confidence_threshold`, default 0.7).
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// The Numa Ledger.
///
/// Thread-safe, in-memory by default. A real deployment swaps the storage
/// for a database-backed implementation; that driver is out of scope here
/// (spec §1) — this crate only needs to enforce the state machine and the
/// owner-scoping invariant, keeping its bookkeeping entirely behind an
/// `Arc<RwLock<HashMap<..>>>` rather than an abstract repository trait.
#[derive(Clone)]
pub struct Ledger {
    users: Arc<RwLock<HashMap<UserId, User>>>,
    transactions: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
    classifier: Arc<dyn CategoryClassifier>,
    confidence_threshold: f32,
}

impl Ledger {
    pub fn new(classifier: Arc<dyn CategoryClassifier>) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            transactions: Arc::new(RwLock::new(HashMap::new())),
            classifier,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// In-memory ledger with no auto-categorization opinion, handy for
    /// tests that don't exercise that path.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(NullClassifier))
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn register_user(&self, credential_hash: impl Into<String>) -> User {
        let user = User::new(credential_hash);
        self.users
            .write()
            .await
            .insert(user.id.clone(), user.clone());
        user
    }

    pub async fn get_user(&self, id: &UserId) -> Option<User> {
        self.users.read().await.get(id).cloned()
    }

    async fn require_owner(&self, owner: &UserId) -> Result<()> {
        if self.users.read().await.contains_key(owner) {
            Ok(())
        } else {
            Err(LedgerError::UnknownOwner {
                owner: owner.to_string(),
            })
        }
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Create a PROVISIONAL transaction (spec §4.1).
    ///
    /// Partial provisional records are allowed: merchant/category/date are
    /// stored if the FIM supplied them, null otherwise.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_provisional(
        &self,
        owner: &UserId,
        amount: Decimal,
        concept: impl Into<String>,
        kind: TransactionType,
        merchant: Option<String>,
        category: Option<Category>,
        date: Option<NaiveDate>,
    ) -> Result<Transaction> {
        self.require_owner(owner).await?;

        let concept = concept.into();
        Transaction::validate_concept(&concept).map_err(LedgerError::InvalidConcept)?;
        let amount = Amount::try_new(amount).map_err(LedgerError::InvalidAmount)?;

        let transaction = Transaction {
            id: TransactionId::new(),
            owner_id: owner.clone(),
            kind,
            amount,
            concept,
            category,
            merchant,
            status: TransactionStatus::Provisional,
            transaction_date: date,
            created_at: Utc::now(),
            verified_at: None,
        };

        self.transactions
            .write()
            .await
            .insert(transaction.id.clone(), transaction.clone());

        info!(transaction_id = %transaction.id, owner = %owner, "created provisional transaction");
        Ok(transaction)
    }

    /// Overwrite a PROVISIONAL transaction with ground truth from a
    /// verification document (spec §4.1). The document's amount wins; the
    /// original concept is preserved.
    pub async fn verify_with_document(
        &self,
        id: &TransactionId,
        owner: &UserId,
        document: DocumentData,
    ) -> Result<Transaction> {
        if document.vendor.trim().is_empty() {
            return Err(LedgerError::MissingMerchant);
        }
        let amount =
            Amount::try_new(document.total_amount).map_err(|_| LedgerError::InvalidDocument)?;

        {
            let mut transactions = self.transactions.write().await;
            let transaction = transactions.get_mut(id).ok_or(LedgerError::NotOwner)?;
            if &transaction.owner_id != owner {
                return Err(LedgerError::NotOwner);
            }
            if transaction.status != TransactionStatus::Provisional {
                return Err(LedgerError::NotProvisional);
            }

            transaction.amount = amount;
            transaction.merchant = Some(document.vendor);
            transaction.transaction_date = Some(document.date);
            transaction.status = TransactionStatus::Verified;
            transaction.verified_at = Some(Utc::now());
        }

        self.auto_categorize_if_needed(id).await;
        info!(transaction_id = %id, "verified with document");
        self.snapshot(id).await
    }

    /// Verify using only the merchant already recorded on the provisional
    /// transaction (spec §4.1).
    pub async fn verify_manual(&self, id: &TransactionId, owner: &UserId) -> Result<Transaction> {
        {
            let mut transactions = self.transactions.write().await;
            let transaction = transactions.get_mut(id).ok_or(LedgerError::NotOwner)?;
            if &transaction.owner_id != owner {
                return Err(LedgerError::NotOwner);
            }
            if transaction.status != TransactionStatus::Provisional {
                return Err(LedgerError::NotProvisional);
            }
            if !transaction.merchant_is_set() {
                return Err(LedgerError::MissingMerchant);
            }
            transaction.status = TransactionStatus::VerifiedManual;
            transaction.verified_at = Some(Utc::now());
        }

        self.auto_categorize_if_needed(id).await;
        info!(transaction_id = %id, "verified manually");
        self.snapshot(id).await
    }

    /// Apply a field update (merchant/category) to the owner's most recent
    /// PROVISIONAL transaction, without touching the amount (spec §4.3
    /// CONFIRM_UPDATE, concretized in SPEC_FULL §3).
    pub async fn apply_confirm_update(
        &self,
        owner: &UserId,
        merchant: Option<String>,
        category: Option<Category>,
    ) -> Option<Transaction> {
        let mut transactions = self.transactions.write().await;
        let target = transactions
            .values_mut()
            .filter(|t| &t.owner_id == owner && t.status == TransactionStatus::Provisional)
            .max_by_key(|t| t.created_at)?;

        if let Some(merchant) = merchant {
            target.merchant = Some(merchant);
        }
        if let Some(category) = category {
            target.category = Some(category);
        }
        Some(target.clone())
    }

    async fn snapshot(&self, id: &TransactionId) -> Result<Transaction> {
        self.transactions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(LedgerError::NotOwner)
    }

    /// Auto-categorization policy (spec §4.1): only runs if category is
    /// still null. Accept the classifier's label above the confidence
    /// threshold; otherwise fall back to the lowest-risk bucket. A
    /// classifier failure (`None`) is best-effort and never surfaces — the
    /// verify still succeeds with `Compras`.
    async fn auto_categorize_if_needed(&self, id: &TransactionId) {
        let (concept, merchant) = {
            let transactions = self.transactions.read().await;
            match transactions.get(id) {
                Some(t) if t.category.is_none() => (t.concept.clone(), t.merchant.clone()),
                _ => return,
            }
        };

        let label = match self.classifier.classify(&concept, merchant.as_deref()).await {
            Some((category, confidence)) if confidence >= self.confidence_threshold => category,
            Some(_) => {
                warn!(transaction_id = %id, "auto-category confidence below threshold, defaulting");
                Category::DEFAULT
            }
            None => {
                warn!(transaction_id = %id, "auto-categorizer unavailable, defaulting");
                Category::DEFAULT
            }
        };

        if let Some(t) = self.transactions.write().await.get_mut(id) {
            t.category = Some(label);
        }
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// List every transaction belonging to `owner` that matches `filter`,
    /// newest first.
    pub async fn list_by_owner(&self, owner: &UserId, filter: &ListFilter) -> Vec<Transaction> {
        let transactions = self.transactions.read().await;
        let mut matches: Vec<Transaction> = transactions
            .values()
            .filter(|t| &t.owner_id == owner && filter.matches(t))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches
    }

    /// Deterministic aggregation over `owner`'s transactions (spec §4.1).
    pub async fn sum_by_owner(&self, owner: &UserId, filter: &ListFilter) -> SumResult {
        let matches = self.list_by_owner(owner, filter).await;
        let total = matches
            .iter()
            .fold(Decimal::ZERO, |acc, t| acc + t.amount.value());
        SumResult {
            total,
            count: matches.len(),
        }
    }

    /// The day's validated vs. provisional income/expense split (spec
    /// §4.1 `daily_summary`).
    pub async fn daily_summary(&self, owner: &UserId, date: NaiveDate) -> DailySummary {
        let transactions = self.transactions.read().await;
        let mut summary = DailySummary::default();

        for t in transactions.values() {
            if &t.owner_id != owner || t.transaction_date != Some(date) {
                continue;
            }
            let group = if t.status == TransactionStatus::Provisional {
                &mut summary.provisional
            } else {
                &mut summary.validated
            };
            let bucket = match t.kind {
                TransactionType::Income => &mut group.income,
                TransactionType::Expense => &mut group.expense,
                TransactionType::Debt => continue,
            };
            bucket.total += t.amount.value();
            bucket.count += 1;
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numa_types::Category;
    use rust_decimal_macros::dec;

    async fn ledger_with_user() -> (Ledger, UserId) {
        let ledger = Ledger::in_memory();
        let user = ledger.register_user("hash").await;
        (ledger, user.id)
    }

    #[tokio::test]
    async fn create_provisional_then_list() {
        let (ledger, owner) = ledger_with_user().await;
        let t = ledger
            .create_provisional(&owner, dec!(500), "super", TransactionType::Expense, None, None, None)
            .await
            .unwrap();
        assert_eq!(t.status, TransactionStatus::Provisional);

        let found = ledger
            .list_by_owner(
                &owner,
                &ListFilter {
                    status: Some(TransactionStatus::Provisional),
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, t.id);
    }

    #[tokio::test]
    async fn rejects_zero_amount() {
        let (ledger, owner) = ledger_with_user().await;
        let err = ledger
            .create_provisional(&owner, dec!(0), "nada", TransactionType::Expense, None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount(_)));
    }

    #[tokio::test]
    async fn rejects_empty_concept() {
        let (ledger, owner) = ledger_with_user().await;
        let err = ledger
            .create_provisional(&owner, dec!(10), "   ", TransactionType::Expense, None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidConcept(_)));
    }

    #[tokio::test]
    async fn unregistered_owner_is_rejected() {
        let ledger = Ledger::in_memory();
        let stranger = UserId::new();
        let err = ledger
            .create_provisional(&stranger, dec!(10), "algo", TransactionType::Expense, None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownOwner { .. }));
    }

    #[tokio::test]
    async fn verify_with_document_overwrites_amount_and_keeps_concept() {
        let (ledger, owner) = ledger_with_user().await;
        let t = ledger
            .create_provisional(&owner, dec!(100), "comida", TransactionType::Expense, None, None, None)
            .await
            .unwrap();

        let verified = ledger
            .verify_with_document(
                &t.id,
                &owner,
                DocumentData {
                    vendor: "Restaurante X".to_string(),
                    date: Utc::now().date_naive(),
                    total_amount: dec!(137.50),
                },
            )
            .await
            .unwrap();

        assert_eq!(verified.amount.value(), dec!(137.50));
        assert_eq!(verified.concept, "comida");
        assert_eq!(verified.status, TransactionStatus::Verified);
        assert!(verified.verified_at.is_some());
        assert_eq!(verified.category, Some(Category::DEFAULT));
    }

    #[tokio::test]
    async fn verify_with_document_missing_vendor_fails() {
        let (ledger, owner) = ledger_with_user().await;
        let t = ledger
            .create_provisional(&owner, dec!(100), "comida", TransactionType::Expense, None, None, None)
            .await
            .unwrap();

        let err = ledger
            .verify_with_document(
                &t.id,
                &owner,
                DocumentData {
                    vendor: "   ".to_string(),
                    date: Utc::now().date_naive(),
                    total_amount: dec!(100),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::MissingMerchant));
    }

    #[tokio::test]
    async fn verify_manual_without_merchant_fails_and_leaves_row_unchanged() {
        let (ledger, owner) = ledger_with_user().await;
        let t = ledger
            .create_provisional(&owner, dec!(50), "algo", TransactionType::Expense, None, None, None)
            .await
            .unwrap();

        let err = ledger.verify_manual(&t.id, &owner).await.unwrap_err();
        assert!(matches!(err, LedgerError::MissingMerchant));

        let still_provisional = ledger.list_by_owner(&owner, &ListFilter::default()).await;
        assert_eq!(still_provisional[0].status, TransactionStatus::Provisional);
    }

    #[tokio::test]
    async fn verify_manual_twice_is_rejected_without_mutation() {
        let (ledger, owner) = ledger_with_user().await;
        let t = ledger
            .create_provisional(
                &owner,
                dec!(50),
                "algo",
                TransactionType::Expense,
                Some("Tienda".to_string()),
                None,
                None,
            )
            .await
            .unwrap();

        let first = ledger.verify_manual(&t.id, &owner).await.unwrap();
        let err = ledger.verify_manual(&t.id, &owner).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotProvisional));

        let unchanged = ledger.list_by_owner(&owner, &ListFilter::default()).await;
        assert_eq!(unchanged[0].verified_at, first.verified_at);
    }

    #[tokio::test]
    async fn cross_tenant_verify_is_indistinguishable_from_not_found() {
        let ledger = Ledger::in_memory();
        let owner_a = ledger.register_user("a").await.id;
        let owner_b = ledger.register_user("b").await.id;

        let t = ledger
            .create_provisional(
                &owner_a,
                dec!(50),
                "algo",
                TransactionType::Expense,
                Some("Tienda".to_string()),
                None,
                None,
            )
            .await
            .unwrap();

        let wrong_owner_err = ledger.verify_manual(&t.id, &owner_b).await.unwrap_err();
        let missing_err = ledger
            .verify_manual(&TransactionId::new(), &owner_b)
            .await
            .unwrap_err();
        assert_eq!(wrong_owner_err, missing_err);
        assert!(matches!(wrong_owner_err, LedgerError::NotOwner));
    }

    #[tokio::test]
    async fn sum_by_owner_is_deterministic() {
        let (ledger, owner) = ledger_with_user().await;
        let today = Utc::now().date_naive();
        ledger
            .create_provisional(&owner, dec!(500), "luz", TransactionType::Expense, None, None, Some(today))
            .await
            .unwrap();
        ledger
            .create_provisional(&owner, dec!(300), "agua", TransactionType::Expense, None, None, Some(today))
            .await
            .unwrap();

        let result = ledger
            .sum_by_owner(
                &owner,
                &ListFilter {
                    period: Some(numa_types::Period::Today),
                    ..Default::default()
                },
            )
            .await;
        assert_eq!(result.total, dec!(800));
        assert_eq!(result.count, 2);
    }

    #[tokio::test]
    async fn daily_summary_splits_validated_and_provisional() {
        let (ledger, owner) = ledger_with_user().await;
        let today = Utc::now().date_naive();

        ledger
            .create_provisional(&owner, dec!(500), "luz", TransactionType::Expense, None, None, Some(today))
            .await
            .unwrap();

        let verified = ledger
            .create_provisional(
                &owner,
                dec!(1000),
                "nomina",
                TransactionType::Income,
                Some("Empresa".to_string()),
                None,
                Some(today),
            )
            .await
            .unwrap();
        ledger.verify_manual(&verified.id, &owner).await.unwrap();

        let summary = ledger.daily_summary(&owner, today).await;
        assert_eq!(summary.provisional.expense.total, dec!(500));
        assert_eq!(summary.validated.income.total, dec!(1000));
    }

    #[tokio::test]
    async fn confirm_update_targets_most_recent_provisional() {
        let (ledger, owner) = ledger_with_user().await;
        ledger
            .create_provisional(&owner, dec!(100), "primero", TransactionType::Expense, None, None, None)
            .await
            .unwrap();
        let second = ledger
            .create_provisional(&owner, dec!(200), "segundo", TransactionType::Expense, None, None, None)
            .await
            .unwrap();

        let updated = ledger
            .apply_confirm_update(&owner, Some("Oxxo".to_string()), Some(Category::Despensa))
            .await
            .unwrap();

        assert_eq!(updated.id, second.id);
        assert_eq!(updated.merchant, Some("Oxxo".to_string()));
        assert_eq!(updated.category, Some(Category::Despensa));
    }
}
