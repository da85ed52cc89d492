//! The auto-categorization capability the Ledger calls on verification
//! (spec §4.1 "Auto-categorization policy").
//!
//! Treats an LLM-backed capability as an injected trait object so the
//! Ledger stays testable without a live provider.

use async_trait::async_trait;
use numa_types::Category;

/// Best-effort classifier: a `None` return stands in for `ProviderError`
/// (spec §7 — "on ProviderError it leaves category as `Compras`").
#[async_trait]
pub trait CategoryClassifier: Send + Sync {
    async fn classify(&self, concept: &str, merchant: Option<&str>) -> Option<(Category, f32)>;
}

/// A classifier that never has an opinion — useful in tests that don't
/// care about auto-categorization, and as the Ledger's default when none is
/// configured.
pub struct NullClassifier;

#[async_trait]
impl CategoryClassifier for NullClassifier {
    async fn classify(&self, _concept: &str, _merchant: Option<&str>) -> Option<(Category, f32)> {
        None
    }
}
