//! Adapts `FinancialIntentMotor::classify_category` to `numa_ledger`'s
//! `CategoryClassifier` capability trait. Lives here rather than in
//! `numa-intent` because `numa-intent` deliberately has no dependency on
//! `numa-ledger` — this crate is the first place both are in scope.

use async_trait::async_trait;
use numa_ledger::CategoryClassifier;
use numa_types::Category;
use std::sync::Arc;

pub struct FimCategoryClassifier(Arc<numa_intent::FinancialIntentMotor>);

impl FimCategoryClassifier {
    pub fn new(fim: Arc<numa_intent::FinancialIntentMotor>) -> Self {
        Self(fim)
    }
}

#[async_trait]
impl CategoryClassifier for FimCategoryClassifier {
    async fn classify(&self, concept: &str, merchant: Option<&str>) -> Option<(Category, f32)> {
        Some(self.0.classify_category(concept, merchant))
    }
}
