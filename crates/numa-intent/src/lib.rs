//! Numa Intent - the Financial Intent Motor (FIM)
//!
//! Stateless: no per-user memory, no DB access. Three public operations:
//!
//! 1. `transcribe` — delegates to an external STT capability
//! 2. `classify` — the deterministic 3-level cascade (spec §4.2)
//! 3. `classify_category` — closed-taxonomy auto-categorization
//!
//! ## Key design principles
//!
//! 1. Raw audio is never forwarded to the reasoning stage — only
//!    text-normalized input enters classification.
//! 2. The cascade is a pure, total function: identical text in, identical
//!    `IntentRecord` list out.
//! 3. Deterministic fallbacks stand in for every external collaborator so
//!    the motor is fully testable without live providers.

pub mod cascade;
pub mod category;
pub mod config;
pub mod error;
pub mod providers;
pub mod types;

use numa_types::{Category, DocumentData, IntentRecord};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub use config::FimConfig;
pub use error::{FimError, Result};
pub use providers::{
    with_one_retry, DeterministicDocumentAnalyzer, DeterministicReasoning,
    DeterministicTranscription, DocumentAnalyzer, HttpReasoning, HttpTranscription, Reasoning,
    Transcription,
};
pub use types::{CompletionRequest, CompletionResponse, Message, MessageRole};

/// Request-scoped memoization for repeated `classify` calls on identical
/// text (spec §5 "a request-local cache ... is permitted"). Never shared
/// across requests — construct one per incoming request and drop it
/// afterward.
#[derive(Default)]
pub struct ClassificationCache(HashMap<String, Vec<IntentRecord>>);

impl ClassificationCache {
    pub fn new() -> Self {
        Self::default()
    }
}

/// The Financial Intent Motor.
pub struct FinancialIntentMotor {
    transcription: Arc<dyn Transcription>,
    reasoning: Arc<dyn Reasoning>,
    document_analyzer: Arc<dyn DocumentAnalyzer>,
    config: FimConfig,
}

impl FinancialIntentMotor {
    pub fn new(
        transcription: Arc<dyn Transcription>,
        reasoning: Arc<dyn Reasoning>,
        document_analyzer: Arc<dyn DocumentAnalyzer>,
        config: FimConfig,
    ) -> Self {
        Self {
            transcription,
            reasoning,
            document_analyzer,
            config,
        }
    }

    /// Fully deterministic motor: no live provider calls, suitable for
    /// unit and integration tests.
    pub fn deterministic() -> Self {
        Self::new(
            Arc::new(DeterministicTranscription),
            Arc::new(DeterministicReasoning),
            Arc::new(DeterministicDocumentAnalyzer),
            FimConfig::default(),
        )
    }

    pub fn config(&self) -> &FimConfig {
        &self.config
    }

    /// `transcribe(audio_bytes) -> text` (spec §4.2). One retry with
    /// jittered backoff on `ProviderError` (spec §7); `UnintelligibleAudio`
    /// is terminal and never retried.
    pub async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        let lang = self.config.stt_language.clone();
        with_one_retry(|| {
            let transcription = self.transcription.clone();
            let audio = audio.to_vec();
            let lang = lang.clone();
            async move { transcription.transcribe(&audio, &lang).await }
        })
        .await
    }

    /// `classify(text) -> Vec<IntentRecord>` (spec §4.2). Equivalent to
    /// `classify_cached` with a throwaway cache — use `classify_cached`
    /// when the same text may recur within one request.
    pub fn classify(&self, text: &str) -> Vec<IntentRecord> {
        self.classify_cached(text, &mut ClassificationCache::new())
    }

    /// Same as `classify`, but checks/populates a caller-supplied
    /// request-local cache first (spec §5, SPEC_FULL §3). The cache must
    /// not outlive the request it was created for.
    pub fn classify_cached(&self, text: &str, cache: &mut ClassificationCache) -> Vec<IntentRecord> {
        if let Some(hit) = cache.0.get(text) {
            return hit.clone();
        }
        let records = cascade::classify(
            text,
            self.config.confidence_threshold,
            self.config.ant_expense_threshold,
        );
        cache.0.insert(text.to_string(), records.clone());
        debug!(text, count = records.len(), "classified utterance");
        records
    }

    /// `classify_category(concept, merchant) -> {category, confidence}`
    /// (spec §4.2).
    pub fn classify_category(&self, concept: &str, merchant: Option<&str>) -> (Category, f32) {
        category::classify_category(concept, merchant)
    }

    /// Paraphrases precomputed context into a user-facing message. Never a
    /// source of numeric facts (spec §4.3 zero-hallucination rule) — the
    /// caller is responsible for ensuring every number in `request` was
    /// already computed by the Ledger.
    pub async fn humanize(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let reasoning = self.reasoning.clone();
        with_one_retry(move || {
            let reasoning = reasoning.clone();
            let request = request.clone();
            async move { reasoning.complete(request).await }
        })
        .await
    }

    /// `verify_document`'s document-analyzer call (spec §6).
    pub async fn analyze_document(&self, document: &[u8]) -> Result<DocumentData> {
        self.document_analyzer.analyze(document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numa_types::Intent;

    #[tokio::test]
    async fn deterministic_transcription_echoes_text_bytes() {
        let fim = FinancialIntentMotor::deterministic();
        let text = fim.transcribe("Gasté 200 en tacos".as_bytes()).await.unwrap();
        assert_eq!(text, "Gasté 200 en tacos");
    }

    #[tokio::test]
    async fn empty_audio_is_unintelligible() {
        let fim = FinancialIntentMotor::deterministic();
        let err = fim.transcribe(b"   ").await.unwrap_err();
        assert!(matches!(err, FimError::UnintelligibleAudio));
    }

    #[test]
    fn classify_is_pure_across_calls() {
        let fim = FinancialIntentMotor::deterministic();
        let a = fim.classify("Gasté 500 pesos en el súper");
        let b = fim.classify("Gasté 500 pesos en el súper");
        assert_eq!(a.len(), b.len());
        assert_eq!(a[0].intent, b[0].intent);
        assert_eq!(a[0].entities.amount, b[0].entities.amount);
    }

    #[tokio::test]
    async fn humanize_never_invents_numbers_outside_the_injected_context() {
        let fim = FinancialIntentMotor::deterministic();
        let request = CompletionRequest::new(vec![Message::user("¿cuánto gasté hoy?")])
            .with_system("Hoy llevas 800 pesos gastados.");
        let response = fim.humanize(request).await.unwrap();
        assert!(response.content.contains("800"));
    }

    #[test]
    fn classify_category_is_deterministic_and_in_taxonomy() {
        let fim = FinancialIntentMotor::deterministic();
        let (category, confidence) = fim.classify_category("pago de luz", None);
        assert!(numa_types::Category::all().contains(&category));
        assert!(confidence > 0.0);
        assert_eq!(category, numa_types::Category::Servicios);
    }

    #[test]
    fn single_clause_read_query_is_read_query_intent() {
        let fim = FinancialIntentMotor::deterministic();
        let records = fim.classify("¿cuánto gasté hoy?");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].intent, Intent::ReadQuery);
    }
}
