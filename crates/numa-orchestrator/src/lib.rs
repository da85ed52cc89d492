//! Numa Orchestrator - dispatches one handler per classified utterance and
//! synthesizes the response envelope (spec §4.3).
//!
//! Two public entry points, one per channel:
//!
//! - `handle_voice(owner, audio) -> ResponseEnvelope`
//! - `handle_text(owner, text) -> ResponseEnvelope`
//!
//! Everything below them is sequential within one request: transcribe (voice
//! only) -> classify -> dispatch each `IntentRecord` in order -> respond.
//! Multiple WRITE_LOGs from one utterance are persisted in emitted order;
//! the first failure aborts the rest (spec §5 ordering guarantee).

pub mod classifier;
pub mod envelope;
pub mod error;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use numa_guard::Guard;
use numa_intent::{ClassificationCache, CompletionRequest, FinancialIntentMotor, Message};
use numa_ledger::{DailySummary, Ledger, ListFilter};
use numa_types::{Category, Intent, IntentRecord, Period, SteerKind, Transaction, TransactionId, TransactionType, UserId};
use rust_decimal::Decimal;
use tokio::time::timeout;
use tracing::warn;

pub use classifier::FimCategoryClassifier;
pub use envelope::{EnvelopeKind, ResponseEnvelope};
pub use error::{ErrorKind, OrchestratorError, Result};

/// Default per-request budget (spec §6 `request.deadline_ms`).
pub const DEFAULT_DEADLINE_MS: u64 = 8_000;

pub struct Orchestrator {
    ledger: Ledger,
    fim: Arc<FinancialIntentMotor>,
    guard: Guard,
    deadline: Duration,
}

impl Orchestrator {
    pub fn new(ledger: Ledger, fim: Arc<FinancialIntentMotor>, guard: Guard, deadline: Duration) -> Self {
        Self { ledger, fim, guard, deadline }
    }

    pub fn with_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.deadline = Duration::from_millis(deadline_ms);
        self
    }

    pub async fn handle_voice(&self, owner: &UserId, audio: &[u8]) -> ResponseEnvelope {
        match timeout(self.deadline, self.handle_voice_inner(owner, audio)).await {
            Ok(envelope) => envelope,
            Err(_) => ResponseEnvelope::error(ErrorKind::Timeout, "request deadline exceeded"),
        }
    }

    pub async fn handle_text(&self, owner: &UserId, text: &str) -> ResponseEnvelope {
        match timeout(self.deadline, self.handle_text_inner(owner, text)).await {
            Ok(envelope) => envelope,
            Err(_) => ResponseEnvelope::error(ErrorKind::Timeout, "request deadline exceeded"),
        }
    }

    pub async fn verify_document(
        &self,
        owner: &UserId,
        transaction_id: &TransactionId,
        document_bytes: &[u8],
    ) -> ResponseEnvelope {
        match timeout(
            self.deadline,
            self.verify_document_inner(owner, transaction_id, document_bytes),
        )
        .await
        {
            Ok(envelope) => envelope,
            Err(_) => ResponseEnvelope::error(ErrorKind::Timeout, "request deadline exceeded"),
        }
    }

    pub async fn manual_verify(&self, owner: &UserId, transaction_id: &TransactionId) -> ResponseEnvelope {
        match self.ledger.verify_manual(transaction_id, owner).await {
            Ok(tx) => ResponseEnvelope::transactions(vec![tx]),
            Err(e) => ResponseEnvelope::from_error(&OrchestratorError::from(e)),
        }
    }

    pub async fn list_transactions(&self, owner: &UserId, filter: &ListFilter) -> Vec<Transaction> {
        self.ledger.list_by_owner(owner, filter).await
    }

    /// Registers a new owner. Credential verification itself is the HTTP
    /// façade's concern (spec §6 `auth.secret`); the core only needs an
    /// owner to exist before it will accept writes against it.
    pub async fn register_user(&self, credential_hash: impl Into<String>) -> numa_types::User {
        self.ledger.register_user(credential_hash).await
    }

    pub async fn get_user(&self, id: &UserId) -> Option<numa_types::User> {
        self.ledger.get_user(id).await
    }

    pub async fn daily_summary(&self, owner: &UserId, date: NaiveDate) -> DailySummary {
        self.ledger.daily_summary(owner, date).await
    }

    // ------------------------------------------------------------------
    // Internals (unwrapped by the per-entry-point deadline above)
    // ------------------------------------------------------------------

    async fn handle_voice_inner(&self, owner: &UserId, audio: &[u8]) -> ResponseEnvelope {
        match self.fim.transcribe(audio).await {
            Ok(text) => self.handle_text_inner(owner, &text).await,
            Err(numa_intent::FimError::UnintelligibleAudio) => {
                ResponseEnvelope::error(ErrorKind::UnintelligibleAudio, "audio yielded no usable text")
            }
            Err(e) => ResponseEnvelope::from_error(&OrchestratorError::from(e)),
        }
    }

    async fn verify_document_inner(
        &self,
        owner: &UserId,
        transaction_id: &TransactionId,
        document_bytes: &[u8],
    ) -> ResponseEnvelope {
        let document = match self.fim.analyze_document(document_bytes).await {
            Ok(d) => d,
            Err(e) => return ResponseEnvelope::from_error(&OrchestratorError::from(e)),
        };
        match self.ledger.verify_with_document(transaction_id, owner, document).await {
            Ok(tx) => ResponseEnvelope::transactions(vec![tx]),
            Err(e) => ResponseEnvelope::from_error(&OrchestratorError::from(e)),
        }
    }

    async fn handle_text_inner(&self, owner: &UserId, text: &str) -> ResponseEnvelope {
        let mut cache = ClassificationCache::new();
        let records = self.fim.classify_cached(text, &mut cache);

        if records.iter().any(|r| r.intent == Intent::WriteLog) {
            return self.handle_write_logs(owner, records).await;
        }

        let record = &records[0];
        let result = match record.intent {
            Intent::ReadQuery => self.handle_read_query(owner, record).await,
            Intent::Advice => self.handle_advice(owner, record, false).await,
            Intent::Plan => self.handle_advice(owner, record, true).await,
            Intent::ConfirmUpdate => Ok(self.handle_confirm_update(owner, record).await),
            Intent::Steer => Ok(self.handle_steer(record)),
            Intent::Clarify => Ok(self.handle_clarify(record)),
            Intent::WriteLog => unreachable!("any WRITE_LOG routes through handle_write_logs above"),
        };

        result.unwrap_or_else(|e| ResponseEnvelope::from_error(&e))
    }

    // ------------------------------------------------------------------
    // Per-intent handlers
    // ------------------------------------------------------------------

    async fn handle_write_logs(&self, owner: &UserId, records: Vec<IntentRecord>) -> ResponseEnvelope {
        let mut created = Vec::with_capacity(records.len());
        for record in records {
            match self.create_from_record(owner, record).await {
                Ok(tx) => created.push(tx),
                Err(e) => {
                    warn!(owner = %owner, error = %e, "aborting remaining WRITE_LOGs after failure");
                    return ResponseEnvelope::partial_write(created, &e);
                }
            }
        }
        ResponseEnvelope::transactions(created)
    }

    async fn create_from_record(&self, owner: &UserId, record: IntentRecord) -> Result<Transaction> {
        if record.intent != Intent::WriteLog {
            let reason = record
                .entities
                .reason
                .clone()
                .unwrap_or_else(|| format!("{:?} is not WRITE_LOG", record.intent));
            return Err(OrchestratorError::UnresolvedClause(reason));
        }

        let amount = record
            .entities
            .amount
            .ok_or(OrchestratorError::MissingEntity("amount"))?;
        let concept = record
            .entities
            .concept
            .ok_or(OrchestratorError::MissingEntity("concept"))?;
        let kind = record.sub_intent.unwrap_or(TransactionType::Expense);

        self.ledger
            .create_provisional(
                owner,
                amount.value(),
                concept,
                kind,
                record.entities.merchant,
                record.entities.category,
                record.entities.date,
            )
            .await
            .map_err(Into::into)
    }

    async fn handle_read_query(&self, owner: &UserId, record: &IntentRecord) -> Result<ResponseEnvelope> {
        let filter = ListFilter {
            period: record.entities.period.clone(),
            category: record.entities.category,
            ..Default::default()
        };
        let result = self.ledger.sum_by_owner(owner, &filter).await;

        let context = format!(
            "Llevas {} pesos en {} movimiento(s) para el periodo consultado.",
            result.total, result.count
        );
        let request = CompletionRequest::new(vec![Message::user("resume ese gasto en una frase breve")])
            .with_system(context);
        let response = self.fim.humanize(request).await?;

        let permitted = vec![result.total, Decimal::from(result.count as i64)];
        self.guard.validate_response(&response.content, &permitted)?;

        Ok(ResponseEnvelope::chat(response.content))
    }

    async fn handle_advice(&self, owner: &UserId, record: &IntentRecord, is_plan: bool) -> Result<ResponseEnvelope> {
        let period = record.entities.period.clone().unwrap_or(Period::ThisMonth);

        let total_filter = ListFilter {
            period: Some(period.clone()),
            ..Default::default()
        };
        let total = self.ledger.sum_by_owner(owner, &total_filter).await;

        let mut permitted = vec![total.total, Decimal::from(total.count as i64)];
        let mut breakdown = Vec::new();
        for category in Category::all() {
            let cat_filter = ListFilter {
                period: Some(period.clone()),
                category: Some(*category),
                ..Default::default()
            };
            let cat_sum = self.ledger.sum_by_owner(owner, &cat_filter).await;
            if cat_sum.count > 0 {
                breakdown.push(format!("{}: {}", category.label(), cat_sum.total));
                permitted.push(cat_sum.total);
            }
        }

        let context = format!(
            "Gasto total del periodo: {} en {} movimiento(s). Desglose por categoría: {}.",
            total.total,
            total.count,
            if breakdown.is_empty() { "sin movimientos".to_string() } else { breakdown.join(", ") }
        );
        let ask = if is_plan {
            "propón un plan de ahorro breve basado en estos datos"
        } else {
            "da un consejo financiero breve basado en estos datos"
        };
        let request = CompletionRequest::new(vec![Message::user(ask)]).with_system(context);
        let response = self.fim.humanize(request).await?;

        self.guard.validate_response(&response.content, &permitted)?;
        Ok(ResponseEnvelope::chat(response.content))
    }

    async fn handle_confirm_update(&self, owner: &UserId, record: &IntentRecord) -> ResponseEnvelope {
        let updated = self
            .ledger
            .apply_confirm_update(owner, record.entities.merchant.clone(), record.entities.category)
            .await;
        match updated {
            Some(tx) => ResponseEnvelope::transactions(vec![tx]),
            None => ResponseEnvelope::chat("No tengo un movimiento provisional reciente para actualizar."),
        }
    }

    fn handle_steer(&self, record: &IntentRecord) -> ResponseEnvelope {
        let message = match record.steer_kind {
            Some(SteerKind::Social) => "¡Hola! Soy Numa. Cuéntame qué gastaste, ganaste, o qué quieres saber de tus finanzas.",
            Some(SteerKind::Meta) => "Ese comando todavía no se puede ejecutar desde aquí.",
            None => "No logré identificar de qué se trata, ¿puedes reformularlo?",
        };
        ResponseEnvelope::chat(message)
    }

    fn handle_clarify(&self, record: &IntentRecord) -> ResponseEnvelope {
        let reason = record.entities.reason.as_deref().unwrap_or("unintelligible");
        let message = if reason == "unintelligible" {
            "No logré entender eso, ¿puedes repetirlo?".to_string()
        } else {
            format!("Me falta información ({reason}). ¿Puedes dar el monto y el concepto?")
        };
        ResponseEnvelope::chat(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numa_ledger::Ledger;
    use numa_types::TransactionStatus;

    fn orchestrator() -> Orchestrator {
        let fim = Arc::new(FinancialIntentMotor::deterministic());
        let ledger = Ledger::new(Arc::new(FimCategoryClassifier::new(fim.clone())));
        Orchestrator::new(ledger, fim, Guard::new(), Duration::from_secs(8))
    }

    async fn register(orch: &Orchestrator) -> UserId {
        orch.ledger.register_user("hash").await.id
    }

    #[tokio::test]
    async fn single_write_log_produces_transaction_envelope() {
        let orch = orchestrator();
        let owner = register(&orch).await;
        let envelope = orch.handle_text(&owner, "Gasté 500 pesos en el súper").await;
        assert_eq!(envelope.kind, EnvelopeKind::Transaction);
        let data = envelope.data.unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].status, TransactionStatus::Provisional);
        assert_eq!(data[0].amount.value(), rust_decimal_macros::dec!(500));
    }

    #[tokio::test]
    async fn multi_clause_utterance_produces_two_transactions() {
        let orch = orchestrator();
        let owner = register(&orch).await;
        let envelope = orch.handle_text(&owner, "Gasté 100 en luz y 200 en agua").await;
        assert_eq!(envelope.kind, EnvelopeKind::Transaction);
        assert_eq!(envelope.data.unwrap().len(), 2);
        assert!(envelope.message.unwrap().contains("300"));
    }

    #[tokio::test]
    async fn mixed_write_log_and_unresolved_clause_does_not_panic() {
        let orch = orchestrator();
        let owner = register(&orch).await;
        // Second clause ("200") has an amount but no extractable concept and
        // resolves to CLARIFY instead of WRITE_LOG.
        let envelope = orch.handle_text(&owner, "Gasté 100 en luz y 200").await;
        assert_eq!(envelope.kind, EnvelopeKind::Error);
        assert_eq!(envelope.error_kind, Some(ErrorKind::InvalidEntity));
        // The clause that resolved before the failure is still reported as
        // succeeded (spec §5: abort the rest, don't roll back what landed).
        assert_eq!(envelope.data.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn bare_type_word_yields_chat_clarify_with_no_writes() {
        let orch = orchestrator();
        let owner = register(&orch).await;
        let envelope = orch.handle_text(&owner, "gasto").await;
        assert_eq!(envelope.kind, EnvelopeKind::Chat);
        assert!(orch.ledger.list_by_owner(&owner, &ListFilter::default()).await.is_empty());
    }

    #[tokio::test]
    async fn read_query_message_contains_precomputed_total() {
        let orch = orchestrator();
        let owner = register(&orch).await;
        orch.handle_text(&owner, "Gasté 500 en luz").await;
        orch.handle_text(&owner, "Gasté 300 en agua").await;

        let envelope = orch.handle_text(&owner, "¿cuánto gasté hoy?").await;
        assert_eq!(envelope.kind, EnvelopeKind::Chat);
        assert!(envelope.message.unwrap().contains("800"));
    }

    #[tokio::test]
    async fn empty_audio_returns_unintelligible_error_envelope_without_reasoning_call() {
        let orch = orchestrator();
        let owner = register(&orch).await;
        let envelope = orch.handle_voice(&owner, b"   ").await;
        assert_eq!(envelope.kind, EnvelopeKind::Error);
        assert_eq!(envelope.error_kind, Some(ErrorKind::UnintelligibleAudio));
    }

    #[tokio::test]
    async fn cross_tenant_manual_verify_is_not_found() {
        let orch = orchestrator();
        let owner_a = register(&orch).await;
        let owner_b = register(&orch).await;
        let created = orch.handle_text(&owner_a, "Gasté 50 en algo").await;
        let id = created.data.unwrap()[0].id.clone();

        let envelope = orch.manual_verify(&owner_b, &id).await;
        assert_eq!(envelope.kind, EnvelopeKind::Error);
        assert_eq!(envelope.error_kind, Some(ErrorKind::NotOwner));
    }

    #[tokio::test]
    async fn social_greeting_produces_chat_with_no_ledger_touch() {
        let orch = orchestrator();
        let owner = register(&orch).await;
        let envelope = orch.handle_text(&owner, "hola buenos días").await;
        assert_eq!(envelope.kind, EnvelopeKind::Chat);
        assert!(orch.ledger.list_by_owner(&owner, &ListFilter::default()).await.is_empty());
    }
}
