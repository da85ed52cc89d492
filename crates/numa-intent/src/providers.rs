//! External collaborator capabilities (spec §9 "duck-typed provider clients
//! become explicit capability contracts").
//!
//! Each capability is a trait with a deterministic fallback: callers
//! depend on the trait object, tests inject the fallback, a real deployment
//! injects an HTTP-backed implementation.

use async_trait::async_trait;
use numa_types::DocumentData;
use serde::Deserialize;

use crate::error::{FimError, Result};
use crate::types::{CompletionRequest, CompletionResponse};

/// Converts audio bytes to text (spec §4.2 `transcribe`).
#[async_trait]
pub trait Transcription: Send + Sync {
    async fn transcribe(&self, audio: &[u8], lang: &str) -> Result<String>;
}

/// Paraphrases precomputed context into a user-facing message (spec §4.3).
/// Never a source of numeric facts — see the zero-hallucination rule.
#[async_trait]
pub trait Reasoning: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

/// Extracts `{vendor, date, total_amount}` from a receipt document (spec
/// §6 `verify_document`).
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(&self, document: &[u8]) -> Result<DocumentData>;
}

// ----------------------------------------------------------------------
// Deterministic fallbacks
// ----------------------------------------------------------------------

/// Treats the uploaded bytes as already-transcribed UTF-8 text. Used when
/// no STT provider is configured, and by tests that want to drive the
/// voice path without synthesizing real audio.
pub struct DeterministicTranscription;

#[async_trait]
impl Transcription for DeterministicTranscription {
    async fn transcribe(&self, audio: &[u8], _lang: &str) -> Result<String> {
        let text = std::str::from_utf8(audio)
            .map_err(|_| FimError::UnintelligibleAudio)?
            .trim()
            .to_string();
        if text.is_empty() {
            return Err(FimError::UnintelligibleAudio);
        }
        Ok(text)
    }
}

/// Echoes the system prompt's injected context back verbatim, i.e. does
/// the minimum paraphrasing possible without inventing a number.
pub struct DeterministicReasoning;

#[async_trait]
impl Reasoning for DeterministicReasoning {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let content = request
            .system
            .or_else(|| request.messages.last().map(|m| m.content.clone()))
            .unwrap_or_default();
        Ok(CompletionResponse::new(content))
    }
}

/// Refuses to analyze anything — used when document verification is
/// disabled, or in tests that only exercise `verify_manual`.
pub struct DeterministicDocumentAnalyzer;

#[async_trait]
impl DocumentAnalyzer for DeterministicDocumentAnalyzer {
    async fn analyze(&self, _document: &[u8]) -> Result<DocumentData> {
        Err(FimError::InvalidDocument(
            "no document analyzer configured".to_string(),
        ))
    }
}

// ----------------------------------------------------------------------
// HTTP-backed implementations
// ----------------------------------------------------------------------

/// Speaks to an OpenAI-compatible speech-to-text endpoint.
pub struct HttpTranscription {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTranscription {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct SttResponse {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl Transcription for HttpTranscription {
    async fn transcribe(&self, audio: &[u8], lang: &str) -> Result<String> {
        let url = format!("{}/v1/audio/transcriptions", self.base_url);
        let form = reqwest::multipart::Form::new()
            .text("language", lang.to_string())
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio.to_vec()).file_name("audio.bin"),
            );

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| FimError::ProviderError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FimError::ProviderError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: SttResponse = response
            .json()
            .await
            .map_err(|e| FimError::ProviderError(e.to_string()))?;

        let text = body.text.trim().to_string();
        if text.is_empty() {
            return Err(FimError::UnintelligibleAudio);
        }
        Ok(text)
    }
}

/// Speaks to an OpenAI-compatible chat-completions endpoint, used only for
/// paraphrasing precomputed context (never for numeric generation).
pub struct HttpReasoning {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpReasoning {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::new(
            std::env::var("NUMA_REASONING_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/v1".to_string()),
            std::env::var("NUMA_REASONING_API_KEY").ok(),
        )
    }
}

#[derive(serde::Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(serde::Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Deserialize)]
struct ChatMessageOut {
    content: String,
}

#[async_trait]
impl Reasoning for HttpReasoning {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let mut messages = vec![];
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        for m in &request.messages {
            messages.push(ChatMessage {
                role: match m.role {
                    crate::types::MessageRole::System => "system",
                    crate::types::MessageRole::User => "user",
                }
                .to_string(),
                content: m.content.clone(),
            });
        }

        let chat_request = ChatRequest {
            model: request.model.unwrap_or_else(|| "flash".to_string()),
            messages,
            temperature: request.temperature,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut req = self.client.post(&url).json(&chat_request);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| FimError::ProviderError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FimError::ProviderError(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| FimError::ProviderError(e.to_string()))?;

        let content = body
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();
        Ok(CompletionResponse::new(content))
    }
}

/// One retry with jittered backoff for `ProviderError` (spec §7).
pub async fn with_one_retry<T, F, Fut>(mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    match call().await {
        Ok(v) => Ok(v),
        Err(FimError::ProviderError(_)) => {
            let jitter_ms = rand::random::<u64>() % 100 + 50;
            tokio::time::sleep(std::time::Duration::from_millis(jitter_ms)).await;
            call().await
        }
        Err(other) => Err(other),
    }
}
