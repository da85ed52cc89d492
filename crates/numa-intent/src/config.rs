//! Tunable thresholds for the cascade (spec §6 "recognized configuration
//! options").

use serde::{Deserialize, Serialize};

fn default_stt_language() -> String {
    "es-MX".to_string()
}

fn default_stt_model() -> String {
    "latest-long".to_string()
}

fn default_reasoning_model() -> String {
    "flash".to_string()
}

fn default_confidence_threshold() -> f32 {
    0.7
}

fn default_ant_expense_threshold() -> rust_decimal::Decimal {
    rust_decimal::Decimal::from(200)
}

/// Mirrors the `stt.*` / `reasoning.*` / `intent.*` / `ant_expense.*`
/// options enumerated in spec.md §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FimConfig {
    pub stt_language: String,
    pub stt_model: String,
    pub reasoning_model: String,
    pub confidence_threshold: f32,
    pub ant_expense_threshold: rust_decimal::Decimal,
}

impl Default for FimConfig {
    fn default() -> Self {
        Self {
            stt_language: default_stt_language(),
            stt_model: default_stt_model(),
            reasoning_model: default_reasoning_model(),
            confidence_threshold: default_confidence_threshold(),
            ant_expense_threshold: default_ant_expense_threshold(),
        }
    }
}
