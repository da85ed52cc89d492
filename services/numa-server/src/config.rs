//! Server configuration.
//!
//! Layered: optional config file, then `NUMA__`-prefixed environment
//! variables, then CLI flags (applied by the caller after `load`).

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub fim: FimSettings,

    #[serde(default)]
    pub ledger: LedgerSettings,

    #[serde(default)]
    pub request: RequestSettings,

    #[serde(default)]
    pub auth: AuthSettings,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("invalid socket address")
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// spec §6 `stt.language` / `stt.model` / `reasoning.model`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FimSettings {
    #[serde(default = "default_stt_language")]
    pub stt_language: String,

    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    #[serde(default = "default_reasoning_model")]
    pub reasoning_model: String,
}

impl Default for FimSettings {
    fn default() -> Self {
        Self {
            stt_language: default_stt_language(),
            stt_model: default_stt_model(),
            reasoning_model: default_reasoning_model(),
        }
    }
}

/// spec §6 `intent.confidence_threshold` / `ant_expense.threshold`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSettings {
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    #[serde(default = "default_ant_expense_threshold")]
    pub ant_expense_threshold: f64,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            ant_expense_threshold: default_ant_expense_threshold(),
        }
    }
}

/// spec §6 `request.deadline_ms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSettings {
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self { deadline_ms: default_deadline_ms() }
    }
}

/// spec §6 `auth.secret` — credential verification is the façade's concern;
/// the core never sees this value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default = "default_auth_secret")]
    pub secret: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self { secret: default_auth_secret() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: default_cors_origins(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_shutdown_timeout() -> u64 {
    30
}
fn default_stt_language() -> String {
    "es-MX".to_string()
}
fn default_stt_model() -> String {
    "long-form".to_string()
}
fn default_reasoning_model() -> String {
    "flash".to_string()
}
fn default_confidence_threshold() -> f32 {
    0.7
}
fn default_ant_expense_threshold() -> f64 {
    200.0
}
fn default_deadline_ms() -> u64 {
    8000
}
fn default_auth_secret() -> String {
    "change-me-in-production".to_string()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}
fn default_true() -> bool {
    true
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();

        let mut builder = config::Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        builder = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));
        builder = builder.add_source(
            config::Environment::with_prefix("NUMA")
                .separator("__")
                .try_parsing(true),
        );

        let built = builder.build()?;
        let server_config: ServerConfig = built.try_deserialize().unwrap_or_else(|_| {
            tracing::warn!("using default configuration - some settings may need adjustment");
            ServerConfig::default()
        });
        Ok(server_config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            fim: FimSettings::default(),
            ledger: LedgerSettings::default(),
            request: RequestSettings::default(),
            auth: AuthSettings::default(),
            api: ApiSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = ServerConfig::default();
        assert_eq!(config.fim.stt_language, "es-MX");
        assert_eq!(config.ledger.confidence_threshold, 0.7);
        assert_eq!(config.request.deadline_ms, 8000);
    }
}
