//! Application state shared across handlers.

use std::sync::Arc;

use numa_orchestrator::Orchestrator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

/// CORS policy for the façade, mirroring `ServerConfig.api` (spec §6 ambient
/// server settings). Not part of the domain spec; purely an HTTP concern.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }

    /// State backed by a fully deterministic Orchestrator, suitable for
    /// handler tests that don't need live providers.
    #[cfg(test)]
    pub fn test() -> Self {
        use numa_guard::Guard;
        use numa_intent::FinancialIntentMotor;
        use numa_ledger::Ledger;
        use numa_orchestrator::FimCategoryClassifier;
        use std::time::Duration;

        let fim = Arc::new(FinancialIntentMotor::deterministic());
        let ledger = Ledger::new(Arc::new(FimCategoryClassifier::new(fim.clone())));
        let orchestrator = Orchestrator::new(ledger, fim, Guard::new(), Duration::from_secs(8));
        Self::new(Arc::new(orchestrator))
    }
}
