use std::sync::Arc;

use crate::config::Config;
use crate::generation::orchestrator::Orchestrator;
use crate::history::HistoryStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Owns the completion client and the retry/backoff policy.
    pub orchestrator: Orchestrator,
    /// Pluggable history backend. Default: InMemoryHistory (newest 5).
    pub history: Arc<dyn HistoryStore>,
}
