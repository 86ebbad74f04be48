use std::sync::Arc;

use agora_debate::DebateOrchestrator;

/// Shared handler state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<DebateOrchestrator>,
    /// Rounds used when a start request leaves `rounds` out.
    pub default_rounds: u32,
}

impl AppState {
    #[must_use]
    pub fn new(orchestrator: DebateOrchestrator, default_rounds: u32) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            default_rounds,
        }
    }
}
