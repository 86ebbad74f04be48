//! Static strategy pattern for CLI commands.
//!
//! Each subcommand is a stateless strategy type with its own input, so
//! `main` only parses arguments and dispatches.

use std::sync::Arc;

use agora_config::Config;
use agora_core::{LLMProvider, SessionStorage};
use agora_debate::{DebateOrchestrator, OrchestrationMode};
use agora_providers::{GeminiProvider, ModelClient};
use agora_session::SessionStore;
use tracing::info;

mod debate;
mod info;
mod init;
mod models;
mod serve;
mod tokens;
mod version;

pub use debate::{DebateInput, DebateStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use models::ModelsStrategy;
pub use serve::{ServeInput, ServeStrategy};
pub use tokens::{TokensInput, TokensStrategy};
pub use version::VersionStrategy;

/// Contract shared by all command strategies.
///
/// Strategies are stateless and dispatched statically. Each one declares
/// the input it needs through `Input`.
pub trait CommandStrategy: Send + Sync + 'static {
    type Input;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Gemini provider from the effective config. Fails without a credential.
fn gemini_provider(config: &Config) -> anyhow::Result<GeminiProvider> {
    Ok(
        GeminiProvider::new(config.model.api_key.clone(), config.model.request_timeout())?
            .with_base_url(config.model.base_url.clone()),
    )
}

fn model_client(config: &Config) -> anyhow::Result<ModelClient<Arc<dyn LLMProvider>>> {
    let provider: Arc<dyn LLMProvider> = Arc::new(gemini_provider(config)?);
    Ok(ModelClient::new(provider, &config.model.settings)?)
}

/// Orchestrator over Gemini and a fresh in-memory store.
fn build_orchestrator(
    config: &Config,
    mode: Option<OrchestrationMode>,
) -> anyhow::Result<DebateOrchestrator> {
    let client = model_client(config)?;
    let storage: Arc<dyn SessionStorage> = Arc::new(SessionStore::new());

    let mut settings = config.debate.settings.clone();
    if let Some(mode) = mode {
        info!("Orchestration mode overridden to {mode}");
        settings = settings.with_mode(mode);
    }

    Ok(DebateOrchestrator::new(client, storage, settings))
}
