use agora_config::Config;
use agora_server::{AppState, Server};
use tracing::info;

#[derive(Debug, Clone)]
pub struct ServeInput {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Run the HTTP API until interrupted.
#[derive(Debug, Clone, Copy)]
pub struct ServeStrategy;

impl super::CommandStrategy for ServeStrategy {
    type Input = ServeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        if let Some(host) = input.host {
            config.server.host = host;
        }
        if let Some(port) = input.port {
            config.server.port = port;
        }

        let orchestrator = super::build_orchestrator(&config, None)?;
        info!(
            "Debate settings: mode={}, default_rounds={}, max_rounds={}",
            orchestrator.settings().mode,
            config.debate.default_rounds,
            orchestrator.settings().max_rounds
        );

        let state = AppState::new(orchestrator, config.debate.default_rounds);
        Server::new(config.server.address(), state).run().await
    }
}
