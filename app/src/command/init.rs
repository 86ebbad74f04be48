use agora_config::Config;

/// Write the default configuration to `~/agora/config.json`.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        Config::create_config()
    }
}
