use agora_config::Config;

#[derive(Debug, Clone)]
pub struct TokensInput {
    pub text: String,
}

/// Count tokens for `text` with the selected model.
#[derive(Debug, Clone, Copy)]
pub struct TokensStrategy;

impl super::CommandStrategy for TokensStrategy {
    type Input = TokensInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let client = super::model_client(&config)?;

        let count = client.count_tokens(&input.text).await;
        println!("{count} tokens ({})", client.model());
        Ok(())
    }
}
