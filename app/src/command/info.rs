use agora_config::{API_KEY_ENV, Config};
use agora_core::util::mask_secret;

/// Print the effective configuration. The API key is masked.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== agora Configuration ===\n");
        println!("Config file: {}", Config::config_path()?.display());
        println!();

        println!("API Key:");
        println!("  {API_KEY_ENV}: {}", mask_secret(&config.model.api_key));
        println!();

        println!("Server:");
        println!("  Address: {}", config.server.address());
        println!();

        let model = &config.model;
        println!("Model:");
        println!("  Candidates: {}", model.settings.candidates.join(", "));
        println!("  Fallback: {}", model.settings.fallback);
        println!("  Max Retries: {}", model.settings.max_retries);
        println!("  Base URL: {}", model.base_url);
        println!("  Request Timeout: {}s", model.request_timeout_secs);
        println!();

        let debate = &config.debate.settings;
        println!("Debate:");
        println!("  Mode: {}", debate.mode);
        println!("  Default Rounds: {}", config.debate.default_rounds);
        println!("  Max Rounds: {}", debate.max_rounds);
        println!("  Inter-call Delay: {}s", debate.inter_call_delay_secs);
        println!("  Opening Budget: {}", debate.prompts.opening_words);
        println!("  Continuation Budget: {}", debate.prompts.continuation_words);
        println!("  Moderator Budget: {}", debate.prompts.moderator_words);
        println!(
            "  Quote Length: {} chars (moderator {})",
            debate.prompts.quote_chars, debate.prompts.moderator_quote_chars
        );
        println!();

        println!("Sampling (max tokens / temperature):");
        for (name, params) in [
            ("Pro", &debate.sampling.pro),
            ("Con", &debate.sampling.con),
            ("Moderator", &debate.sampling.moderator),
            ("Combined", &debate.sampling.combined),
        ] {
            println!("  {name}: {} / {}", params.max_tokens, params.temperature);
        }

        Ok(())
    }
}
