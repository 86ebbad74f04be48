use agora_config::Config;
use agora_core::util::truncate_chars;

/// List the models the configured key can use for text generation.
#[derive(Debug, Clone, Copy)]
pub struct ModelsStrategy;

impl super::CommandStrategy for ModelsStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let provider = super::gemini_provider(&config)?;

        let models = provider.list_models().await?;
        if models.is_empty() {
            println!("No models support generateContent for this key.");
            return Ok(());
        }

        println!("Models supporting generateContent:\n");
        for model in &models {
            println!("  {}", model.name);
            if !model.display_name.is_empty() {
                println!("    {}", model.display_name);
            }
            if !model.description.is_empty() {
                println!("    {}", truncate_chars(&model.description, 100));
            }
        }
        println!("\n{} models available", models.len());
        Ok(())
    }
}
