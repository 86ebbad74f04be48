use agora_core::{GenerationParams, LLMProvider, ModelError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::retry::{RetryPolicy, retry_on_rate_limit};

/// Models tried in order when the client starts.
pub const DEFAULT_MODEL_CANDIDATES: [&str; 5] = [
    "models/gemini-2.5-flash",
    "models/gemini-flash-latest",
    "models/gemini-2.0-flash",
    "models/gemini-pro-latest",
    "models/gemini-2.5-pro",
];

/// Used when none of the candidates can be loaded.
pub const FALLBACK_MODEL: &str = "models/gemini-2.5-flash";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default = "ModelSettings::default_candidates")]
    pub candidates: Vec<String>,
    #[serde(default = "ModelSettings::default_fallback")]
    pub fallback: String,
    #[serde(default = "ModelSettings::default_max_retries")]
    pub max_retries: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            candidates: Self::default_candidates(),
            fallback: Self::default_fallback(),
            max_retries: Self::default_max_retries(),
        }
    }
}

impl ModelSettings {
    fn default_candidates() -> Vec<String> {
        DEFAULT_MODEL_CANDIDATES
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn default_fallback() -> String {
        FALLBACK_MODEL.to_string()
    }

    const fn default_max_retries() -> u32 {
        3
    }
}

/// Wraps an [`LLMProvider`] bound to one selected model, with rate-limit
/// aware retries.
pub struct ModelClient<P> {
    provider: P,
    model: String,
    retry: RetryPolicy,
}

impl<P: LLMProvider> ModelClient<P> {
    /// Select the first candidate model the provider accepts, then the
    /// fallback. Fails with [`ModelError::Configuration`] when neither works.
    pub fn new(provider: P, settings: &ModelSettings) -> Result<Self, ModelError> {
        let mut selected = None;

        for candidate in &settings.candidates {
            match provider.load_model(candidate) {
                Ok(model) => {
                    selected = Some(model);
                    break;
                }
                Err(e) => warn!("Trying {candidate}... failed: {e}"),
            }
        }

        let model = match selected {
            Some(model) => {
                info!("Model client initialized with model: {model}");
                model
            }
            None => {
                let model = provider.load_model(&settings.fallback).map_err(|e| {
                    ModelError::Configuration(format!(
                        "Could not initialize any model (fallback {}: {e})",
                        settings.fallback
                    ))
                })?;
                info!("Model client initialized with model: {model} (fallback)");
                model
            }
        };

        Ok(Self {
            provider,
            model,
            retry: RetryPolicy::default().with_max_retries(settings.max_retries),
        })
    }

    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Generate with the configured retry budget.
    pub async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, ModelError> {
        self.generate_with_retries(prompt, params, self.retry.max_retries)
            .await
    }

    /// Generate text, retrying up to `max_retries` attempts on rate limits.
    /// Returns the trimmed text.
    pub async fn generate_with_retries(
        &self,
        prompt: &str,
        params: &GenerationParams,
        max_retries: u32,
    ) -> Result<String, ModelError> {
        let policy = self.retry.with_max_retries(max_retries);

        let text = retry_on_rate_limit(
            || self.provider.generate(&self.model, prompt, params),
            &policy,
        )
        .await?;

        match text.map(|t| t.trim().to_string()) {
            Some(t) if !t.is_empty() => Ok(t),
            _ => Err(ModelError::EmptyResponse),
        }
    }

    /// Best-effort token count. Falls back to `chars / 4`.
    pub async fn count_tokens(&self, text: &str) -> u32 {
        match self.provider.count_tokens(&self.model, text).await {
            Ok(count) => count,
            Err(e) => {
                warn!("Could not count tokens: {e}");
                u32::try_from(text.chars().count() / 4).unwrap_or(u32::MAX)
            }
        }
    }
}
