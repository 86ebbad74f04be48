use std::time::Duration;

use agora_core::{GenerationParams, LLMProvider, ModelError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info};

/// Public Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// A model advertised by the API as supporting `generateContent`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub display_name: String,
    pub description: String,
}

pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, ModelError> {
        if api_key.trim().is_empty() {
            return Err(ModelError::Configuration(
                "GEMINI_API_KEY is not set. Add it to your environment or .env file".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ModelError::Configuration(format!("Cannot build HTTP client: {e}")))?;

        info!("Creating GeminiProvider");
        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Send a request and return the JSON body. Non-2xx statuses become
    /// errors carrying the status line and the raw body, so rate-limit hints
    /// in the payload stay visible to the retry classifier.
    async fn send(&self, request: reqwest::RequestBuilder) -> anyhow::Result<Value> {
        let response = request.header(API_KEY_HEADER, &self.api_key).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("HTTP {status}: {body}");
        }

        Ok(response.json::<Value>().await?)
    }

    /// List models that support text generation.
    pub async fn list_models(&self) -> anyhow::Result<Vec<ModelInfo>> {
        let response = self
            .send(
                self.client
                    .get(format!("{}/models?pageSize=1000", self.base_url)),
            )
            .await?;

        let models = response["models"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter(|m| {
                        m["supportedGenerationMethods"]
                            .as_array()
                            .is_some_and(|methods| {
                                methods.iter().any(|v| v.as_str() == Some("generateContent"))
                            })
                    })
                    .map(|m| ModelInfo {
                        name: m["name"].as_str().unwrap_or_default().to_string(),
                        display_name: m["displayName"].as_str().unwrap_or_default().to_string(),
                        description: m["description"].as_str().unwrap_or_default().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(models)
    }
}

fn request_contents(text: &str) -> Value {
    json!([{ "parts": [{ "text": text }] }])
}

/// Concatenated text parts of the first candidate, `None` when there are none.
fn extract_text(response: &Value) -> Option<String> {
    let text: String = response["candidates"][0]["content"]["parts"]
        .as_array()?
        .iter()
        .filter_map(|part| part["text"].as_str())
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn load_model(&self, model: &str) -> anyhow::Result<String> {
        let name = model.trim();
        let id = name.strip_prefix("models/").unwrap_or(name);

        if id.is_empty() || id.contains('/') || id.chars().any(char::is_whitespace) {
            anyhow::bail!("Invalid model identifier: {model:?}");
        }

        Ok(format!("models/{id}"))
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> anyhow::Result<Option<String>> {
        let request = json!({
            "contents": request_contents(prompt),
            "generationConfig": {
                "maxOutputTokens": params.max_tokens,
                "temperature": params.temperature,
                "topP": params.top_p,
                "topK": params.top_k,
            },
        });

        debug!(
            "Sending request to Gemini API: model={}, prompt_chars={}",
            model,
            prompt.chars().count()
        );

        let response = self
            .send(
                self.client
                    .post(format!("{}/{model}:generateContent", self.base_url))
                    .json(&request),
            )
            .await?;

        if let Some(reason) = response["promptFeedback"]["blockReason"].as_str() {
            info!("Gemini blocked the prompt: {reason}");
        }

        Ok(extract_text(&response))
    }

    async fn count_tokens(&self, model: &str, text: &str) -> anyhow::Result<u32> {
        let response = self
            .send(
                self.client
                    .post(format!("{}/{model}:countTokens", self.base_url))
                    .json(&json!({ "contents": request_contents(text) })),
            )
            .await?;

        let total = response["totalTokens"]
            .as_u64()
            .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing totalTokens"))?;

        Ok(u32::try_from(total)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiProvider {
        match GeminiProvider::new("test-key".to_string(), Duration::from_secs(5)) {
            Ok(p) => p,
            Err(e) => panic!("provider should build: {e}"),
        }
    }

    #[test]
    fn empty_key_is_a_configuration_error() {
        let result = GeminiProvider::new("  ".to_string(), Duration::from_secs(5));
        assert!(matches!(result, Err(ModelError::Configuration(_))));
    }

    #[test]
    fn model_names_are_normalized() {
        let p = provider();
        assert_eq!(
            p.load_model("gemini-2.5-flash").ok().as_deref(),
            Some("models/gemini-2.5-flash")
        );
        assert_eq!(
            p.load_model("models/gemini-2.0-flash").ok().as_deref(),
            Some("models/gemini-2.0-flash")
        );
        assert!(p.load_model("").is_err());
        assert!(p.load_model("models/").is_err());
        assert!(p.load_model("gemini pro").is_err());
        assert!(p.load_model("tunedModels/x/y").is_err());
    }

    #[test]
    fn text_parts_are_concatenated() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello " }, { "text": "world" }] }
            }]
        });
        assert_eq!(extract_text(&response).as_deref(), Some("Hello world"));
    }

    #[test]
    fn missing_candidates_mean_empty_payload() {
        assert_eq!(extract_text(&json!({ "candidates": [] })), None);
        assert_eq!(
            extract_text(&json!({ "promptFeedback": { "blockReason": "SAFETY" } })),
            None
        );
        let blank = json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] });
        assert_eq!(extract_text(&blank), None);
    }

    #[test]
    fn base_url_drops_trailing_slash() {
        let p = provider().with_base_url("http://localhost:8080/v1beta/".to_string());
        assert_eq!(p.base_url, "http://localhost:8080/v1beta");
    }
}
