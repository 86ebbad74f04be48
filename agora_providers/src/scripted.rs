//! An offline [`LLMProvider`] that replays queued responses.
//!
//! Used by tests across the workspace to drive the model client and the
//! debate orchestrator without network access.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use agora_core::{GenerationParams, LLMProvider};
use async_trait::async_trait;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Empty,
    Error(String),
}

#[derive(Debug, Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Reply>>,
    repeat: Option<String>,
    rejected_models: Vec<String>,
    token_count: Option<u32>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }

    #[must_use]
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(Reply::Text(text.into()))
    }

    #[must_use]
    pub fn with_empty_response(self) -> Self {
        self.push(Reply::Empty)
    }

    #[must_use]
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.push(Reply::Error(message.into()))
    }

    /// Answer with `text` whenever the queue is empty.
    #[must_use]
    pub fn repeating(mut self, text: impl Into<String>) -> Self {
        self.repeat = Some(text.into());
        self
    }

    #[must_use]
    pub fn rejecting_model(mut self, model: impl Into<String>) -> Self {
        self.rejected_models.push(model.into());
        self
    }

    #[must_use]
    pub const fn with_token_count(mut self, count: u32) -> Self {
        self.token_count = Some(count);
        self
    }

    /// Number of `generate` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received by `generate`, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn load_model(&self, model: &str) -> anyhow::Result<String> {
        if self.rejected_models.iter().any(|m| m == model) {
            anyhow::bail!("model {model} is not available");
        }
        Ok(model.to_string())
    }

    async fn generate(
        &self,
        _model: &str,
        prompt: &str,
        _params: &GenerationParams,
    ) -> anyhow::Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        let next = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match next {
            Some(Reply::Text(text)) => Ok(Some(text)),
            Some(Reply::Empty) => Ok(None),
            Some(Reply::Error(message)) => Err(anyhow::anyhow!(message)),
            None => self
                .repeat
                .clone()
                .map(Some)
                .ok_or_else(|| anyhow::anyhow!("scripted provider has no replies left")),
        }
    }

    async fn count_tokens(&self, _model: &str, _text: &str) -> anyhow::Result<u32> {
        self.token_count
            .ok_or_else(|| anyhow::anyhow!("token counting is not scripted"))
    }
}
