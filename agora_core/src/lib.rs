#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod error;
pub mod util;

pub use error::ModelError;

/// Speaker of a message in a debate session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Pro,
    Con,
    Moderator,
}

impl Role {
    /// The side a debater argues against. `User` and `Moderator` have none.
    #[must_use]
    pub const fn opponent(self) -> Option<Self> {
        match self {
            Self::Pro => Some(Self::Con),
            Self::Con => Some(Self::Pro),
            Self::User | Self::Moderator => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Pro => "pro",
            Self::Con => "con",
            Self::Moderator => "moderator",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "pro" => Ok(Self::Pro),
            "con" => Ok(Self::Con),
            "moderator" => Ok(Self::Moderator),
            _ => Err(anyhow::anyhow!("Invalid role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<Message>,
}

impl Session {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now(),
            messages: Vec::new(),
        }
    }

    /// Timestamp of the newest message, or the creation time for an empty session.
    #[must_use]
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.messages
            .last()
            .map_or(self.created_at, |m| m.timestamp)
    }

    #[must_use]
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.id.clone(),
            created_at: self.created_at,
            message_count: self.messages.len(),
            last_activity: self.last_activity(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: String,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
    pub last_activity: DateTime<Utc>,
}

/// Current round number derived from a message log: one plus the number of
/// moderator messages already stored.
#[must_use]
pub fn current_round(messages: &[Message]) -> u32 {
    let finished = messages
        .iter()
        .filter(|m| m.role == Role::Moderator)
        .count();
    u32::try_from(finished).unwrap_or(u32::MAX).saturating_add(1)
}

/// The three outputs produced by one debate round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct DebateTurn {
    pub pro: String,
    pub con: String,
    pub moderator: String,
}

impl DebateTurn {
    /// Stored order of a round's messages.
    #[must_use]
    pub fn messages(&self) -> [(Role, &str); 3] {
        [
            (Role::Pro, self.pro.as_str()),
            (Role::Con, self.con.as_str()),
            (Role::Moderator, self.moderator.as_str()),
        ]
    }
}

/// Sampling parameters for a single generation request. Omitted fields keep
/// their defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 1500,
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
        }
    }
}

impl GenerationParams {
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// A backend able to run text generation against a named model.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Check that `model` can be used with this provider and return its
    /// canonical identifier. Must not hit the network.
    fn load_model(&self, model: &str) -> anyhow::Result<String>;

    /// Run one generation request. `Ok(None)` means the model answered with
    /// an empty payload.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> anyhow::Result<Option<String>>;

    async fn count_tokens(&self, model: &str, text: &str) -> anyhow::Result<u32>;
}

#[async_trait]
impl<T: LLMProvider + ?Sized> LLMProvider for Arc<T> {
    fn load_model(&self, model: &str) -> anyhow::Result<String> {
        (**self).load_model(model)
    }

    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        params: &GenerationParams,
    ) -> anyhow::Result<Option<String>> {
        (**self).generate(model, prompt, params).await
    }

    async fn count_tokens(&self, model: &str, text: &str) -> anyhow::Result<u32> {
        (**self).count_tokens(model, text).await
    }
}

/// Keyed, ordered message logs.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Messages of a session in insertion order. Creates an empty session on miss.
    async fn get_history(&self, id: &str) -> anyhow::Result<Vec<Message>>;
    /// Append a timestamped message, creating the session if needed.
    async fn add_message(&self, id: &str, role: Role, content: &str) -> anyhow::Result<()>;
    /// Remove a session. Returns whether it existed.
    async fn clear_session(&self, id: &str) -> anyhow::Result<bool>;
    async fn list_sessions(&self) -> anyhow::Result<Vec<String>>;
    async fn session_info(&self, id: &str) -> anyhow::Result<Option<SessionInfo>>;
    /// Number of messages in a session, 0 when it does not exist.
    async fn message_count(&self, id: &str) -> anyhow::Result<usize>;
}

#[async_trait]
impl<T: SessionStorage + ?Sized> SessionStorage for Arc<T> {
    async fn get_history(&self, id: &str) -> anyhow::Result<Vec<Message>> {
        (**self).get_history(id).await
    }

    async fn add_message(&self, id: &str, role: Role, content: &str) -> anyhow::Result<()> {
        (**self).add_message(id, role, content).await
    }

    async fn clear_session(&self, id: &str) -> anyhow::Result<bool> {
        (**self).clear_session(id).await
    }

    async fn list_sessions(&self) -> anyhow::Result<Vec<String>> {
        (**self).list_sessions().await
    }

    async fn session_info(&self, id: &str) -> anyhow::Result<Option<SessionInfo>> {
        (**self).session_info(id).await
    }

    async fn message_count(&self, id: &str) -> anyhow::Result<usize> {
        (**self).message_count(id).await
    }
}
