use agora_core::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DebateError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No debate has been started for session: {0}")]
    NotStarted(String),

    #[error("Session storage error: {0}")]
    Storage(#[from] anyhow::Error),
}
