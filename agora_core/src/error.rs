use thiserror::Error;

/// Failures surfaced by the model client.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Missing credential or no usable model identifier.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The upstream kept signalling rate limits until the retry budget ran out.
    #[error(
        "Rate limit exceeded after {attempts} attempts. Please wait a minute and try again."
    )]
    RateLimitExceeded { attempts: u32 },

    /// Any other upstream failure. Never retried.
    #[error("Model API error: {0}")]
    Model(String),

    #[error("Empty response from model")]
    EmptyResponse,
}
