use std::future::Future;
use std::time::Duration;

use agora_core::ModelError;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::time::sleep;
use tracing::{error, warn};

static RETRY_IN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(?i)retry in (\d+(?:\.\d+)?)").ok());

static RETRY_DELAY_FIELD: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#""retryDelay"\s*:\s*"(\d+(?:\.\d+)?)s""#).ok());

/// Substrings that mark an upstream error as a rate-limit or quota signal.
const RATE_LIMIT_MARKERS: [&str; 4] = ["429", "quota", "rate limit", "resource_exhausted"];

/// How long to back off when the upstream reports a rate limit.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_retries: u32,
    /// Backoff unit used when the server gives no hint: `unit * (attempt + 1)`.
    pub backoff_unit: Duration,
    /// Added on top of a server-suggested wait.
    pub hint_margin: Duration,
    /// Ceiling for any single wait, hinted or not.
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_unit: Duration::from_secs(20),
            hint_margin: Duration::from_secs(1),
            max_wait: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Wait before the attempt following `attempt` (zero based).
    #[must_use]
    pub fn wait_for(&self, attempt: u32, error_text: &str) -> Duration {
        parse_retry_hint(error_text)
            .map_or_else(
                || self.backoff_unit.saturating_mul(attempt.saturating_add(1)),
                |hint| hint.saturating_add(self.hint_margin),
            )
            .min(self.max_wait)
    }
}

#[must_use]
pub fn is_rate_limit(error_text: &str) -> bool {
    let lower = error_text.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|m| lower.contains(m))
}

/// Server-suggested wait, from `retry in 3.5s` or a `"retryDelay": "3s"` field.
#[must_use]
pub fn parse_retry_hint(error_text: &str) -> Option<Duration> {
    [&*RETRY_IN, &*RETRY_DELAY_FIELD]
        .into_iter()
        .filter_map(Option::as_ref)
        .find_map(|re| re.captures(error_text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

/// Run `operation`, retrying only on rate-limit errors.
///
/// Non rate-limit errors fail immediately with [`ModelError::Model`]. When
/// every attempt was rate limited the result is
/// [`ModelError::RateLimitExceeded`]. At least one attempt is always made.
pub async fn retry_on_rate_limit<F, Fut, T>(
    mut operation: F,
    policy: &RetryPolicy,
) -> Result<T, ModelError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let attempts = policy.max_retries.max(1);

    for attempt in 0..attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                let text = format!("{e:#}");
                if !is_rate_limit(&text) {
                    error!("Model request failed: {text}");
                    return Err(ModelError::Model(text));
                }
                if attempt + 1 < attempts {
                    let wait = policy.wait_for(attempt, &text);
                    warn!(
                        "Rate limit hit. Waiting {:.1}s before retry {}/{}...",
                        wait.as_secs_f64(),
                        attempt + 1,
                        attempts
                    );
                    sleep(wait).await;
                }
            }
        }
    }

    Err(ModelError::RateLimitExceeded { attempts })
}
