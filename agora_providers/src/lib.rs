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

//! Model access: the Gemini REST provider, rate-limit aware retries and the
//! `ModelClient` that picks a model and applies the retry policy.

mod client;
mod gemini;
pub mod retry;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

pub use client::{DEFAULT_MODEL_CANDIDATES, FALLBACK_MODEL, ModelClient, ModelSettings};
pub use gemini::{DEFAULT_BASE_URL, GeminiProvider, ModelInfo};
pub use retry::RetryPolicy;
#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedProvider;
