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

//! Turn-based debate orchestration.
//!
//! A round asks the model for an advocate (`pro`), an opponent (`con`) and a
//! moderator contribution, either in one combined completion split on fixed
//! markers or in three separate calls. Each round's outputs are appended to
//! the session log so later rounds can rebut what was said before.

mod error;
mod orchestrator;
pub mod prompts;
pub mod segmenter;
mod settings;

pub use error::DebateError;
pub use orchestrator::{DebateOrchestrator, DebateState, RoundOutcome, RoundReport};
pub use settings::{
    DebateSettings, OrchestrationMode, PromptSettings, SamplingSettings, WordBudget,
};
