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

//! Configuration for the agora binary and server.
//!
//! Settings live in `~/agora/config.json`. The file is optional and every
//! field has a default. The Gemini credential is read from `GEMINI_API_KEY`
//! (a `.env` file in the working directory is honored) and wins over the file.

mod schema;

pub use schema::{API_KEY_ENV, Config, DebateConfig, ModelConfig, ServerConfig};
