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

//! HTTP surface for the debate orchestrator.
//!
//! A thin axum layer: handlers validate and unpack JSON bodies, call into
//! [`agora_debate::DebateOrchestrator`] and map [`DebateError`]s to status
//! codes through [`ApiError`].
//!
//! [`DebateError`]: agora_debate::DebateError

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub struct Server {
    address: String,
    state: AppState,
}

impl Server {
    #[must_use]
    pub const fn new(address: String, state: AppState) -> Self {
        Self { address, state }
    }

    /// Router with request tracing.
    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone()).layer(TraceLayer::new_for_http())
    }

    /// Bind and serve until Ctrl+C or SIGTERM.
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.address).await?;
        info!("Server listening on {}", listener.local_addr()?);
        info!("Using model: {}", self.state.orchestrator.model());

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
