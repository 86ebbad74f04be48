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

mod command;

use agora_debate::OrchestrationMode;
use clap::{Parser, Subcommand};
use command::{
    CommandStrategy, DebateInput, DebateStrategy, InfoStrategy, InitStrategy, ModelsStrategy,
    ServeInput, ServeStrategy, TokensInput, TokensStrategy, VersionStrategy,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "agora")]
#[command(about = "Three-party AI debate orchestrator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the debate HTTP API
    Serve {
        /// Address to bind (defaults to the config value)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (defaults to the config value)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run a full debate in the terminal
    Debate {
        /// Question or proposition to debate
        #[arg(short, long)]
        topic: String,

        /// Number of rounds
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Session id (a fresh one is generated when omitted)
        #[arg(short, long)]
        session: Option<String>,

        /// Orchestration mode: combined or per_role
        #[arg(short, long)]
        mode: Option<OrchestrationMode>,
    },
    /// List models available for text generation
    Models,
    /// Count tokens for a piece of text
    Tokens {
        text: String,
    },
    /// Initialize configuration
    Init,
    /// Show effective configuration
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            ServeStrategy.execute(ServeInput { host, port }).await?;
        }
        Commands::Debate {
            topic,
            rounds,
            session,
            mode,
        } => {
            DebateStrategy
                .execute(DebateInput {
                    topic,
                    rounds,
                    session,
                    mode,
                })
                .await?;
        }
        Commands::Models => ModelsStrategy.execute(()).await?,
        Commands::Tokens { text } => TokensStrategy.execute(TokensInput { text }).await?,
        Commands::Init => InitStrategy.execute(()).await?,
        Commands::Info => InfoStrategy.execute(()).await?,
        Commands::Version => VersionStrategy.execute(()).await?,
    }

    Ok(())
}
