use agora_config::Config;
use agora_core::DebateTurn;
use agora_debate::{OrchestrationMode, RoundOutcome, RoundReport};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct DebateInput {
    pub topic: String,
    pub rounds: Option<u32>,
    pub session: Option<String>,
    pub mode: Option<OrchestrationMode>,
}

/// Run a whole debate in the terminal, printing each round as it lands.
#[derive(Debug, Clone, Copy)]
pub struct DebateStrategy;

impl super::CommandStrategy for DebateStrategy {
    type Input = DebateInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        let orchestrator = super::build_orchestrator(&config, input.mode)?;

        let total = input.rounds.unwrap_or(config.debate.default_rounds);
        let session_id = input
            .session
            .unwrap_or_else(|| format!("cli-{}", Uuid::now_v7()));

        println!("🎤 {}", input.topic);
        println!(
            "   {total} rounds, model {}, session {session_id}",
            orchestrator.model()
        );

        let mut report = orchestrator
            .start_debate(&input.topic, &session_id, total)
            .await?;

        loop {
            print_round(&report);
            match orchestrator
                .next_round(&session_id, report.round, total)
                .await?
            {
                RoundOutcome::Advanced(next) => report = next,
                RoundOutcome::Complete => break,
            }
        }

        println!("\n✅ Debate complete after {total} rounds");
        Ok(())
    }
}

fn print_round(report: &RoundReport) {
    let DebateTurn {
        pro,
        con,
        moderator,
    } = &report.turn;

    println!("\n===== Round {}/{} =====", report.round, report.total_rounds);
    println!("\n🟢 PRO\n{pro}");
    println!("\n🔴 CON\n{con}");
    println!("\n⚖️  MODERATOR\n{moderator}");

    if !report.parse_failures.is_empty() {
        let roles: Vec<&str> = report.parse_failures.iter().map(|r| r.as_str()).collect();
        println!("\n⚠️  Could not parse: {}", roles.join(", "));
    }
}
