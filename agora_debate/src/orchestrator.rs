//! Round orchestration.
//!
//! Rounds are advanced by the caller one at a time. The orchestrator keeps no
//! state of its own between calls: everything it needs (topic, latest
//! arguments, finished rounds) is read back from the session log.

use std::sync::Arc;

use agora_core::{
    DebateTurn, LLMProvider, Message, Role, SessionInfo, SessionStorage, current_round as stored_round,
};
use agora_providers::ModelClient;
use serde::Serialize;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::DebateError;
use crate::prompts::{Side, combined_prompt, debater_prompt, moderator_prompt};
use crate::segmenter::segment;
use crate::settings::{DebateSettings, OrchestrationMode};

/// Where a session stands relative to a planned number of rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "round", rename_all = "snake_case")]
pub enum DebateState {
    NotStarted,
    /// Latest finished round.
    Round(u32),
    Complete,
}

/// Outputs of one generated round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    pub session_id: String,
    pub round: u32,
    pub total_rounds: u32,
    pub turn: DebateTurn,
    pub debate_complete: bool,
    /// Sections that fell back to a parse placeholder.
    pub parse_failures: Vec<Role>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    Advanced(RoundReport),
    /// The requested round is past the planned total. No model call was made.
    Complete,
}

pub struct DebateOrchestrator<P = Arc<dyn LLMProvider>, S = Arc<dyn SessionStorage>> {
    client: ModelClient<P>,
    storage: S,
    settings: DebateSettings,
}

impl<P, S> DebateOrchestrator<P, S>
where
    P: LLMProvider,
    S: SessionStorage,
{
    pub fn new(client: ModelClient<P>, storage: S, settings: DebateSettings) -> Self {
        info!(
            "Debate orchestrator ready: model={}, mode={}",
            client.model(),
            settings.mode
        );
        Self {
            client,
            storage,
            settings,
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        self.client.model()
    }

    #[must_use]
    pub const fn client(&self) -> &ModelClient<P> {
        &self.client
    }

    #[must_use]
    pub const fn settings(&self) -> &DebateSettings {
        &self.settings
    }

    fn validate_total(&self, total_rounds: u32) -> Result<(), DebateError> {
        if total_rounds == 0 || total_rounds > self.settings.max_rounds {
            return Err(DebateError::InvalidInput(format!(
                "rounds must be between 1 and {}",
                self.settings.max_rounds
            )));
        }
        Ok(())
    }

    /// Reset the session, record `topic` and generate round 1.
    pub async fn start_debate(
        &self,
        topic: &str,
        session_id: &str,
        total_rounds: u32,
    ) -> Result<RoundReport, DebateError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(DebateError::InvalidInput(
                "Question cannot be empty".to_string(),
            ));
        }
        self.validate_total(total_rounds)?;

        info!("Starting debate in session {session_id} ({total_rounds} rounds): {topic}");

        self.storage.clear_session(session_id).await?;
        self.storage
            .add_message(session_id, Role::User, topic)
            .await?;

        self.advance(session_id, topic, 1, total_rounds, Vec::new())
            .await
    }

    /// Generate round `current_round + 1`, or report completion when that
    /// round is past `total_rounds`.
    pub async fn next_round(
        &self,
        session_id: &str,
        current_round: u32,
        total_rounds: u32,
    ) -> Result<RoundOutcome, DebateError> {
        let round = current_round.saturating_add(1);
        if round > total_rounds {
            info!("Debate in session {session_id} is complete after {current_round} rounds");
            return Ok(RoundOutcome::Complete);
        }
        if current_round == 0 {
            return Err(DebateError::InvalidInput(
                "current_round must be at least 1; use start to begin a debate".to_string(),
            ));
        }
        self.validate_total(total_rounds)?;

        let history = self.storage.get_history(session_id).await?;
        let Some(topic) = history.first().map(|m| m.content.clone()) else {
            return Err(DebateError::NotStarted(session_id.to_string()));
        };

        let derived = stored_round(&history);
        if derived != round {
            warn!(
                "Session {session_id} holds {} finished rounds but round {round} was requested",
                derived.saturating_sub(1)
            );
        }

        self.advance(session_id, &topic, round, total_rounds, history)
            .await
            .map(RoundOutcome::Advanced)
    }

    /// Append a user comment without generating anything.
    pub async fn add_comment(&self, session_id: &str, comment: &str) -> Result<(), DebateError> {
        let comment = comment.trim();
        if comment.is_empty() {
            return Err(DebateError::InvalidInput(
                "Comment cannot be empty".to_string(),
            ));
        }
        self.storage
            .add_message(session_id, Role::User, comment)
            .await?;
        info!("Added comment to session {session_id}");
        Ok(())
    }

    pub async fn history(&self, session_id: &str) -> Result<Vec<Message>, DebateError> {
        Ok(self.storage.get_history(session_id).await?)
    }

    pub async fn clear(&self, session_id: &str) -> Result<bool, DebateError> {
        Ok(self.storage.clear_session(session_id).await?)
    }

    pub async fn sessions(&self) -> Result<Vec<String>, DebateError> {
        Ok(self.storage.list_sessions().await?)
    }

    pub async fn session_info(&self, session_id: &str) -> Result<Option<SessionInfo>, DebateError> {
        Ok(self.storage.session_info(session_id).await?)
    }

    pub async fn state(&self, session_id: &str, total_rounds: u32) -> Result<DebateState, DebateError> {
        if self.storage.message_count(session_id).await? == 0 {
            return Ok(DebateState::NotStarted);
        }
        let history = self.storage.get_history(session_id).await?;
        let finished = stored_round(&history).saturating_sub(1);

        Ok(match finished {
            0 => DebateState::NotStarted,
            n if n >= total_rounds => DebateState::Complete,
            n => DebateState::Round(n),
        })
    }

    async fn advance(
        &self,
        session_id: &str,
        topic: &str,
        round: u32,
        total_rounds: u32,
        history: Vec<Message>,
    ) -> Result<RoundReport, DebateError> {
        info!("Generating round {round}/{total_rounds} for session {session_id}");

        let (turn, parse_failures) = match self.settings.mode {
            OrchestrationMode::Combined => self.combined_round(topic, round, &history).await?,
            OrchestrationMode::PerRole => (self.per_role_round(topic, history).await?, Vec::new()),
        };

        for (role, content) in turn.messages() {
            self.storage.add_message(session_id, role, content).await?;
        }

        info!("Round {round} stored for session {session_id}");

        Ok(RoundReport {
            session_id: session_id.to_string(),
            round,
            total_rounds,
            turn,
            debate_complete: round >= total_rounds,
            parse_failures,
        })
    }

    async fn combined_round(
        &self,
        topic: &str,
        round: u32,
        history: &[Message],
    ) -> Result<(DebateTurn, Vec<Role>), DebateError> {
        let prompt = combined_prompt(topic, round, history, &self.settings.prompts);
        debug!("Combined prompt: {} chars", prompt.chars().count());

        let text = self
            .client
            .generate(&prompt, &self.settings.sampling.combined)
            .await?;

        let segmented = segment(&text);
        if !segmented.is_complete() {
            warn!(
                "Round {round}: {} of 3 sections could not be parsed",
                segmented.missing.len()
            );
        }
        Ok((segmented.turn, segmented.missing))
    }

    /// Three calls in sequence. The con side sees this round's pro message,
    /// and the moderator sees both.
    async fn per_role_round(
        &self,
        topic: &str,
        mut history: Vec<Message>,
    ) -> Result<DebateTurn, DebateError> {
        let pro = self.debater_turn(Side::Pro, topic, &history).await?;
        history.push(Message::new(Role::Pro, pro.clone()));
        self.pause().await;

        let con = self.debater_turn(Side::Con, topic, &history).await?;
        self.pause().await;

        let prompt = moderator_prompt(topic, &pro, &con, &self.settings.prompts);
        debug!("Moderator prompt: {} chars", prompt.chars().count());
        let moderator = self
            .client
            .generate(&prompt, &self.settings.sampling.moderator)
            .await?;

        Ok(DebateTurn {
            pro,
            con,
            moderator,
        })
    }

    async fn debater_turn(
        &self,
        side: Side,
        topic: &str,
        history: &[Message],
    ) -> Result<String, DebateError> {
        let prompt = debater_prompt(side, topic, history, &self.settings.prompts);
        let params = match side {
            Side::Pro => &self.settings.sampling.pro,
            Side::Con => &self.settings.sampling.con,
        };
        debug!("{:?} prompt: {} chars", side, prompt.chars().count());

        let text = self.client.generate(&prompt, params).await?;
        info!("{:?} responded ({} chars)", side, text.chars().count());
        Ok(text)
    }

    async fn pause(&self) {
        let delay = self.settings.inter_call_delay();
        if !delay.is_zero() {
            info!("Waiting {}s to respect rate limits...", delay.as_secs());
            sleep(delay).await;
        }
    }
}
