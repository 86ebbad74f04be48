//! Integration tests for round orchestration.
//!
//! These tests verify that:
//! - A debate advances one round per call and stores three messages per round
//! - Completion is reported without a model call
//! - Model failures surface and leave no partial round behind
//! - Per-role mode makes three calls separated by the inter-call delay

use std::sync::Arc;
use std::time::Duration;

use agora_core::{ModelError, Role};
use agora_debate::segmenter::placeholder;
use agora_debate::{
    DebateError, DebateOrchestrator, DebateSettings, DebateState, OrchestrationMode, RoundOutcome,
};
use agora_providers::{ModelClient, ModelSettings, RetryPolicy, ScriptedProvider};
use agora_session::SessionStore;
use tokio::time::Instant;

const WELL_FORMED: &str = "===PRO_AGENT===A===CON_AGENT===B===MODERATOR===C";

type TestOrchestrator = DebateOrchestrator<Arc<ScriptedProvider>, Arc<SessionStore>>;

fn orchestrator(
    provider: ScriptedProvider,
    settings: DebateSettings,
) -> (TestOrchestrator, Arc<ScriptedProvider>, Arc<SessionStore>) {
    let provider = Arc::new(provider);
    let store = Arc::new(SessionStore::new());
    let client = match ModelClient::new(Arc::clone(&provider), &ModelSettings::default()) {
        Ok(client) => client.with_retry_policy(RetryPolicy::default().with_max_retries(2)),
        Err(e) => panic!("client should build: {e}"),
    };
    (
        DebateOrchestrator::new(client, Arc::clone(&store), settings),
        provider,
        store,
    )
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "Test failure should panic")]
async fn test_three_round_debate_end_to_end() {
    let (debate, provider, _) =
        orchestrator(ScriptedProvider::new().repeating(WELL_FORMED), DebateSettings::default());

    let first = debate.start_debate("Is X beneficial?", "s1", 3).await.unwrap();
    assert_eq!(first.round, 1);
    assert_eq!(first.total_rounds, 3);
    assert!(!first.debate_complete);
    assert_eq!(first.turn.pro, "A");
    assert_eq!(first.turn.con, "B");
    assert_eq!(first.turn.moderator, "C");
    assert!(first.parse_failures.is_empty());

    let history = debate.history("s1").await.unwrap();
    let roles: Vec<Role> = history.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Pro, Role::Con, Role::Moderator]);
    assert_eq!(history[0].content, "Is X beneficial?");

    let RoundOutcome::Advanced(second) = debate.next_round("s1", 1, 3).await.unwrap() else {
        panic!("round 2 should be generated");
    };
    assert_eq!(second.round, 2);
    assert!(!second.debate_complete);

    let RoundOutcome::Advanced(third) = debate.next_round("s1", 2, 3).await.unwrap() else {
        panic!("round 3 should be generated");
    };
    assert_eq!(third.round, 3);
    assert!(third.debate_complete);

    assert_eq!(debate.history("s1").await.unwrap().len(), 10);
    assert_eq!(provider.call_count(), 3);
    assert_eq!(debate.state("s1", 3).await.unwrap(), DebateState::Complete);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "Test failure should panic")]
async fn test_next_round_past_total_skips_model() {
    let (debate, provider, _) =
        orchestrator(ScriptedProvider::new().repeating(WELL_FORMED), DebateSettings::default());

    debate.start_debate("topic", "s1", 1).await.unwrap();
    let calls = provider.call_count();

    let outcome = debate.next_round("s1", 1, 1).await.unwrap();
    assert_eq!(outcome, RoundOutcome::Complete);
    assert_eq!(provider.call_count(), calls);
    assert_eq!(debate.history("s1").await.unwrap().len(), 4);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "Test failure should panic")]
async fn test_continuation_prompt_rebuts_previous_round() {
    let (debate, provider, _) = orchestrator(
        ScriptedProvider::new()
            .with_response("===PRO_AGENT===solar is cheap===CON_AGENT===storage is costly===MODERATOR===both fair")
            .repeating(WELL_FORMED),
        DebateSettings::default(),
    );

    debate.start_debate("Is solar power worth it?", "s1", 2).await.unwrap();
    debate.next_round("s1", 1, 2).await.unwrap();

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(!prompts[0].contains("just argued"));
    assert!(prompts[1].contains("This is round 2."));
    assert!(prompts[1].contains("\"storage is costly\""));
    assert!(prompts[1].contains("\"solar is cheap\""));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "Test failure should panic")]
async fn test_partial_parse_stores_placeholder() {
    let (debate, _, _) = orchestrator(
        ScriptedProvider::new().with_response("===PRO_AGENT===A ===MODERATOR=== C"),
        DebateSettings::default(),
    );

    let report = debate.start_debate("topic", "s1", 3).await.unwrap();
    assert_eq!(report.turn.pro, "A");
    assert_eq!(report.turn.con, placeholder(Role::Con));
    assert_eq!(report.turn.moderator, "C");
    assert_eq!(report.parse_failures, vec![Role::Con]);

    let history = debate.history("s1").await.unwrap();
    assert_eq!(history[2].content, placeholder(Role::Con));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "Test failure should panic")]
async fn test_failed_round_stores_nothing() {
    let (debate, _, _) = orchestrator(
        ScriptedProvider::new()
            .with_response(WELL_FORMED)
            .with_error("upstream exploded"),
        DebateSettings::default(),
    );

    debate.start_debate("topic", "s1", 3).await.unwrap();
    let result = debate.next_round("s1", 1, 3).await;

    assert!(matches!(result, Err(DebateError::Model(ModelError::Model(_)))));
    assert_eq!(debate.history("s1").await.unwrap().len(), 4);
    assert_eq!(debate.state("s1", 3).await.unwrap(), DebateState::Round(1));
}

#[tokio::test(start_paused = true)]
#[expect(clippy::unwrap_used, reason = "Test failure should panic")]
async fn test_rate_limit_exhaustion_surfaces() {
    let (debate, provider, _) = orchestrator(
        ScriptedProvider::new()
            .with_error("429 RESOURCE_EXHAUSTED, retry in 2s")
            .with_error("429 RESOURCE_EXHAUSTED, retry in 2s"),
        DebateSettings::default(),
    );

    let result = debate.start_debate("topic", "s1", 3).await;

    assert!(matches!(
        result,
        Err(DebateError::Model(ModelError::RateLimitExceeded { attempts: 2 }))
    ));
    assert_eq!(provider.call_count(), 2);

    let history = debate.history("s1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].role, Role::User);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "Test failure should panic")]
async fn test_start_resets_existing_session() {
    let (debate, _, _) =
        orchestrator(ScriptedProvider::new().repeating(WELL_FORMED), DebateSettings::default());

    debate.start_debate("first topic", "s1", 3).await.unwrap();
    debate.add_comment("s1", "interesting").await.unwrap();
    debate.start_debate("second topic", "s1", 3).await.unwrap();

    let history = debate.history("s1").await.unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].content, "second topic");
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "Test failure should panic")]
async fn test_add_comment_appends_user_message() {
    let (debate, provider, _) =
        orchestrator(ScriptedProvider::new().repeating(WELL_FORMED), DebateSettings::default());

    debate.start_debate("topic", "s1", 3).await.unwrap();
    debate.add_comment("s1", "  What about cost?  ").await.unwrap();

    let history = debate.history("s1").await.unwrap();
    let last = history.last().unwrap();
    assert_eq!(last.role, Role::User);
    assert_eq!(last.content, "What about cost?");
    assert_eq!(provider.call_count(), 1);

    let RoundOutcome::Advanced(report) = debate.next_round("s1", 1, 3).await.unwrap() else {
        panic!("round 2 should be generated");
    };
    assert_eq!(report.round, 2);
}

#[tokio::test]
async fn test_invalid_input_is_rejected() {
    let (debate, provider, _) =
        orchestrator(ScriptedProvider::new().repeating(WELL_FORMED), DebateSettings::default());

    assert!(matches!(
        debate.start_debate("   ", "s1", 3).await,
        Err(DebateError::InvalidInput(_))
    ));
    assert!(matches!(
        debate.start_debate("topic", "s1", 0).await,
        Err(DebateError::InvalidInput(_))
    ));
    assert!(matches!(
        debate.start_debate("topic", "s1", 11).await,
        Err(DebateError::InvalidInput(_))
    ));
    assert!(matches!(
        debate.add_comment("s1", "").await,
        Err(DebateError::InvalidInput(_))
    ));
    assert!(matches!(
        debate.next_round("s1", 0, 3).await,
        Err(DebateError::InvalidInput(_))
    ));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "Test failure should panic")]
async fn test_next_round_without_debate_is_not_started() {
    let (debate, provider, _) =
        orchestrator(ScriptedProvider::new().repeating(WELL_FORMED), DebateSettings::default());

    let result = debate.next_round("ghost", 1, 3).await;
    assert!(matches!(result, Err(DebateError::NotStarted(id)) if id == "ghost"));
    assert_eq!(provider.call_count(), 0);
    assert_eq!(debate.state("ghost", 3).await.unwrap(), DebateState::NotStarted);
}

#[tokio::test(start_paused = true)]
#[expect(clippy::unwrap_used, reason = "Test failure should panic")]
async fn test_per_role_round_makes_three_paced_calls() {
    let settings = DebateSettings::default().with_mode(OrchestrationMode::PerRole);
    let (debate, provider, _) = orchestrator(
        ScriptedProvider::new()
            .with_response("pro opening")
            .with_response("con reply")
            .with_response("moderator synthesis"),
        settings,
    );

    let start = Instant::now();
    let report = debate.start_debate("topic", "s1", 2).await.unwrap();

    assert_eq!(start.elapsed(), Duration::from_secs(10));
    assert_eq!(provider.call_count(), 3);
    assert_eq!(report.turn.pro, "pro opening");
    assert_eq!(report.turn.con, "con reply");
    assert_eq!(report.turn.moderator, "moderator synthesis");

    let prompts = provider.prompts();
    assert!(prompts[0].contains("Make a strong opening argument"));
    assert!(prompts[1].contains("The PRO side just argued:\n\"pro opening\""));
    assert!(prompts[2].contains("PRO ARGUMENT:\n\"pro opening\""));
    assert!(prompts[2].contains("CON ARGUMENT:\n\"con reply\""));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "Test failure should panic")]
async fn test_session_passthroughs() {
    let (debate, _, store) =
        orchestrator(ScriptedProvider::new().repeating(WELL_FORMED), DebateSettings::default());

    debate.start_debate("topic", "b", 3).await.unwrap();
    debate.start_debate("topic", "a", 3).await.unwrap();

    assert_eq!(debate.sessions().await.unwrap(), vec!["a", "b"]);
    assert_eq!(store.len().await, 2);

    let info = debate.session_info("a").await.unwrap().unwrap();
    assert_eq!(info.message_count, 4);
    assert!(debate.session_info("missing").await.unwrap().is_none());

    assert!(debate.clear("a").await.unwrap());
    assert!(!debate.clear("a").await.unwrap());
    assert_eq!(debate.sessions().await.unwrap(), vec!["b"]);
}
