use agora_core::{DebateTurn, Message, SessionInfo};
use agora_debate::{RoundOutcome, RoundReport};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn default_session_id() -> String {
    "default".to_string()
}

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default = "default_session_id")]
    pub session_id: String,
    pub rounds: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct NextRoundRequest {
    #[serde(default = "default_session_id")]
    pub session_id: String,
    pub current_round: u32,
    pub total_rounds: u32,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    #[serde(default = "default_session_id")]
    pub session_id: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
    pub model: String,
}

#[derive(Debug, Serialize)]
pub struct RoundResponse {
    pub success: bool,
    pub round: u32,
    pub total_rounds: u32,
    pub responses: DebateTurn,
    pub session_id: String,
    pub debate_complete: bool,
}

impl From<RoundReport> for RoundResponse {
    fn from(report: RoundReport) -> Self {
        Self {
            success: true,
            round: report.round,
            total_rounds: report.total_rounds,
            responses: report.turn,
            session_id: report.session_id,
            debate_complete: report.debate_complete,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub success: bool,
    pub debate_complete: bool,
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum NextRoundResponse {
    Round(RoundResponse),
    Complete(CompleteResponse),
}

#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub session_id: String,
    pub history: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub existed: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub success: bool,
    pub sessions: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SessionInfoResponse {
    pub success: bool,
    pub info: SessionInfo,
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online",
        message: "Multi-agent debate API is running",
        version: env!("CARGO_PKG_VERSION"),
        model: state.orchestrator.model().to_string(),
    })
}

pub async fn start_debate(
    State(state): State<AppState>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> ApiResult<Json<RoundResponse>> {
    let Json(request) = payload?;
    let rounds = request.rounds.unwrap_or(state.default_rounds);

    let report = state
        .orchestrator
        .start_debate(&request.question, &request.session_id, rounds)
        .await?;

    Ok(Json(report.into()))
}

pub async fn next_round(
    State(state): State<AppState>,
    payload: Result<Json<NextRoundRequest>, JsonRejection>,
) -> ApiResult<Json<NextRoundResponse>> {
    let Json(request) = payload?;

    let outcome = state
        .orchestrator
        .next_round(
            &request.session_id,
            request.current_round,
            request.total_rounds,
        )
        .await?;

    let response = match outcome {
        RoundOutcome::Advanced(report) => NextRoundResponse::Round(report.into()),
        RoundOutcome::Complete => NextRoundResponse::Complete(CompleteResponse {
            success: true,
            debate_complete: true,
            message: format!(
                "Debate complete after {} rounds",
                request.total_rounds
            ),
            session_id: request.session_id,
        }),
    };

    Ok(Json(response))
}

pub async fn add_comment(
    State(state): State<AppState>,
    payload: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResult<Json<AckResponse>> {
    let Json(request) = payload?;

    state
        .orchestrator
        .add_comment(&request.session_id, &request.comment)
        .await?;

    Ok(Json(AckResponse {
        success: true,
        message: "Comment added".to_string(),
        session_id: request.session_id,
    }))
}

pub async fn history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<HistoryResponse>> {
    let history = state.orchestrator.history(&session_id).await?;
    Ok(Json(HistoryResponse {
        success: true,
        session_id,
        history,
    }))
}

pub async fn clear(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<ClearResponse>> {
    let existed = state.orchestrator.clear(&session_id).await?;
    let message = if existed {
        format!("Session {session_id} cleared")
    } else {
        format!("Session {session_id} did not exist")
    };
    info!("{message}");

    Ok(Json(ClearResponse {
        success: true,
        existed,
        message,
    }))
}

pub async fn sessions(State(state): State<AppState>) -> ApiResult<Json<SessionsResponse>> {
    let sessions = state.orchestrator.sessions().await?;
    Ok(Json(SessionsResponse {
        success: true,
        count: sessions.len(),
        sessions,
    }))
}

pub async fn session_info(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<SessionInfoResponse>> {
    let info = state
        .orchestrator
        .session_info(&session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Session not found: {session_id}")))?;

    Ok(Json(SessionInfoResponse {
        success: true,
        info,
    }))
}
