use agora_core::ModelError;
use agora_debate::DebateError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Rate limit exceeded after {attempts} attempts. Please wait a minute before trying again.")]
    RateLimited { attempts: u32 },

    #[error("Model request failed: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound(_) => "not_found",
            Self::RateLimited { .. } => "rate_limited",
            Self::Upstream(_) => "upstream_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<DebateError> for ApiError {
    fn from(err: DebateError) -> Self {
        match err {
            DebateError::InvalidInput(message) => Self::BadRequest(message),
            DebateError::NotStarted(_) => Self::NotFound(err.to_string()),
            DebateError::Model(ModelError::RateLimitExceeded { attempts }) => {
                Self::RateLimited { attempts }
            }
            DebateError::Model(e @ (ModelError::Model(_) | ModelError::EmptyResponse)) => {
                Self::Upstream(e.to_string())
            }
            DebateError::Model(e @ ModelError::Configuration(_)) => Self::Internal(e.to_string()),
            DebateError::Storage(e) => Self::Internal(format!("{e:#}")),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = self.error_code(), "Request failed: {self}");
        } else {
            warn!(code = self.error_code(), "Request rejected: {self}");
        }

        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debate_errors_map_to_status_codes() {
        let cases = [
            (
                DebateError::InvalidInput("empty".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                DebateError::NotStarted("s1".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                DebateError::Model(ModelError::RateLimitExceeded { attempts: 3 }),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                DebateError::Model(ModelError::Model("HTTP 500".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                DebateError::Model(ModelError::EmptyResponse),
                StatusCode::BAD_GATEWAY,
            ),
            (
                DebateError::Model(ModelError::Configuration("no key".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DebateError::Storage(anyhow::anyhow!("lock poisoned")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn rate_limit_message_mentions_waiting() {
        let err = ApiError::from(DebateError::Model(ModelError::RateLimitExceeded {
            attempts: 3,
        }));
        assert_eq!(err.error_code(), "rate_limited");
        assert!(err.to_string().contains("wait a minute"));
    }
}
