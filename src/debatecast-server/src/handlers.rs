//! Axum Handlers for the debate API

use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use debatecast_core::{
    DebateConfig, DebateError, DebateOrchestrator, Participant, UniformRoundSchedule,
};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    models::{
        DebateRequest, DebateResponse, ErrorResponse, MAX_ROUNDS, MIN_ROUNDS, StatusResponse,
    },
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    Debate(DebateError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Debate(err) => match err {
                DebateError::Validation(_)
                | DebateError::UnknownRole(_)
                | DebateError::UnsupportedProvider { .. } => StatusCode::BAD_REQUEST,
                DebateError::GenerationFailed { .. } => StatusCode::BAD_GATEWAY,
                DebateError::ConfigError(_) | DebateError::Output(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(message) => ErrorResponse {
                message,
                role: None,
                provider: None,
            },
            ApiError::Debate(err) => {
                if status.is_server_error() {
                    error!(error = %err, "debate request failed");
                } else {
                    warn!(error = %err, "debate request rejected");
                }
                ErrorResponse {
                    message: err.to_string(),
                    role: err.role().map(str::to_string),
                    provider: err.provider().map(str::to_string),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<DebateError> for ApiError {
    fn from(err: DebateError) -> Self {
        Self::Debate(err)
    }
}

/// Liveness check.
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
        message: "DebateCast backend is running".to_string(),
    })
}

/// Run a uniform-round debate and return the full transcript.
pub async fn debate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DebateRequest>, JsonRejection>,
) -> Result<Json<DebateResponse>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&payload.rounds) {
        return Err(ApiError::BadRequest(format!(
            "rounds must be between {} and {}, got {}",
            MIN_ROUNDS, MAX_ROUNDS, payload.rounds
        )));
    }

    let participants: Vec<Participant> = payload.participants.iter().map(Participant::from).collect();
    let mut config = DebateConfig::new(&payload.topic, payload.rounds).with_language(&state.language);
    if let Some(extra) = &payload.extra_prompt {
        config = config.with_extra_directive(extra);
    }

    let schedule = UniformRoundSchedule::new(&config, &participants)?;
    info!(
        topic = %payload.topic,
        rounds = payload.rounds,
        participants = participants.len(),
        "debate requested"
    );

    let transcript = DebateOrchestrator::new(config, Box::new(schedule), &state.providers)?
        .run()
        .await?;

    Ok(Json(DebateResponse::from(transcript)))
}
