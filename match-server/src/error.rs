//! The error taxonomy of the session layer and its mapping onto HTTP answers.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use onitama_rules::InputError;
use protocol::ServerMessage;
use thiserror::Error;

/// Every error is recoverable by the client. None of them changes the match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Match not found")]
    NotFound,
    #[error("Match is already full")]
    AlreadyFull,
    #[error("{0}")]
    NotReady(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error(transparent)]
    InvalidInput(#[from] InputError),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let status = match &self {
            SessionError::NotFound => StatusCode::NOT_FOUND,
            SessionError::AlreadyFull | SessionError::NotReady(_) => StatusCode::CONFLICT,
            SessionError::Forbidden(_) => StatusCode::FORBIDDEN,
            SessionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(ServerMessage::error(self.to_string()))).into_response()
    }
}
