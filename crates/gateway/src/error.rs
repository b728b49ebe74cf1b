use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::peer_store::PeerStoreError;

#[derive(Debug)]
pub enum Error {
    // Auth Errors
    MissingPassword,
    IncorrectPassword,
    NotLoggedIn,
    SessionCtxMissing,

    // Request Errors
    MalformedBody(String),
    InvalidArgument(String),

    // Peer Errors
    ClientNotFound(String),
    Conflict(String),
    Upstream(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            Error::MissingPassword => (StatusCode::UNAUTHORIZED, "Missing: Password".to_string()),
            Error::IncorrectPassword => {
                (StatusCode::UNAUTHORIZED, "Incorrect Password".to_string())
            }
            Error::NotLoggedIn => (StatusCode::UNAUTHORIZED, "Not Logged In".to_string()),
            Error::SessionCtxMissing => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Session context missing".to_string(),
            ),
            Error::MalformedBody(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::ClientNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Client Not Found: {}", id))
            }
            Error::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Error::Upstream(msg) => {
                // The detail stays in the log; clients get a generic message.
                warn!("Peer store failure: {}", msg);
                (StatusCode::BAD_GATEWAY, "Peer Store Unavailable".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<PeerStoreError> for Error {
    fn from(err: PeerStoreError) -> Self {
        match err {
            PeerStoreError::NotFound(id) => Error::ClientNotFound(id.to_string()),
            PeerStoreError::InvalidArgument(msg) => Error::InvalidArgument(msg),
            PeerStoreError::Conflict(msg) => Error::Conflict(msg),
            PeerStoreError::Backend(msg) => Error::Upstream(msg),
        }
    }
}
