//! Session handlers

use axum::{extract::State, http::StatusCode, Json};
use tracing::info;

use crate::config::AppState;
use crate::ctx::{Ctx, ParsedBody};
use crate::error::Result;
use crate::session::SessionStatus;

/// GET /api/release
pub async fn get_release(State(state): State<AppState>) -> Json<String> {
    Json(state.config.release.clone())
}

/// GET /api/session
pub async fn get_session(State(state): State<AppState>, ctx: Ctx) -> Json<SessionStatus> {
    Json(state.sessions.status(ctx.token()))
}

/// POST /api/session
///
/// Password submission. The body field must be a JSON string equal to the
/// configured password; the session cookie was already issued upstream,
/// success only flips its authenticated flag.
pub async fn create_session(
    State(state): State<AppState>,
    ctx: Ctx,
    body: ParsedBody,
) -> Result<StatusCode> {
    state
        .sessions
        .authenticate(ctx.token(), body.field("password"))?;
    info!("Session authenticated: {}", ctx.token());
    Ok(StatusCode::OK)
}

/// DELETE /api/session
pub async fn delete_session(State(state): State<AppState>, ctx: Ctx) -> StatusCode {
    state.sessions.terminate(ctx.token());
    StatusCode::OK
}
