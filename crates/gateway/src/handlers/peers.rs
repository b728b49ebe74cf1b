//! Peer admin facade
//!
//! One handler per route. Each validates its input, calls the external
//! `PeerStore`, and shapes the result. Store failures map onto gateway
//! errors in `crate::error`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use http::header;
use tracing::info;
use uuid::Uuid;

use crate::config::AppState;
use crate::ctx::ParsedBody;
use crate::error::{Error, Result};
use crate::peer_store::Peer;

/// Client ids are uuids assigned by the peer store; anything that does
/// not parse cannot resolve to a client.
fn parse_client_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| Error::ClientNotFound(raw.to_string()))
}

/// GET /api/wireguard/client
pub async fn list_peers(State(state): State<AppState>) -> Result<Json<Vec<Peer>>> {
    Ok(Json(state.peers.list().await?))
}

/// GET /api/wireguard/client/{client_id}/qrcode.svg
pub async fn peer_qrcode(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_client_id(&client_id)?;
    let svg = state.peers.qr_code_svg(id).await?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

/// GET /api/wireguard/client/{client_id}/configuration
///
/// Downloadable artifact: the disposition filename derives from the
/// client's name, and the content type must be text/plain for download
/// flows to work.
pub async fn peer_configuration(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_client_id(&client_id)?;
    let peer = state.peers.get(id).await?;
    let configuration = state.peers.configuration(id).await?;
    Ok((
        [
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}.conf\"", peer.name),
            ),
            (header::CONTENT_TYPE, "text/plain".to_string()),
        ],
        configuration,
    ))
}

/// POST /api/wireguard/client
pub async fn create_peer(
    State(state): State<AppState>,
    body: ParsedBody,
) -> Result<Json<Peer>> {
    let name = body
        .str_field("name")
        .ok_or_else(|| Error::InvalidArgument("Missing: Name".to_string()))?;
    let peer = state.peers.create(name).await?;
    info!("New client: {} ({})", peer.name, peer.id);
    Ok(Json(peer))
}

/// DELETE /api/wireguard/client/{client_id}
pub async fn delete_peer(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_client_id(&client_id)?;
    state.peers.delete(id).await?;
    info!("Deleted client: {}", id);
    Ok(StatusCode::OK)
}

/// POST /api/wireguard/client/{client_id}/enable
pub async fn enable_peer(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<StatusCode> {
    set_peer_enabled(&state, &client_id, true).await
}

/// POST /api/wireguard/client/{client_id}/disable
pub async fn disable_peer(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Result<StatusCode> {
    set_peer_enabled(&state, &client_id, false).await
}

/// Two routes, one semantic operation. Idempotent: repeating a call
/// leaves the peer in the same state.
async fn set_peer_enabled(state: &AppState, client_id: &str, enabled: bool) -> Result<StatusCode> {
    let id = parse_client_id(client_id)?;
    if enabled {
        state.peers.enable(id).await?;
    } else {
        state.peers.disable(id).await?;
    }
    Ok(StatusCode::OK)
}

/// PUT /api/wireguard/client/{client_id}/name
pub async fn rename_peer(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    body: ParsedBody,
) -> Result<Json<Peer>> {
    let id = parse_client_id(&client_id)?;
    let name = body
        .str_field("name")
        .ok_or_else(|| Error::InvalidArgument("Missing: Name".to_string()))?;
    Ok(Json(state.peers.update_name(id, name).await?))
}

/// PUT /api/wireguard/client/{client_id}/address
pub async fn readdress_peer(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    body: ParsedBody,
) -> Result<Json<Peer>> {
    let id = parse_client_id(&client_id)?;
    let address = body
        .str_field("address")
        .ok_or_else(|| Error::InvalidArgument("Missing: Address".to_string()))?;
    Ok(Json(state.peers.update_address(id, address).await?))
}
