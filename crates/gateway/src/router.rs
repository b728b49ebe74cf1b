//! Gateway Router
//!
//! Declarative route table over the handlers, with the pipeline
//! middlewares layered in order: body parsing, then session resolution,
//! then the capability gate. The whole table nests under the configured
//! base path.

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppState;
use crate::handlers;
use crate::middleware::{mw_capability_gate, mw_parse_body, mw_resolve_session};

/// Build the gateway application (shared between production startup and
/// tests).
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/release", get(handlers::get_release))
        .route(
            "/api/session",
            get(handlers::get_session)
                .post(handlers::create_session)
                .delete(handlers::delete_session),
        )
        .route(
            "/api/wireguard/client",
            get(handlers::list_peers).post(handlers::create_peer),
        )
        .route(
            "/api/wireguard/client/{client_id}",
            delete(handlers::delete_peer),
        )
        .route(
            "/api/wireguard/client/{client_id}/qrcode.svg",
            get(handlers::peer_qrcode),
        )
        .route(
            "/api/wireguard/client/{client_id}/configuration",
            get(handlers::peer_configuration),
        )
        .route(
            "/api/wireguard/client/{client_id}/enable",
            post(handlers::enable_peer),
        )
        .route(
            "/api/wireguard/client/{client_id}/disable",
            post(handlers::disable_peer),
        )
        .route(
            "/api/wireguard/client/{client_id}/name",
            put(handlers::rename_peer),
        )
        .route(
            "/api/wireguard/client/{client_id}/address",
            put(handlers::readdress_peer),
        )
        // Innermost first: the gate sees requests only after a session
        // was resolved, which in turn sees only parsed bodies.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            mw_capability_gate,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            mw_resolve_session,
        ))
        .layer(middleware::from_fn(mw_parse_body))
        .with_state(state.clone());

    let router = if state.config.base_path.is_empty() {
        api
    } else {
        Router::new().nest(&state.config.base_path, api)
    };

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
