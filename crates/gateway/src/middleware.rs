//! Request pipeline middleware
//!
//! Three stages run in front of every handler, each able to
//! short-circuit: body parsing, session resolution, and the capability
//! gate for protected routes.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::debug;

use crate::config::AppState;
use crate::ctx::{Ctx, ParsedBody};
use crate::error::{Error, Result};

/// Name of the session cookie issued by the gateway.
pub const SESSION_COOKIE: &str = "wg_session";

/// Largest accepted request body. Peer mutations carry tiny JSON
/// payloads; anything bigger is not a legitimate request.
const BODY_LIMIT: usize = 64 * 1024;

/// Route tiers: who may reach a route, decided statically from
/// (method, path) before any handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Reachable regardless of auth state.
    Public,
    /// The password-submission route; its purpose is to establish auth.
    Login,
    /// Requires an authenticated session.
    Protected,
}

/// Static route classification. Anything not explicitly public sits
/// behind the authentication gate, including unknown paths.
pub fn classify(method: &Method, path: &str) -> Tier {
    match (method, path) {
        (&Method::GET, "/api/release") | (&Method::GET, "/api/session") => Tier::Public,
        (&Method::POST, "/api/session") => Tier::Login,
        _ => Tier::Protected,
    }
}

/// Parse a JSON request body before anything else looks at the request.
/// Unparsable input fails with 400 here, ahead of session resolution and
/// the auth gate.
pub async fn mw_parse_body(req: Request, next: Next) -> Result<Response> {
    let (parts, body) = req.into_parts();

    let is_json = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);

    let bytes = axum::body::to_bytes(body, BODY_LIMIT)
        .await
        .map_err(|_| Error::MalformedBody("Unreadable Request Body".to_string()))?;

    let parsed = if is_json && !bytes.is_empty() {
        let value = serde_json::from_slice(&bytes)
            .map_err(|_| Error::MalformedBody("Malformed JSON Body".to_string()))?;
        ParsedBody(value)
    } else {
        ParsedBody::default()
    };

    let mut req = Request::from_parts(parts, Body::from(bytes));
    req.extensions_mut().insert(parsed);
    Ok(next.run(req).await)
}

/// Attach a session to the request: reuse the token from the session
/// cookie when it still resolves, otherwise mint a fresh anonymous
/// session and set the cookie, scoped to the base path.
pub async fn mw_resolve_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response> {
    let existing = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|token| state.sessions.session(token).is_some());

    let (token, jar) = match existing {
        Some(token) => (token, jar),
        None => {
            let session = state.sessions.open_session();
            debug!("Opened session: {}", session.token);
            let cookie = Cookie::build((SESSION_COOKIE, session.token.clone()))
                .path(state.config.cookie_path().to_string())
                .http_only(true)
                .build();
            (session.token, jar.add(cookie))
        }
    };

    req.extensions_mut().insert(Ctx::new(token));
    let response = next.run(req).await;
    Ok((jar, response).into_response())
}

/// Authentication gate. Protected-tier routes are rejected with 401
/// before their handler is ever invoked; public and login tiers pass
/// through untouched.
pub async fn mw_capability_gate(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response> {
    let tier = classify(req.method(), req.uri().path());
    debug!("MIDDLEWARE: capability_gate {:?} {:?}", req.method(), tier);

    if tier == Tier::Protected {
        let ctx = req
            .extensions()
            .get::<Ctx>()
            .cloned()
            .ok_or(Error::SessionCtxMissing)?;
        if !state.sessions.status(ctx.token()).authenticated {
            return Err(Error::NotLoggedIn);
        }
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_tiers_are_static() {
        assert_eq!(classify(&Method::GET, "/api/release"), Tier::Public);
        assert_eq!(classify(&Method::GET, "/api/session"), Tier::Public);
        assert_eq!(classify(&Method::POST, "/api/session"), Tier::Login);
        assert_eq!(classify(&Method::DELETE, "/api/session"), Tier::Protected);
        assert_eq!(
            classify(&Method::GET, "/api/wireguard/client"),
            Tier::Protected
        );
        assert_eq!(
            classify(&Method::POST, "/api/wireguard/client"),
            Tier::Protected
        );
        // Unknown paths fall in the protected tier.
        assert_eq!(classify(&Method::GET, "/api/unknown"), Tier::Protected);
    }
}
