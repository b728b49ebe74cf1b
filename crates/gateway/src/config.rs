//! Gateway configuration

use std::sync::Arc;

use crate::peer_store::PeerStore;
use crate::session::SessionAuthenticator;

/// Configuration for the gateway, read from the environment once at
/// startup and immutable afterwards.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Address to bind the listener to
    pub bind: String,
    /// Listening port
    pub port: u16,
    /// Shared admin password; `None` disables authentication entirely
    pub password: Option<String>,
    /// Release identifier reported on `/api/release`
    pub release: String,
    /// URL prefix under which every route is namespaced ("" for none)
    pub base_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 51821,
            password: None,
            release: env!("CARGO_PKG_VERSION").to_string(),
            base_path: String::new(),
        }
    }
}

impl GatewayConfig {
    /// Read configuration from the environment (PORT, PASSWORD, RELEASE,
    /// BASEPATH, BIND).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind: std::env::var("BIND").unwrap_or(defaults.bind),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            password: std::env::var("PASSWORD").ok().filter(|p| !p.is_empty()),
            release: std::env::var("RELEASE").unwrap_or(defaults.release),
            base_path: normalize_base_path(
                &std::env::var("BASEPATH").unwrap_or_default(),
            ),
        }
    }

    /// Cookie path for the session cookie: the base path, or "/" when
    /// running at the root.
    pub fn cookie_path(&self) -> &str {
        if self.base_path.is_empty() {
            "/"
        } else {
            &self.base_path
        }
    }
}

/// Normalize a base path to either "" or "/prefix" with no trailing slash.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub sessions: Arc<SessionAuthenticator>,
    pub peers: Arc<dyn PeerStore>,
}

impl AppState {
    pub fn new(config: Arc<GatewayConfig>, peers: Arc<dyn PeerStore>) -> Self {
        let sessions = Arc::new(SessionAuthenticator::new(config.password.clone()));
        Self {
            config,
            sessions,
            peers,
        }
    }
}
