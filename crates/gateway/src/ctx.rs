use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::Value;

use crate::error::{Error, Result};

/// Per-request session context, attached by the session-resolution
/// middleware.
#[derive(Clone, Debug)]
pub struct Ctx {
    token: String,
}

impl Ctx {
    pub fn new(token: String) -> Self {
        Self { token }
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Ctx>()
            .cloned()
            .ok_or(Error::SessionCtxMissing)
    }
}

/// The request body, parsed into JSON by the body-parsing middleware
/// before authentication runs. `Value::Null` when the request carried no
/// JSON body.
#[derive(Clone, Debug, Default)]
pub struct ParsedBody(pub Value);

impl ParsedBody {
    /// Raw field access, any JSON type.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Field access constrained to JSON strings.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }
}

impl<S> FromRequestParts<S> for ParsedBody
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        Ok(parts
            .extensions
            .get::<ParsedBody>()
            .cloned()
            .unwrap_or_default())
    }
}
