//! Explicit operator session passed to every backend-calling component.

use actix_web::error::ErrorUnauthorized;
use actix_web::{Error, HttpRequest};

/// Bearer token of the operator driving the workflow. Deliberately a value
/// that is threaded through calls, not process-wide state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.access_token
    }

    /// Extract the bearer token from the Authorization header.
    pub fn from_request(req: &HttpRequest) -> Result<Self, Error> {
        req.headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|auth| auth.strip_prefix("Bearer "))
            .filter(|token| !token.is_empty())
            .map(Session::new)
            .ok_or_else(|| ErrorUnauthorized("Missing authorization token"))
    }
}
