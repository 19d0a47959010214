//! Request extractors

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use std::convert::Infallible;
use tracing::debug;

/// Extract the caller's bearer token from the request
///
/// Checks for token in the following order:
/// 1. Authorization header (Bearer token)
/// 2. Cookie named "token"
fn extract_token_from_request(req: &HttpRequest) -> Option<String> {
    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                let token = token.trim();
                if !token.is_empty() {
                    return Some(token.to_string());
                }
            }
        }
    }

    if let Some(cookie) = req.cookie("token") {
        return Some(cookie.value().to_string());
    }

    None
}

/// Bearer token to forward to the REST backend
///
/// The gateway does not validate tokens itself; authentication stays with the
/// backend, which answers 401/403 when the token is missing or wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendToken(pub Option<String>);

impl BackendToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequest for BackendToken {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = extract_token_from_request(req);
        if token.is_none() {
            debug!("No bearer token on request; calling backend anonymously");
        }
        ready(Ok(BackendToken(token)))
    }
}
