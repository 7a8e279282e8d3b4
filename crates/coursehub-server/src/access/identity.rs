//! Request identity extraction.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use super::session::bearer_token;
use crate::error::ApiError;
use crate::routes::AppState;

/// Opaque user id of the caller, taken from a verified session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub String);

impl Identity {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or(ApiError::Authorization)?;

        let claims = state.sessions.verify(token).map_err(|e| {
            debug!(error = %e, "Session token rejected");
            ApiError::Authorization
        })?;

        if claims.sub.is_empty() {
            return Err(ApiError::Authorization);
        }
        Ok(Self(claims.sub))
    }
}
