//! Payment provider callbacks.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tracing::warn;

use super::AppState;
use crate::error::{ApiError, ApiResult};
use crate::storage::Purchase;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseEvent {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub course_id: String,
}

/// `POST /api/webhooks/purchase`: record a completed checkout.
pub async fn purchase(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<PurchaseEvent>, JsonRejection>,
) -> ApiResult<Json<Purchase>> {
    let Some(expected) = state.webhook_secret.as_deref() else {
        warn!("Purchase webhook called without a configured secret");
        return Err(ApiError::Authorization);
    };
    let provided = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    if !secret_matches(provided, expected) {
        warn!("Purchase webhook secret mismatch");
        return Err(ApiError::Authorization);
    }

    let Json(event) = body?;
    Ok(Json(
        state
            .catalog
            .record_purchase(&event.user_id, &event.course_id)
            .await?,
    ))
}

/// Constant-time comparison of the provided header against the configured secret.
fn secret_matches(provided: Option<&str>, expected: &str) -> bool {
    provided.is_some_and(|p| p.as_bytes().ct_eq(expected.as_bytes()).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_secret_is_accepted() {
        assert!(secret_matches(Some("whsec_test"), "whsec_test"));
    }

    #[test]
    fn same_length_wrong_secret_is_rejected() {
        assert!(!secret_matches(Some("whsec_tesX"), "whsec_test"));
    }

    #[test]
    fn missing_or_shorter_secret_is_rejected() {
        assert!(!secret_matches(None, "whsec_test"));
        assert!(!secret_matches(Some("whsec"), "whsec_test"));
        assert!(!secret_matches(Some(""), "whsec_test"));
    }
}
