use crate::{
    error::{AppError, Result},
    models::github::GithubEvent,
    state::AppState,
};
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::Json,
    routing::post,
    Router,
};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha1::Sha1;
use std::sync::Arc;
use tracing::debug;

type HmacSha1 = Hmac<Sha1>;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(receive_webhook))
}

async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    verify_signature(&state.config.github_webhook_secret, &headers, &body)?;

    let event_name = headers
        .get("x-github-event")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::bad_request("missing x-github-event header"))?;
    debug!("received GitHub event: {}", event_name);

    let payload: Value = serde_json::from_slice(&body)?;
    let event = GithubEvent::from_parts(event_name, payload)?;
    state.github_service.handle(event).await?;

    Ok(Json(json!({ "success": true })))
}

/// Verify the `x-hub-signature` header: HMAC-SHA1 of the raw request body,
/// keyed with the shared webhook secret. `Mac::verify_slice` compares in
/// constant time.
fn verify_signature(secret: &str, headers: &HeaderMap, body: &[u8]) -> Result<()> {
    let signature = headers
        .get("x-hub-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::SignatureVerification)?;

    let signature_hex = signature
        .strip_prefix("sha1=")
        .ok_or(AppError::SignatureVerification)?;
    let signature_bytes =
        hex::decode(signature_hex).map_err(|_| AppError::SignatureVerification)?;

    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::internal("invalid webhook secret"))?;
    mac.update(body);
    mac.verify_slice(&signature_bytes)
        .map_err(|_| AppError::SignatureVerification)
}
