use crate::{error::Result, models::jira::JiraEvent, state::AppState};
use axum::{extract::State, response::Json, routing::post, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(receive_webhook))
}

async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>> {
    let event = JiraEvent::from_value(payload)?;
    debug!("received Jira event: {:?}", event);

    state.jira_service.handle(event).await?;

    Ok(Json(json!({ "success": true })))
}
