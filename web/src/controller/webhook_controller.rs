//! Controller for webhooks sent by TikTok.
//!
//! Payloads are not interpreted; they are acknowledged by echoing them back.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::response::IntoResponse;
use axum::Json;
use log::*;
use serde::Serialize;
use serde_json::Value;

/// Response for webhook acknowledgment
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub received: Value,
}

/// POST /webhook
///
/// Acknowledges a webhook by returning its JSON body under `received`. The body
/// is parsed as JSON whatever its `Content-Type`.
#[utoipa::path(
    post,
    path = "/webhook",
    request_body(content = Object, content_type = "application/json"),
    responses(
        (status = 200, description = "The received payload, unchanged", body = Object),
        (status = 400, description = "Body is not valid JSON"),
    )
)]
pub async fn receive(body: Bytes) -> Result<impl IntoResponse, JsonRejection> {
    let Json(payload) = Json::<Value>::from_bytes(&body).inspect_err(|e| {
        warn!("Rejected webhook with invalid JSON body: {}", e);
    })?;

    debug!("Received webhook: {}", payload);
    Ok(Json(WebhookResponse { received: payload }))
}
