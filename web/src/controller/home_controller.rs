use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// GET /
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Greeting confirming the relay is up", body = Object),
    )
)]
pub async fn greeting() -> impl IntoResponse {
    Json(json!({"message": "TikTok API v2 - relay funcionando 🚀"}))
}
