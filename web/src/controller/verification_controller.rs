use crate::AppState;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use log::*;

const NOT_FOUND_MESSAGE: &str = "Arquivo de verificação não encontrado.";
const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// GET /tiktok-verification.html
///
/// Serves the TikTok domain verification token, read from disk on every request.
#[utoipa::path(
    get,
    path = "/tiktok-verification.html",
    responses(
        (status = 200, description = "Verification file content", body = String, content_type = "text/plain"),
        (status = 404, description = "Verification file not found", body = String, content_type = "text/plain"),
    )
)]
pub async fn verification_file(State(app_state): State<AppState>) -> impl IntoResponse {
    let path = app_state.config.verification_file();

    match tokio::fs::read_to_string(path).await {
        Ok(content) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, TEXT_PLAIN)],
            content.trim().to_string(),
        ),
        Err(e) => {
            warn!("Verification file {} unavailable: {}", path, e);
            (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, TEXT_PLAIN)],
                NOT_FOUND_MESSAGE.to_string(),
            )
        }
    }
}
