use crate::extractors::tiktok_session::TikTokSession;
use crate::{AppState, Error};

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use domain::tiktok_oauth;

/// GET /me/videos
///
/// Lists the first page of the signed-in caller's TikTok videos. The body is
/// TikTok's video list response as-is.
#[utoipa::path(
    get,
    path = "/me/videos",
    responses(
        (status = 200, description = "TikTok video list payload", body = Object),
        (status = 400, description = "TikTok did not return an open_id"),
        (status = 401, description = "No access token in session"),
        (status = 502, description = "TikTok could not be reached"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn my_videos(
    State(app_state): State<AppState>,
    session: TikTokSession,
) -> Result<impl IntoResponse, Error> {
    let access_token = session.require_access_token()?;
    let videos = tiktok_oauth::list_my_videos(&app_state.config, access_token).await?;

    Ok(Json(videos))
}
