//! Controller for the TikTok OAuth flow.
//!
//! Login sends the caller to TikTok's consent page; TikTok sends them back to
//! the callback with a one-time `code`, which is exchanged for an access token
//! and stored in the caller's session.

use crate::error::WebErrorKind;
use crate::extractors::tiktok_session::TikTokSession;
use crate::{AppState, Error};

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use domain::tiktok_oauth;
use log::*;
use serde::Deserialize;

/// Where the caller lands after a successful callback.
const AFTER_LOGIN_PATH: &str = "/me/videos";

/// Query parameters TikTok appends to the redirect URI
#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set instead of `code` when the user denies consent.
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// 302 Found with a Location header.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// GET /login/tiktok
///
/// Starts the OAuth flow by redirecting to TikTok's authorization page.
#[utoipa::path(
    get,
    path = "/login/tiktok",
    responses(
        (status = 302, description = "Redirect to TikTok OAuth"),
        (status = 500, description = "Server error (OAuth not configured)"),
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    mut session: TikTokSession,
) -> Result<impl IntoResponse, Error> {
    let state = session.issue_state().await?;
    let url = tiktok_oauth::authorize_url(&app_state.config, &state)?;

    Ok(found(&url))
}

/// GET|POST /auth/tiktok/callback
///
/// Handles the OAuth callback from TikTok after user authorization.
#[utoipa::path(
    get,
    path = "/auth/tiktok/callback",
    params(
        ("code" = Option<String>, Query, description = "Authorization code from TikTok"),
        ("state" = Option<String>, Query, description = "State issued at login"),
    ),
    responses(
        (status = 302, description = "Redirect to /me/videos on success"),
        (status = 400, description = "Missing code, invalid state or token exchange failure"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    mut session: TikTokSession,
    Query(params): Query<OAuthCallback>,
) -> Result<impl IntoResponse, Error> {
    let code = match params.code.as_deref().filter(|code| !code.is_empty()) {
        Some(code) => code,
        None => {
            if let Some(error) = &params.error {
                warn!(
                    "TikTok authorization was not granted: {} ({})",
                    error,
                    params.error_description.as_deref().unwrap_or("no description")
                );
            }
            return Err(Error::Web(WebErrorKind::MissingAuthorizationCode));
        }
    };

    session.verify_state(params.state.as_deref()).await?;

    let access_token = tiktok_oauth::exchange_code(&app_state.config, code).await?;
    session.store_access_token(access_token).await?;

    info!("Stored TikTok access token in session");
    Ok(found(AFTER_LOGIN_PATH))
}
