use crate::error::Error;
use crate::gateway::tiktok::{TikTokClient, TikTokUrls};
use log::*;
use serde_json::Value;
use service::config::Config;

/// Cursor of the first page of the video list.
pub const FIRST_PAGE_CURSOR: u64 = 0;

/// Number of videos requested per listing.
pub const VIDEO_PAGE_SIZE: u32 = 10;

/// Build the TikTok authorization URL the login route redirects to.
pub fn authorize_url(config: &Config, state: &str) -> Result<String, Error> {
    let client_key = config.tt_client_key().ok_or_else(Error::config)?;
    let redirect_uri = config.redirect_uri().ok_or_else(Error::config)?;

    // The secret is not part of the consent URL.
    let client = TikTokClient::new(&client_key, "", &redirect_uri, urls(config))?;

    info!("Redirecting caller to TikTok OAuth");
    Ok(client.authorization_url(state))
}

/// Exchange an authorization code for an access token.
pub async fn exchange_code(config: &Config, authorization_code: &str) -> Result<String, Error> {
    info!("Processing TikTok OAuth callback");

    create_tiktok_client(config)?
        .exchange_code(authorization_code)
        .await
        .inspect_err(|e| warn!("Failed to exchange TikTok OAuth code: {:?}", e))
}

/// Fetch the first page of videos of the user owning `access_token`.
///
/// The user's `open_id` is resolved first; the video list is only requested
/// once that succeeds.
pub async fn list_my_videos(config: &Config, access_token: &str) -> Result<Value, Error> {
    let client = create_tiktok_client(config)?;

    let user = client
        .resolve_identity(access_token)
        .await
        .inspect_err(|e| warn!("Failed to resolve TikTok identity: {:?}", e))?;

    debug!(
        "Listing videos for TikTok user {} ({})",
        user.open_id,
        user.display_name.as_deref().unwrap_or("-")
    );

    client
        .list_videos(
            access_token,
            &user.open_id,
            FIRST_PAGE_CURSOR,
            VIDEO_PAGE_SIZE,
        )
        .await
}

fn urls(config: &Config) -> TikTokUrls {
    TikTokUrls::new(config.tiktok_auth_url(), config.tiktok_api_base_url())
}

/// Create a TikTok client from config.
fn create_tiktok_client(config: &Config) -> Result<TikTokClient, Error> {
    let client_key = config.tt_client_key().ok_or_else(Error::config)?;
    let client_secret = config.tt_client_secret().ok_or_else(Error::config)?;
    let redirect_uri = config.redirect_uri().ok_or_else(Error::config)?;

    TikTokClient::new(&client_key, &client_secret, &redirect_uri, urls(config))
}
