use crate::error::{Error, WebErrorKind};
use crate::extractors::RejectionType;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use domain::oauth_state;
use log::*;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Key under which the typed session record is stored.
const SESSION_KEY: &str = "tiktok";

/// Everything the relay keeps about a caller between requests.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct TikTokSessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// State issued at login and not yet returned by a callback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth_state: Option<String>,
}

/// The caller's session, loaded once per request as a typed record.
///
/// Every mutation is written back to the session store immediately.
pub(crate) struct TikTokSession {
    session: Session,
    data: TikTokSessionData,
}

impl<S> FromRequestParts<S> for TikTokSession
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(status, msg)| (status, msg.to_string()))?;

        let data = session
            .get::<TikTokSessionData>(SESSION_KEY)
            .await
            .map_err(|e| {
                error!("Failed to load session data: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to load session".to_string(),
                )
            })?
            .unwrap_or_default();

        Ok(TikTokSession { session, data })
    }
}

impl TikTokSession {
    pub(crate) fn access_token(&self) -> Option<&str> {
        self.data.access_token.as_deref()
    }

    /// Returns the stored access token or `NotAuthenticated`.
    pub(crate) fn require_access_token(&self) -> Result<&str, Error> {
        self.access_token()
            .ok_or(Error::Web(WebErrorKind::NotAuthenticated))
    }

    /// Generate a new OAuth state for this session, replacing any previous one.
    pub(crate) async fn issue_state(&mut self) -> Result<String, Error> {
        let state = oauth_state::generate();
        self.data.oauth_state = Some(state.clone());
        self.save().await?;
        Ok(state)
    }

    /// Consume the issued state and check it against the one returned by TikTok.
    /// The stored state is cleared whether or not it matches.
    pub(crate) async fn verify_state(&mut self, returned: Option<&str>) -> Result<(), Error> {
        let issued = self.data.oauth_state.take();
        if issued.is_some() {
            self.save().await?;
        }

        if oauth_state::verify(issued.as_deref(), returned) {
            Ok(())
        } else {
            warn!("OAuth callback state does not match the state issued to this session");
            Err(Error::Web(WebErrorKind::InvalidState))
        }
    }

    /// Store the token under a fresh session id, so an id handed out before
    /// login cannot be used to reach the authenticated session.
    pub(crate) async fn store_access_token(&mut self, access_token: String) -> Result<(), Error> {
        self.session.cycle_id().await?;
        self.data.access_token = Some(access_token);
        self.save().await
    }

    async fn save(&self) -> Result<(), Error> {
        self.session.insert(SESSION_KEY, &self.data).await?;
        Ok(())
    }
}
