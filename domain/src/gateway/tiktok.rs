//! TikTok OAuth and Open API client.
//!
//! This module provides an HTTP client for the TikTok Login Kit handshake
//! (authorization URL, code exchange) and the two Open API endpoints the relay
//! exposes: user info and video listing.
//!
//! TikTok reports many failures with an HTTP 200 and an error object in the
//! body, so responses are inspected as raw JSON instead of being trusted by
//! status code.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use log::*;
use serde::Serialize;
use serde_json::Value;

/// Scopes requested at login: basic profile (for `open_id`) and the video list.
pub const SCOPES: &str = "user.info.basic,video.list";

/// Fields requested from the user info endpoint.
pub const USER_INFO_FIELDS: [&str; 2] = ["open_id", "display_name"];

/// Fields requested for every video in the listing.
pub const VIDEO_FIELDS: [&str; 7] = [
    "id",
    "video_description",
    "create_time",
    "like_count",
    "comment_count",
    "share_count",
    "embed_link",
];

/// Identity of the TikTok user that owns an access token.
#[derive(Debug, Clone, PartialEq)]
pub struct UserIdentity {
    pub open_id: String,
    pub display_name: Option<String>,
}

/// Request to exchange authorization code for an access token
#[derive(Debug, Serialize)]
struct TokenExchangeRequest<'a> {
    client_key: &'a str,
    client_secret: &'a str,
    code: &'a str,
    grant_type: &'a str,
    redirect_uri: &'a str,
}

#[derive(Debug, Serialize)]
struct UserInfoRequest {
    fields: [&'static str; 2],
}

#[derive(Debug, Serialize)]
struct VideoListRequest<'a> {
    open_id: &'a str,
    cursor: u64,
    count: u32,
    fields: [&'static str; 7],
}

/// Endpoint URLs used by [`TikTokClient`]. Configurable so tests can point the
/// client at a mock server.
#[derive(Debug, Clone)]
pub struct TikTokUrls {
    pub auth_url: String,
    pub token_url: String,
    pub user_info_url: String,
    pub video_list_url: String,
}

impl TikTokUrls {
    /// Derive the Open API endpoint URLs from the authorize URL and the API base URL.
    pub fn new(auth_url: &str, api_base_url: &str) -> Self {
        let base = api_base_url.trim_end_matches('/');
        Self {
            auth_url: auth_url.to_string(),
            token_url: format!("{base}/oauth/token/"),
            user_info_url: format!("{base}/user/info/"),
            video_list_url: format!("{base}/video/list/"),
        }
    }
}

/// TikTok OAuth client for handling authentication and the Open API
pub struct TikTokClient {
    client: reqwest::Client,
    client_key: String,
    client_secret: String,
    redirect_uri: String,
    urls: TikTokUrls,
}

impl TikTokClient {
    pub fn new(
        client_key: &str,
        client_secret: &str,
        redirect_uri: &str,
        urls: TikTokUrls,
    ) -> Result<Self, Error> {
        let client = reqwest::Client::builder().use_rustls_tls().build()?;

        Ok(Self {
            client,
            client_key: client_key.to_string(),
            client_secret: client_secret.to_string(),
            redirect_uri: redirect_uri.to_string(),
            urls,
        })
    }

    /// Generate the OAuth authorization URL for user consent
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}?\
            client_key={}&\
            scope={}&\
            response_type=code&\
            redirect_uri={}&\
            state={}",
            self.urls.auth_url,
            urlencoding::encode(&self.client_key),
            urlencoding::encode(SCOPES),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(state)
        )
    }

    /// Exchange an authorization code for an access token.
    ///
    /// Any response without a non-empty string `access_token` is a
    /// `TokenExchange` error carrying the body TikTok sent back.
    pub async fn exchange_code(&self, code: &str) -> Result<String, Error> {
        let request = TokenExchangeRequest {
            client_key: &self.client_key,
            client_secret: &self.client_secret,
            code,
            grant_type: "authorization_code",
            redirect_uri: &self.redirect_uri,
        };

        debug!("Exchanging TikTok OAuth code for an access token");

        let response = self
            .client
            .post(&self.urls.token_url)
            .form(&request)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to exchange TikTok OAuth code: {:?}", e);
                Error::from(e)
            })?;

        let body = raw_json(response).await?;
        match body
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
        {
            Some(access_token) => {
                info!("Successfully exchanged TikTok OAuth code for an access token");
                Ok(access_token.to_string())
            }
            None => {
                warn!("TikTok token endpoint returned no access_token: {}", body);
                Err(Error::token_exchange(body))
            }
        }
    }

    /// Resolve the `open_id` (and display name) of the user owning `access_token`.
    pub async fn resolve_identity(&self, access_token: &str) -> Result<UserIdentity, Error> {
        debug!("Resolving TikTok user identity");

        let response = self
            .client
            .post(&self.urls.user_info_url)
            .bearer_auth(access_token)
            .json(&UserInfoRequest {
                fields: USER_INFO_FIELDS,
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to get TikTok user info: {:?}", e);
                Error::from(e)
            })?;

        let body = raw_json(response).await?;
        let user = body.pointer("/data/user");
        let open_id = user
            .and_then(|user| user.get("open_id"))
            .and_then(Value::as_str)
            .filter(|open_id| !open_id.is_empty());

        match open_id {
            Some(open_id) => Ok(UserIdentity {
                open_id: open_id.to_string(),
                display_name: user
                    .and_then(|user| user.get("display_name"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
            }),
            None => {
                warn!("TikTok user info returned no open_id: {}", body);
                Err(Error::identity_resolution(body))
            }
        }
    }

    /// List one page of the user's videos. The provider payload, including its
    /// `cursor` and `has_more` fields, is returned untouched.
    pub async fn list_videos(
        &self,
        access_token: &str,
        open_id: &str,
        cursor: u64,
        count: u32,
    ) -> Result<Value, Error> {
        debug!("Listing TikTok videos (cursor={}, count={})", cursor, count);

        let response = self
            .client
            .post(&self.urls.video_list_url)
            .bearer_auth(access_token)
            .json(&VideoListRequest {
                open_id,
                cursor,
                count,
                fields: VIDEO_FIELDS,
            })
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to list TikTok videos: {:?}", e);
                Error::from(e)
            })?;

        if !response.status().is_success() {
            warn!("TikTok video list answered {}", response.status());
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse TikTok video list response: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                    "Invalid response from TikTok video list".to_string(),
                )),
            }
        })
    }
}

/// Read a response body as JSON. A body that is not JSON is kept verbatim as a
/// JSON string so it can still be relayed as error details.
async fn raw_json(response: reqwest::Response) -> Result<Value, Error> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorKind;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    async fn setup_test_server() -> ServerGuard {
        Server::new_async().await
    }

    fn create_client(server_url: &str) -> TikTokClient {
        TikTokClient::new(
            "client_key_123",
            "client_secret_456",
            "https://relay.example/auth/tiktok/callback",
            TikTokUrls::new("https://www.tiktok.com/v2/auth/authorize/", server_url),
        )
        .unwrap()
    }

    #[test]
    fn test_urls_are_derived_from_base() {
        let urls = TikTokUrls::new("https://auth/", "https://api.example/v2/");
        assert_eq!(urls.token_url, "https://api.example/v2/oauth/token/");
        assert_eq!(urls.user_info_url, "https://api.example/v2/user/info/");
        assert_eq!(urls.video_list_url, "https://api.example/v2/video/list/");
    }

    #[test]
    fn test_authorization_url_contains_expected_params() {
        let client = create_client("https://api.example/v2");
        let url = client.authorization_url("nonce-1");

        assert!(url.starts_with("https://www.tiktok.com/v2/auth/authorize/?"));
        assert!(url.contains("client_key=client_key_123"));
        assert!(url.contains("scope=user.info.basic%2Cvideo.list"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains(
            "redirect_uri=https%3A%2F%2Frelay.example%2Fauth%2Ftiktok%2Fcallback"
        ));
        assert!(url.contains("state=nonce-1"));
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let mut server = setup_test_server().await;
        let client = create_client(&server.url());

        let mock = server
            .mock("POST", "/oauth/token/")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("client_key".into(), "client_key_123".into()),
                Matcher::UrlEncoded("client_secret".into(), "client_secret_456".into()),
                Matcher::UrlEncoded("code".into(), "auth-code".into()),
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded(
                    "redirect_uri".into(),
                    "https://relay.example/auth/tiktok/callback".into(),
                ),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"access_token": "act.123", "open_id": "o-1"}).to_string())
            .expect(1)
            .create_async()
            .await;

        let token = client.exchange_code("auth-code").await.unwrap();

        assert_eq!(token, "act.123");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_exchange_code_error_reported_with_200() {
        let mut server = setup_test_server().await;
        let client = create_client(&server.url());
        let provider_body = json!({
            "error": "invalid_grant",
            "error_description": "Authorization code is expired.",
            "log_id": "20230101"
        });

        let _mock = server
            .mock("POST", "/oauth/token/")
            .with_status(200)
            .with_body(provider_body.to_string())
            .create_async()
            .await;

        let err = client.exchange_code("expired").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Provider(
                ProviderErrorKind::TokenExchange {
                    details: provider_body
                }
            ))
        );
    }

    #[tokio::test]
    async fn test_exchange_code_non_json_body_kept_as_string() {
        let mut server = setup_test_server().await;
        let client = create_client(&server.url());

        let _mock = server
            .mock("POST", "/oauth/token/")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let err = client.exchange_code("code").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Provider(
                ProviderErrorKind::TokenExchange {
                    details: json!("Bad Gateway")
                }
            ))
        );
    }

    #[tokio::test]
    async fn test_exchange_code_empty_access_token_is_error() {
        let mut server = setup_test_server().await;
        let client = create_client(&server.url());
        let provider_body = json!({"access_token": "", "open_id": "o-1"});

        let _mock = server
            .mock("POST", "/oauth/token/")
            .with_body(provider_body.to_string())
            .create_async()
            .await;

        let err = client.exchange_code("code").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Provider(
                ProviderErrorKind::TokenExchange {
                    details: provider_body
                }
            ))
        );
    }

    #[tokio::test]
    async fn test_resolve_identity_success() {
        let mut server = setup_test_server().await;
        let client = create_client(&server.url());

        let mock = server
            .mock("POST", "/user/info/")
            .match_header("authorization", "Bearer act.123")
            .match_body(Matcher::Json(json!({"fields": ["open_id", "display_name"]})))
            .with_status(200)
            .with_body(
                json!({
                    "data": {"user": {"open_id": "o-1", "display_name": "Ana"}},
                    "error": {"code": "ok", "message": ""}
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let user = client.resolve_identity("act.123").await.unwrap();

        assert_eq!(
            user,
            UserIdentity {
                open_id: "o-1".to_string(),
                display_name: Some("Ana".to_string()),
            }
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_resolve_identity_without_open_id() {
        let mut server = setup_test_server().await;
        let client = create_client(&server.url());
        let provider_body = json!({
            "data": {},
            "error": {"code": "access_token_invalid", "message": "The access token is invalid."}
        });

        let _mock = server
            .mock("POST", "/user/info/")
            .with_status(401)
            .with_body(provider_body.to_string())
            .create_async()
            .await;

        let err = client.resolve_identity("stale").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Provider(
                ProviderErrorKind::IdentityResolution {
                    details: provider_body
                }
            ))
        );
    }

    #[tokio::test]
    async fn test_resolve_identity_empty_open_id_is_error() {
        let mut server = setup_test_server().await;
        let client = create_client(&server.url());
        let provider_body = json!({"data": {"user": {"open_id": "", "display_name": "Ana"}}});

        let _mock = server
            .mock("POST", "/user/info/")
            .with_body(provider_body.to_string())
            .create_async()
            .await;

        let err = client.resolve_identity("act.123").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Provider(
                ProviderErrorKind::IdentityResolution {
                    details: provider_body
                }
            ))
        );
    }

    #[tokio::test]
    async fn test_resolve_identity_ignores_malformed_display_name() {
        let mut server = setup_test_server().await;
        let client = create_client(&server.url());

        let _mock = server
            .mock("POST", "/user/info/")
            .with_body(json!({"data": {"user": {"open_id": "o-1", "display_name": 42}}}).to_string())
            .create_async()
            .await;

        let user = client.resolve_identity("act.123").await.unwrap();

        assert_eq!(
            user,
            UserIdentity {
                open_id: "o-1".to_string(),
                display_name: None,
            }
        );
    }

    #[tokio::test]
    async fn test_list_videos_passes_payload_through() {
        let mut server = setup_test_server().await;
        let client = create_client(&server.url());
        let provider_body = json!({
            "data": {
                "videos": [{"id": "v1", "like_count": 3}],
                "cursor": 1700000000000u64,
                "has_more": true
            },
            "error": {"code": "ok"}
        });

        let mock = server
            .mock("POST", "/video/list/")
            .match_header("authorization", "Bearer act.123")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "open_id": "o-1",
                "cursor": 0,
                "count": 10,
                "fields": [
                    "id",
                    "video_description",
                    "create_time",
                    "like_count",
                    "comment_count",
                    "share_count",
                    "embed_link"
                ]
            })))
            .with_status(200)
            .with_body(provider_body.to_string())
            .expect(1)
            .create_async()
            .await;

        let videos = client.list_videos("act.123", "o-1", 0, 10).await.unwrap();

        assert_eq!(videos, provider_body);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_videos_rejects_non_json() {
        let mut server = setup_test_server().await;
        let client = create_client(&server.url());

        let _mock = server
            .mock("POST", "/video/list/")
            .with_status(500)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let err = client.list_videos("act.123", "o-1", 0, 10).await.unwrap_err();

        assert!(matches!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Other(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_network_error() {
        // Nothing listens on port 9 locally.
        let client = create_client("http://127.0.0.1:9/v2");

        let err = client.exchange_code("code").await.unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::External(ExternalErrorKind::Network)
        );
    }
}
