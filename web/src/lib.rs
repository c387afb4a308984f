use axum::http::{header, HeaderValue, Method};
use axum::Router;
use log::*;
use service::config::Config;
use sha2::{Digest, Sha512};
use tower_http::cors::CorsLayer;
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, SessionManagerLayer};

pub use self::session_store::ExpiringMemoryStore;
use self::session_store::EXPIRED_DELETION_PERIOD;

pub use self::error::{Error, Result};
pub(crate) use service::AppState;

mod controller;
mod error;
mod extractors;
mod router;
mod session_store;

#[cfg(test)]
mod test_support;

/// Name of the cookie carrying the caller's session id.
pub const SESSION_COOKIE_NAME: &str = "session_tiktok";

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let config = &app_state.config;
    if config.uses_default_session_secret() {
        warn!("SESSION_SECRET_KEY is not set, session cookies are signed with the built-in default secret");
    }

    let server_url = format!("{}:{}", config.interface(), config.port);
    let listener = tokio::net::TcpListener::bind(&server_url).await?;

    info!(
        "Server starting... listening for connections on http://{} ({} environment)",
        server_url,
        config.runtime_env()
    );

    let session_store = ExpiringMemoryStore::default();
    tokio::task::spawn(
        session_store
            .clone()
            .delete_expired_every(EXPIRED_DELETION_PERIOD),
    );

    axum::serve(listener, app(app_state, session_store)).await
}

/// The complete application: routes wrapped in the session and CORS layers.
pub fn app(app_state: AppState, session_store: ExpiringMemoryStore) -> Router {
    let config = &app_state.config;
    let expiry_seconds = i64::try_from(config.session_expiry_seconds).unwrap_or(i64::MAX);

    let session_layer = SessionManagerLayer::new(session_store)
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(config.is_production())
        // TikTok redirects back to the callback cross-site; Strict would drop the cookie.
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(expiry_seconds)))
        .with_signed(session_key(config.session_secret_key()));
    let cors_layer = cors_layer(config);

    router::define_routes(app_state)
        .layer(session_layer)
        .layer(cors_layer)
}

/// Stretch the configured secret to the 64 bytes a cookie signing key requires.
fn session_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .inspect_err(|e| warn!("Ignoring invalid CORS origin {origin}: {e}"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
