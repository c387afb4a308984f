use crate::{
    controller::{
        health_check_controller, home_controller, oauth_controller, verification_controller,
        video_controller, webhook_controller,
    },
    AppState, SESSION_COOKIE_NAME,
};
use axum::{
    routing::{get, post},
    Router,
};

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path and schema must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "TikTok Relay API"
        ),
        paths(
            home_controller::greeting,
            health_check_controller::health_check,
            oauth_controller::login,
            oauth_controller::callback,
            video_controller::my_videos,
            webhook_controller::receive,
            verification_controller::verification_file,
        ),
        modifiers(&SecurityAddon),
        tags(
            (name = "tiktok_relay", description = "TikTok OAuth and video listing relay")
        )
    )]
struct ApiDoc;

struct SecurityAddon;

// Defines the cookie session that carries the TikTok access token between requests.
impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    SESSION_COOKIE_NAME,
                    "Session cookie set by /login/tiktok and /auth/tiktok/callback",
                ))),
            )
        }
    }
}

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(home_routes())
        .merge(health_routes())
        .merge(oauth_routes(app_state.clone()))
        .merge(video_routes(app_state.clone()))
        .merge(webhook_routes())
        .merge(verification_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn home_routes() -> Router {
    Router::new().route("/", get(home_controller::greeting))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

/// Routes for the TikTok OAuth flow
fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/login/tiktok", get(oauth_controller::login))
        .route(
            "/auth/tiktok/callback",
            get(oauth_controller::callback).post(oauth_controller::callback),
        )
        .with_state(app_state)
}

fn video_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/me/videos", get(video_controller::my_videos))
        .with_state(app_state)
}

/// Routes for TikTok webhooks (no authentication)
fn webhook_routes() -> Router {
    Router::new().route("/webhook", post(webhook_controller::receive))
}

fn verification_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/tiktok-verification.html",
            get(verification_controller::verification_file),
        )
        .with_state(app_state)
}
