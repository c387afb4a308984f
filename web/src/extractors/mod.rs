pub(crate) mod tiktok_session;

use axum::http::StatusCode;

type RejectionType = (StatusCode, String);
