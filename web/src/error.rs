use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use domain::error::{
    DomainErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind, ProviderErrorKind,
};

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Domain(DomainError),
    Web(WebErrorKind),
}

/// Errors raised by the web layer itself, before or around any domain call.
#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    /// The callback arrived without a `code` query parameter.
    MissingAuthorizationCode,
    /// The callback `state` does not match the one issued to this session.
    InvalidState,
    /// No access token is stored in the caller's session.
    NotAuthenticated,
    /// The session store could not be read or written.
    Session,
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ErrorBody {
    fn new(error: &'static str) -> Self {
        Self {
            error,
            details: None,
        }
    }

    fn with_details(error: &'static str, details: Value) -> Self {
        Self {
            error,
            details: Some(details),
        }
    }
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Error::Web(web_error_kind) => match web_error_kind {
                WebErrorKind::MissingAuthorizationCode => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::new("Código de autorização ausente."),
                ),
                WebErrorKind::InvalidState => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::new("Parâmetro state inválido."),
                ),
                WebErrorKind::NotAuthenticated => (
                    StatusCode::UNAUTHORIZED,
                    ErrorBody::new("Você precisa se autenticar primeiro."),
                ),
                WebErrorKind::Session => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Falha ao acessar a sessão."),
                ),
            },
            Error::Domain(domain_error) => domain_error_response(domain_error),
        };

        (status, Json(body)).into_response()
    }
}

fn domain_error_response(domain_error: DomainError) -> (StatusCode, ErrorBody) {
    match domain_error.error_kind {
        DomainErrorKind::Internal(internal_error_kind) => {
            error!("Internal error: {:?}", domain_error.source);
            match internal_error_kind {
                InternalErrorKind::Config => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Integração com o TikTok não configurada."),
                ),
                InternalErrorKind::Other(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("Erro interno do servidor."),
                ),
            }
        }
        DomainErrorKind::External(external_error_kind) => match external_error_kind {
            ExternalErrorKind::Provider(provider_error_kind) => match provider_error_kind {
                ProviderErrorKind::TokenExchange { details } => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::with_details("Falha ao obter access_token", details),
                ),
                ProviderErrorKind::IdentityResolution { details } => (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::with_details("Não foi possível obter open_id", details),
                ),
            },
            ExternalErrorKind::Network => (
                StatusCode::BAD_GATEWAY,
                ErrorBody::new("Falha de comunicação com o TikTok."),
            ),
            ExternalErrorKind::Other(_) => (
                StatusCode::BAD_GATEWAY,
                ErrorBody::new("Resposta inválida do TikTok."),
            ),
        },
    }
}

impl From<DomainError> for Error {
    fn from(err: DomainError) -> Self {
        Error::Domain(err)
    }
}

impl From<tower_sessions::session::Error> for Error {
    fn from(err: tower_sessions::session::Error) -> Self {
        error!("Session store error: {err:?}");
        Error::Web(WebErrorKind::Session)
    }
}
