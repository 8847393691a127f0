use axum::{Json, http::StatusCode, response::IntoResponse};
use oauth2::basic::BasicErrorResponseType;
use oauth2::reqwest::Error as ReqwestClientError;
use oauth2::{HttpClientError, RequestTokenError, StandardErrorResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum AuthError {
    /// Missing or empty required request fields.
    #[error("{0}")]
    Validation(&'static str),

    /// Wrong password, unknown username, or a pure-SSO account attempting a
    /// local login. A single variant so no distinction leaks.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already exists")]
    DuplicateUsername,

    /// Forgot-password only; that endpoint presupposes username disclosure.
    #[error("User not found")]
    UserNotFound,

    /// Expired or invalid-signature bearer token, collapsed uniformly.
    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0} OAuth not configured")]
    ProviderNotConfigured(&'static str),

    /// Token exchange or profile fetch failed; surfaced as a redirect with a
    /// human-readable message, never a raw exception.
    #[error("{0}")]
    ProviderExchange(String),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Password hash error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    #[error("Token signing error: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Message carried to the frontend as an `sso=error` redirect when the
    /// error occurs inside a provider callback flow.
    pub fn redirect_message(&self) -> String {
        match self {
            AuthError::ProviderExchange(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl
    From<
        RequestTokenError<
            HttpClientError<ReqwestClientError>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    > for AuthError
{
    fn from(
        e: RequestTokenError<
            HttpClientError<ReqwestClientError>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    ) -> Self {
        match e {
            RequestTokenError::ServerResponse(err) => {
                AuthError::ProviderExchange(format!("token exchange rejected: {}", err.error()))
            }
            RequestTokenError::Request(req_e) => {
                AuthError::ProviderExchange(format!("token exchange request failed: {}", req_e))
            }
            RequestTokenError::Parse(parse_err, _body) => AuthError::Json(parse_err.into_inner()),
            RequestTokenError::Other(s) => AuthError::ProviderExchange(s),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, (*msg).to_string()),
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AuthError::DuplicateUsername => {
                (StatusCode::CONFLICT, "Username already exists".to_string())
            }
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AuthError::ProviderNotConfigured(provider) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{provider} OAuth not configured"),
            ),
            // Callback handlers convert these into redirects before they get
            // here; any other path surfaces them as an upstream failure.
            AuthError::ProviderExchange(_)
            | AuthError::Reqwest(_)
            | AuthError::UrlParse(_)
            | AuthError::Json(_) => (
                StatusCode::BAD_GATEWAY,
                "Upstream provider is unavailable".to_string(),
            ),
            AuthError::Database(_) | AuthError::PasswordHash(_) | AuthError::TokenSigning(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (
            status,
            Json(ApiErrorBody {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

/// Standardized API error response body.
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub success: bool,
    pub error: String,
}
