use crate::auth::token::SessionClaims;
use crate::error::AuthError;
use crate::router::AppState;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts};

/// Extractor that requires a valid bearer token on the request.
///
/// Expired and invalid-signature tokens are rejected identically; the
/// rejection body never says which check failed.
#[derive(Debug, Clone)]
pub struct AuthClaims(pub SessionClaims);

impl<S> FromRequestParts<S> for AuthClaims
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);

        let auth = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::Unauthorized)?
            .trim();
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(AuthError::Unauthorized)?;

        Ok(Self(app.tokens.verify(token)?))
    }
}
