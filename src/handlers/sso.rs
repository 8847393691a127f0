use crate::config::CONFIG;
use crate::db::models::UserIdentity;
use crate::error::AuthError;
use crate::router::AppState;
use crate::sso::{SsoEndpoints, SsoProvider};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, PrivateCookieJar, SameSite};
use oauth2::AuthorizationCode;
use serde::Deserialize;
use subtle::ConstantTimeEq;
use time::Duration;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Providers report user-denied consent and similar failures here.
    pub error: Option<String>,
}

/// Bearer token cookie set after a successful SSO login. The token rides an
/// HttpOnly cookie instead of the redirect URL so it never lands in browser
/// history or referrer headers.
pub const SESSION_COOKIE: &str = "session_token";

const STATE_COOKIE_TTL_MINUTES: i64 = 15;

/// GET /auth/{provider} -> redirect to the provider's consent page, carrying
/// a freshly generated state value that is also pinned in a private cookie.
pub async fn sso_entry(
    Path(provider): Path<String>,
    jar: PrivateCookieJar,
) -> Result<Response, AuthError> {
    let Some(provider) = SsoProvider::from_path(&provider) else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    let (auth_url, csrf_token) = SsoEndpoints::build_authorize_url(provider)?;
    let jar = jar.add(build_state_cookie(provider, csrf_token.secret().clone()));

    info!(provider = %provider, "dispatching OAuth redirect");
    Ok((jar, Redirect::temporary(auth_url.as_ref())).into_response())
}

/// GET /auth/github/callback
pub async fn github_callback(
    State(state): State<AppState>,
    Query(query): Query<AuthCallbackQuery>,
    jar: PrivateCookieJar,
) -> Response {
    complete_callback(state, SsoProvider::Github, query, jar).await
}

/// GET / -> the Google OAuth callback when `code` is present, otherwise the
/// health payload (the provider redirect URI is the service root).
pub async fn google_callback_or_health(
    State(state): State<AppState>,
    Query(query): Query<AuthCallbackQuery>,
    jar: PrivateCookieJar,
) -> Response {
    if query.code.is_none() && query.error.is_none() {
        return super::session::health().await.into_response();
    }
    complete_callback(state, SsoProvider::Google, query, jar).await
}

/// Shared callback tail: verify state, exchange the code, fetch the profile,
/// reconcile, then redirect into the frontend. Every failure becomes an
/// `sso=error` redirect carrying a human-readable message.
async fn complete_callback(
    state: AppState,
    provider: SsoProvider,
    query: AuthCallbackQuery,
    jar: PrivateCookieJar,
) -> Response {
    let (expected_state, jar) = match take_state_cookie(jar, provider) {
        (Some(v), jar) => (v, jar),
        (None, jar) => {
            warn!(provider = %provider, "callback without a state cookie");
            return (jar, error_redirect("Missing OAuth state cookie")).into_response();
        }
    };

    match run_callback(&state, provider, &query, &expected_state).await {
        Ok((token, identity)) => {
            info!(provider = %provider, account_id = identity.id, "sso login succeeded");
            let session = CookieJar::new().add(build_session_cookie(token));
            (jar, session, success_redirect(&identity)).into_response()
        }
        Err(err) => {
            warn!(provider = %provider, error = %err, "sso callback failed");
            (jar, error_redirect(&err.redirect_message())).into_response()
        }
    }
}

async fn run_callback(
    state: &AppState,
    provider: SsoProvider,
    query: &AuthCallbackQuery,
    expected_state: &str,
) -> Result<(String, UserIdentity), AuthError> {
    if let Some(provider_error) = query.error.as_deref() {
        return Err(AuthError::ProviderExchange(format!(
            "provider reported: {provider_error}"
        )));
    }

    let returned_state = query
        .state
        .as_deref()
        .ok_or_else(|| AuthError::ProviderExchange("missing `state` in callback".to_string()))?;
    if !bool::from(returned_state.as_bytes().ct_eq(expected_state.as_bytes())) {
        return Err(AuthError::ProviderExchange(
            "OAuth state mismatch".to_string(),
        ));
    }

    let code = query
        .code
        .clone()
        .ok_or_else(|| AuthError::ProviderExchange("No authorization code received".to_string()))?;

    let access_token = SsoEndpoints::exchange_authorization_code(
        provider,
        AuthorizationCode::new(code),
        state.http.clone(),
    )
    .await?;
    let claims = SsoEndpoints::fetch_claims(provider, &access_token, state.http.clone()).await?;

    let account = state.reconciler.resolve_sso(provider.provider(), &claims).await?;
    let token = state.tokens.issue_sso(&account)?;
    Ok((token, UserIdentity::from(&account)))
}

fn state_cookie_name(provider: SsoProvider) -> String {
    format!("oauth_state_{provider}")
}

fn build_state_cookie(provider: SsoProvider, value: String) -> Cookie<'static> {
    Cookie::build(Cookie::new(state_cookie_name(provider), value))
        .path("/")
        .http_only(true)
        .secure(!CONFIG.insecure_cookie)
        .same_site(SameSite::Lax)
        .max_age(Duration::minutes(STATE_COOKIE_TTL_MINUTES))
        .build()
}

/// Read and clear the state cookie regardless of outcome; a state value is
/// single-use.
fn take_state_cookie(
    jar: PrivateCookieJar,
    provider: SsoProvider,
) -> (Option<String>, PrivateCookieJar) {
    let name = state_cookie_name(provider);
    let value = jar.get(&name).map(|c| c.value().to_owned());
    let cleared = Cookie::build(Cookie::new(name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    (value, jar.remove(cleared))
}

fn build_session_cookie(token: String) -> Cookie<'static> {
    Cookie::build(Cookie::new(SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(!CONFIG.insecure_cookie)
        .same_site(SameSite::Lax)
        .max_age(Duration::hours(24))
        .build()
}

fn success_redirect(identity: &UserIdentity) -> Redirect {
    let payload = serde_json::to_string(identity).unwrap_or_else(|_| "{}".to_string());
    let mut url = frontend_login_url();
    url.query_pairs_mut()
        .append_pair("sso", "success")
        .append_pair("user", &payload);
    Redirect::temporary(url.as_str())
}

fn error_redirect(message: &str) -> Redirect {
    let mut url = frontend_login_url();
    url.query_pairs_mut()
        .append_pair("sso", "error")
        .append_pair("message", message);
    Redirect::temporary(url.as_str())
}

fn frontend_login_url() -> Url {
    let base = Url::parse(&CONFIG.frontend_url)
        .unwrap_or_else(|_| Url::parse("http://localhost:5173").expect("static URL"));
    let mut url = base;
    url.set_path("/login");
    url
}
