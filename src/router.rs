use crate::auth::{IdentityReconciler, TokenIssuer};
use crate::config::CONFIG;
use crate::db::sqlite::AccountStore;
use crate::handlers;
use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use std::time::Duration;

/// Shared application state. The façade receives its collaborators at
/// construction and never reaches for ambient handles.
#[derive(Clone)]
pub struct AppState {
    pub reconciler: IdentityReconciler,
    pub tokens: TokenIssuer,
    pub http: reqwest::Client,
    cookie_key: Key,
}

impl AppState {
    pub fn new(store: AccountStore) -> Self {
        // Provider calls get one attempt with a hard timeout; no retry, no
        // backoff. Failures surface as an error redirect.
        let http = reqwest::Client::builder()
            .user_agent("traintrack-auth/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("FATAL: initialize outbound HTTP client failed");

        Self {
            reconciler: IdentityReconciler::new(store),
            tokens: TokenIssuer::new(&CONFIG.jwt_secret),
            http,
            // Per-process key for the short-lived OAuth state cookie; an
            // in-flight dance does not survive a restart.
            cookie_key: Key::generate(),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}

pub fn auth_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::sso::google_callback_or_health))
        .route("/health", get(handlers::session::health))
        .route("/api/login", post(handlers::local::login))
        .route("/api/create-account", post(handlers::local::create_account))
        .route("/api/forgot-password", post(handlers::local::forgot_password))
        .route("/api/me", get(handlers::session::me))
        .route("/auth/{provider}", get(handlers::sso::sso_entry))
        .route("/auth/github/callback", get(handlers::sso::github_callback))
        .with_state(state)
}
