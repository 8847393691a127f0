use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Global configuration, resolved once from defaults + `TRAINTRACK_*` env vars.
pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::load().expect("FATAL: invalid configuration"));

pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    pub listen_addr: String,
    /// sqlx SQLite URL, e.g. `sqlite:training.db`.
    pub database_url: String,
    /// HMAC secret for session token signing.
    pub jwt_secret: String,
    /// Base URL of the SPA; SSO callbacks redirect into `<frontend_url>/login`.
    pub frontend_url: String,
    /// Externally reachable base URL of this service, used to build OAuth
    /// redirect URIs. The Google callback lands on `<public_url>/`.
    pub public_url: String,
    pub loglevel: String,
    /// Drop the `Secure` attribute on cookies for plain-HTTP local runs.
    pub insecure_cookie: bool,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub github_client_id: Option<String>,
    pub github_client_secret: Option<String>,
    /// Overrides the default `<public_url>/auth/github/callback`.
    pub github_redirect_uri: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:3001".to_string(),
            database_url: "sqlite:training.db".to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            public_url: "http://localhost:3001".to_string(),
            loglevel: "info".to_string(),
            insecure_cookie: false,
            google_client_id: None,
            google_client_secret: None,
            github_client_id: None,
            github_client_secret: None,
            github_redirect_uri: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("TRAINTRACK_"))
            .extract()
    }

    pub fn github_redirect_uri(&self) -> String {
        self.github_redirect_uri
            .clone()
            .unwrap_or_else(|| format!("{}/auth/github/callback", self.public_url))
    }
}
