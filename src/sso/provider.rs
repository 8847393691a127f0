use crate::config::CONFIG;
use crate::db::models::Provider;

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

pub const GITHUB_AUTH_URL: &str = "https://github.com/login/oauth/authorize";
pub const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
pub const GITHUB_USERINFO_URL: &str = "https://api.github.com/user";

/// An SSO provider this service can dance the authorization-code flow with.
/// Endpoint URLs and scopes are fixed per provider; client credentials come
/// from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsoProvider {
    Google,
    Github,
}

impl SsoProvider {
    /// Parse the `{provider}` path segment of `/auth/{provider}`.
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "google" => Some(SsoProvider::Google),
            "github" => Some(SsoProvider::Github),
            _ => None,
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            SsoProvider::Google => Provider::Google,
            SsoProvider::Github => Provider::Github,
        }
    }

    /// Human-readable name used in configuration error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            SsoProvider::Google => "Google",
            SsoProvider::Github => "GitHub",
        }
    }

    pub fn auth_url(&self) -> &'static str {
        match self {
            SsoProvider::Google => GOOGLE_AUTH_URL,
            SsoProvider::Github => GITHUB_AUTH_URL,
        }
    }

    pub fn token_url(&self) -> &'static str {
        match self {
            SsoProvider::Google => GOOGLE_TOKEN_URL,
            SsoProvider::Github => GITHUB_TOKEN_URL,
        }
    }

    pub fn userinfo_url(&self) -> &'static str {
        match self {
            SsoProvider::Google => GOOGLE_USERINFO_URL,
            SsoProvider::Github => GITHUB_USERINFO_URL,
        }
    }

    pub fn scopes(&self) -> &'static [&'static str] {
        match self {
            SsoProvider::Google => &["email", "profile"],
            SsoProvider::Github => &["user:email"],
        }
    }

    pub fn client_id(&self) -> Option<&'static str> {
        match self {
            SsoProvider::Google => CONFIG.google_client_id.as_deref(),
            SsoProvider::Github => CONFIG.github_client_id.as_deref(),
        }
    }

    pub fn client_secret(&self) -> Option<&'static str> {
        match self {
            SsoProvider::Google => CONFIG.google_client_secret.as_deref(),
            SsoProvider::Github => CONFIG.github_client_secret.as_deref(),
        }
    }

    /// Callback URL registered with the provider. Google redirects to the
    /// service root; GitHub to its dedicated callback route.
    pub fn redirect_uri(&self) -> String {
        match self {
            SsoProvider::Google => CONFIG.public_url.clone(),
            SsoProvider::Github => CONFIG.github_redirect_uri(),
        }
    }
}

impl std::fmt::Display for SsoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.provider().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments_map_to_providers() {
        assert_eq!(SsoProvider::from_path("google"), Some(SsoProvider::Google));
        assert_eq!(SsoProvider::from_path("github"), Some(SsoProvider::Github));
        assert_eq!(SsoProvider::from_path("gitlab"), None);
    }
}
