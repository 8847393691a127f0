use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Identity provider an account originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Local,
    Google,
    Github,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Local => "local",
            Provider::Google => "google",
            Provider::Github => "github",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "local" => Some(Provider::Local),
            "google" => Some(Provider::Google),
            "github" => Some(Provider::Github),
            _ => None,
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single persisted identity entity, covering local and SSO users.
///
/// Deliberately not `Serialize`: `password_hash` never crosses the store /
/// token-issuer boundary. Responses go through [`UserSummary`] or
/// [`UserIdentity`].
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub provider: Provider,
    pub external_id: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Minimal identity returned by the local login / create-account endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

impl From<&Account> for UserSummary {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            username: a.username.clone(),
        }
    }
}

/// Identity payload handed to the frontend after an SSO login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub provider: Provider,
    pub avatar_url: Option<String>,
}

impl From<&Account> for UserIdentity {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            username: a.username.clone(),
            email: a.email.clone(),
            provider: a.provider,
            avatar_url: a.avatar_url.clone(),
        }
    }
}
