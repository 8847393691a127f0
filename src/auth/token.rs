use crate::db::models::{Account, Provider};
use crate::error::AuthError;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Fixed session lifetime. The token is the entire authentication state; no
/// server-side session rows exist.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims bound into a session token. `email`/`provider` are present only for
/// SSO logins, mirroring what the frontend receives in the identity payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account id.
    pub sub: i64,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    pub iat: i64,
    pub exp: i64,
}

/// Mints and verifies bearer tokens. CPU-bound signing only; never touches
/// the account store.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a local-login token binding `{accountId, username}`.
    pub fn issue_local(&self, account: &Account) -> Result<String, AuthError> {
        self.sign(account, false)
    }

    /// Issue an SSO token, additionally binding email and provider.
    pub fn issue_sso(&self, account: &Account) -> Result<String, AuthError> {
        self.sign(account, true)
    }

    fn sign(&self, account: &Account, with_provider: bool) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = SessionClaims {
            sub: account.id,
            username: account.username.clone(),
            email: with_provider.then(|| account.email.clone()).flatten(),
            provider: with_provider.then_some(account.provider),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Verify a bearer token. Expired and invalid-signature tokens are
    /// rejected identically; callers cannot tell which failure occurred.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        decode::<SessionClaims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn account() -> Account {
        Account {
            id: 7,
            username: "joel".to_string(),
            email: Some("joel@x.com".to_string()),
            password_hash: None,
            provider: Provider::Github,
            external_id: Some("999".to_string()),
            avatar_url: None,
            created_at: NaiveDateTime::default(),
            updated_at: NaiveDateTime::default(),
        }
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let issuer = TokenIssuer::new("unit-test-secret");
        let token = issuer.issue_sso(&account()).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "joel");
        assert_eq!(claims.provider, Some(Provider::Github));
        assert!(claims.exp - claims.iat == TOKEN_TTL_SECS);
    }

    #[test]
    fn local_token_omits_provider_claims() {
        let issuer = TokenIssuer::new("unit-test-secret");
        let token = issuer.issue_local(&account()).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert!(claims.email.is_none());
        assert!(claims.provider.is_none());
    }

    #[test]
    fn wrong_secret_and_garbage_fail_identically() {
        let issuer = TokenIssuer::new("secret-a");
        let other = TokenIssuer::new("secret-b");
        let token = issuer.issue_local(&account()).unwrap();

        let forged = other.verify(&token).unwrap_err();
        let garbage = issuer.verify("not.a.token").unwrap_err();
        assert!(matches!(forged, AuthError::Unauthorized));
        assert!(matches!(garbage, AuthError::Unauthorized));
    }
}
