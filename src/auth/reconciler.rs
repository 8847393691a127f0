use crate::auth::password;
use crate::db::models::{Account, Provider};
use crate::db::sqlite::AccountStore;
use crate::error::AuthError;
use tracing::info;

/// Attributes returned by a provider's profile endpoint, normalized across
/// providers before they reach the reconciler.
#[derive(Debug, Clone)]
pub struct ProviderClaims {
    /// The provider's own stable user identifier.
    pub external_id: String,
    /// Provider-side login name (GitHub); absent for Google.
    pub login: Option<String>,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
}

/// Per-provider account matching order, made explicit so the asymmetry
/// between providers is configuration rather than inline branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Match on `(provider, external_id)` first, then fall back to email.
    /// External-id-first is load-bearing for GitHub: the account's email can
    /// change, the id cannot.
    ByExternalIdThenEmail,
    /// Match on email alone. Google's historical behavior; kept as-is rather
    /// than unified with GitHub's (see DESIGN.md).
    ByEmailOnly,
}

impl MatchStrategy {
    pub fn for_provider(provider: Provider) -> Self {
        match provider {
            Provider::Github => MatchStrategy::ByExternalIdThenEmail,
            Provider::Google | Provider::Local => MatchStrategy::ByEmailOnly,
        }
    }
}

/// Resolves identity-provider claims and local credentials to exactly one
/// Account. Receives its store at construction; holds no other state.
#[derive(Clone)]
pub struct IdentityReconciler {
    store: AccountStore,
}

impl IdentityReconciler {
    pub fn new(store: AccountStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &AccountStore {
        &self.store
    }

    /// Local registration. Uniqueness is enforced by the storage constraint,
    /// not a pre-check, so concurrent registrations cannot race past it.
    pub async fn register(&self, username: &str, password: &str) -> Result<Account, AuthError> {
        let hash = password::hash_password(password)?;
        let account = self.store.insert_local(username, &hash).await?;
        info!(account_id = account.id, username, "local account created");
        Ok(account)
    }

    /// Local login. Unknown username, a pure-SSO account (no stored hash),
    /// and a wrong password all fail with the same `InvalidCredentials` to
    /// resist username enumeration.
    pub async fn login(&self, username: &str, password: &str) -> Result<Account, AuthError> {
        let Some(account) = self.store.find_by_username(username).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        let Some(hash) = account.password_hash.as_deref() else {
            return Err(AuthError::InvalidCredentials);
        };
        if password::verify_password(password, hash)? {
            Ok(account)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Forgot-password: rotate the stored hash and hand back the replacement
    /// plaintext exactly once. The plaintext is never persisted or logged.
    pub async fn reset_password(&self, username: &str) -> Result<String, AuthError> {
        let Some(account) = self.store.find_by_username(username).await? else {
            return Err(AuthError::UserNotFound);
        };
        let new_password = password::generate_reset_password();
        let hash = password::hash_password(&new_password)?;
        self.store.update_password_hash(account.id, &hash).await?;
        info!(account_id = account.id, username, "password reset");
        Ok(new_password)
    }

    /// Resolve SSO claims to exactly one Account: match per the provider's
    /// strategy, create on miss, enrich a matched account with a missing
    /// avatar. Repeated logins with the same external id are idempotent.
    pub async fn resolve_sso(
        &self,
        provider: Provider,
        claims: &ProviderClaims,
    ) -> Result<Account, AuthError> {
        let matched = match MatchStrategy::for_provider(provider) {
            MatchStrategy::ByExternalIdThenEmail => {
                let by_external = self
                    .store
                    .find_by_provider_external_id(provider, &claims.external_id)
                    .await?;
                match (by_external, claims.email.as_deref()) {
                    (Some(account), _) => Some(account),
                    (None, Some(email)) => self.store.find_by_email(email).await?,
                    (None, None) => None,
                }
            }
            MatchStrategy::ByEmailOnly => {
                let email = claims.email.as_deref().ok_or_else(|| {
                    AuthError::ProviderExchange(format!(
                        "{provider} profile did not include an email"
                    ))
                })?;
                self.store.find_by_email(email).await?
            }
        };

        match matched {
            Some(account) => self.backfill_avatar(account, claims).await,
            None => self.create_sso_account(provider, claims).await,
        }
    }

    /// Enrichment, not overwrite: an existing non-empty avatar is never
    /// replaced.
    async fn backfill_avatar(
        &self,
        mut account: Account,
        claims: &ProviderClaims,
    ) -> Result<Account, AuthError> {
        let missing = account.avatar_url.as_deref().is_none_or(str::is_empty);
        if let (true, Some(avatar)) = (missing, claims.avatar_url.as_deref()) {
            self.store.update_avatar(account.id, avatar).await?;
            account.avatar_url = Some(avatar.to_string());
            info!(account_id = account.id, "avatar backfilled from provider profile");
        }
        Ok(account)
    }

    async fn create_sso_account(
        &self,
        provider: Provider,
        claims: &ProviderClaims,
    ) -> Result<Account, AuthError> {
        let account = match provider {
            Provider::Github => {
                let login = claims.login.as_deref().unwrap_or("user");
                let username = format!("github_{}_{}", login, claims.external_id);
                // GitHub may withhold the account email; synthesize a stable
                // placeholder so the email column stays populated.
                let email = claims
                    .email
                    .clone()
                    .unwrap_or_else(|| format!("{login}@github.local"));
                self.store
                    .insert_sso(
                        &username,
                        Some(&email),
                        provider,
                        &claims.external_id,
                        claims.avatar_url.as_deref(),
                    )
                    .await?
            }
            Provider::Google => {
                let email = claims.email.as_deref().ok_or_else(|| {
                    AuthError::ProviderExchange(
                        "google profile did not include an email".to_string(),
                    )
                })?;
                let local_part = email.split('@').next().unwrap_or(email);
                match self
                    .store
                    .insert_sso(
                        local_part,
                        Some(email),
                        provider,
                        &claims.external_id,
                        claims.avatar_url.as_deref(),
                    )
                    .await
                {
                    Ok(account) => account,
                    // The email local-part can collide with an existing
                    // username; disambiguate with the provider + external id,
                    // which is unique by construction.
                    Err(AuthError::DuplicateUsername) => {
                        let fallback = format!("{}_google_{}", local_part, claims.external_id);
                        self.store
                            .insert_sso(
                                &fallback,
                                Some(email),
                                provider,
                                &claims.external_id,
                                claims.avatar_url.as_deref(),
                            )
                            .await?
                    }
                    Err(e) => return Err(e),
                }
            }
            Provider::Local => {
                return Err(AuthError::ProviderExchange(
                    "local is not an SSO provider".to_string(),
                ));
            }
        };
        info!(
            account_id = account.id,
            username = %account.username,
            provider = %provider,
            "sso account created"
        );
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn reconciler() -> IdentityReconciler {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory sqlite");
        let store = AccountStore::new(pool);
        store.init_schema().await.expect("schema init");
        IdentityReconciler::new(store)
    }

    fn github_claims(avatar: &str) -> ProviderClaims {
        ProviderClaims {
            external_id: "999".to_string(),
            login: Some("bob".to_string()),
            email: Some("bob@x.com".to_string()),
            avatar_url: Some(avatar.to_string()),
        }
    }

    #[tokio::test]
    async fn github_first_login_creates_synthesized_username() {
        let rec = reconciler().await;
        let account = rec
            .resolve_sso(Provider::Github, &github_claims("A1"))
            .await
            .unwrap();
        assert_eq!(account.username, "github_bob_999");
        assert_eq!(account.provider, Provider::Github);
        assert_eq!(account.avatar_url.as_deref(), Some("A1"));
    }

    #[tokio::test]
    async fn repeated_github_login_is_idempotent_and_avatar_is_monotonic() {
        let rec = reconciler().await;
        let first = rec
            .resolve_sso(Provider::Github, &github_claims("A1"))
            .await
            .unwrap();
        let second = rec
            .resolve_sso(Provider::Github, &github_claims("A2"))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.avatar_url.as_deref(), Some("A1"));
        assert_eq!(rec.store().list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn github_match_survives_email_change() {
        let rec = reconciler().await;
        let first = rec
            .resolve_sso(Provider::Github, &github_claims("A1"))
            .await
            .unwrap();

        let mut changed = github_claims("A1");
        changed.email = Some("new-address@y.com".to_string());
        let second = rec.resolve_sso(Provider::Github, &changed).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn github_without_email_synthesizes_placeholder() {
        let rec = reconciler().await;
        let mut claims = github_claims("A1");
        claims.email = None;
        let account = rec.resolve_sso(Provider::Github, &claims).await.unwrap();
        assert_eq!(account.email.as_deref(), Some("bob@github.local"));
    }

    #[tokio::test]
    async fn github_falls_back_to_email_match_and_backfills_avatar() {
        let rec = reconciler().await;
        let google = rec
            .store()
            .insert_sso("bob", Some("bob@x.com"), Provider::Google, "g-1", None)
            .await
            .unwrap();

        // No github row for external id 999, but the email joins the
        // provider identities onto the existing account.
        let resolved = rec
            .resolve_sso(Provider::Github, &github_claims("A1"))
            .await
            .unwrap();
        assert_eq!(resolved.id, google.id);
        assert_eq!(resolved.avatar_url.as_deref(), Some("A1"));
    }

    #[tokio::test]
    async fn google_matches_by_email_only() {
        let rec = reconciler().await;
        let claims = ProviderClaims {
            external_id: "g-42".to_string(),
            login: None,
            email: Some("carol@x.com".to_string()),
            avatar_url: Some("P1".to_string()),
        };
        let first = rec.resolve_sso(Provider::Google, &claims).await.unwrap();
        assert_eq!(first.username, "carol");

        let second = rec.resolve_sso(Provider::Google, &claims).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn google_username_collision_falls_back_to_suffixed_name() {
        let rec = reconciler().await;
        rec.register("carol", "pw").await.unwrap();

        let claims = ProviderClaims {
            external_id: "g-42".to_string(),
            login: None,
            email: Some("carol@x.com".to_string()),
            avatar_url: None,
        };
        let account = rec.resolve_sso(Provider::Google, &claims).await.unwrap();
        assert_eq!(account.username, "carol_google_g-42");
    }

    #[tokio::test]
    async fn google_without_email_is_an_exchange_error() {
        let rec = reconciler().await;
        let claims = ProviderClaims {
            external_id: "g-42".to_string(),
            login: None,
            email: None,
            avatar_url: None,
        };
        let err = rec.resolve_sso(Provider::Google, &claims).await.unwrap_err();
        assert!(matches!(err, AuthError::ProviderExchange(_)));
    }

    #[tokio::test]
    async fn local_login_failures_are_indistinguishable() {
        let rec = reconciler().await;
        rec.register("alice", "pw1").await.unwrap();

        let wrong_pw = rec.login("alice", "pw2").await.unwrap_err();
        let no_user = rec.login("nobody", "pw1").await.unwrap_err();
        assert_eq!(wrong_pw.to_string(), "Invalid credentials");
        assert_eq!(no_user.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn pure_sso_account_cannot_login_locally() {
        let rec = reconciler().await;
        rec.resolve_sso(Provider::Github, &github_claims("A1"))
            .await
            .unwrap();
        let err = rec.login("github_bob_999", "anything").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_conflict() {
        let rec = reconciler().await;
        rec.register("alice", "pw1").await.unwrap();
        let err = rec.register("alice", "pw2").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername));
    }

    #[tokio::test]
    async fn reset_password_rotates_credentials() {
        let rec = reconciler().await;
        rec.register("alice", "old-pw").await.unwrap();

        let new_pw = rec.reset_password("alice").await.unwrap();
        assert!(rec.login("alice", &new_pw).await.is_ok());
        assert!(matches!(
            rec.login("alice", "old-pw").await.unwrap_err(),
            AuthError::InvalidCredentials
        ));

        let missing = rec.reset_password("nobody").await.unwrap_err();
        assert!(matches!(missing, AuthError::UserNotFound));
    }
}
