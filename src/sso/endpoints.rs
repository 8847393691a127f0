use crate::auth::reconciler::ProviderClaims;
use crate::error::AuthError;
use crate::sso::provider::SsoProvider;

use oauth2::{
    AuthUrl, AuthorizationCode, Client as OAuth2Client, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, RedirectUrl, Scope, StandardRevocableToken, TokenResponse,
    TokenUrl,
    basic::{
        BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
        BasicTokenResponse,
    },
};
use serde::Deserialize;
use tracing::info;
use url::Url;

/// Stateless outbound OAuth legs: authorize-URL construction, code exchange,
/// profile fetch.
pub struct SsoEndpoints;

impl SsoEndpoints {
    /// Build the provider's authorization URL with a fresh anti-replay state.
    pub fn build_authorize_url(provider: SsoProvider) -> Result<(Url, CsrfToken), AuthError> {
        let client = build_oauth2_client(provider)?;
        let mut request = client.authorize_url(CsrfToken::new_random);
        for scope in provider.scopes() {
            request = request.add_scope(Scope::new((*scope).to_string()));
        }
        let (auth_url, csrf_token) = request.url();
        Ok((auth_url, csrf_token))
    }

    /// Exchange the callback's authorization code for a provider access
    /// token. Single attempt; failures surface as `ProviderExchange`.
    pub async fn exchange_authorization_code(
        provider: SsoProvider,
        code: AuthorizationCode,
        http_client: reqwest::Client,
    ) -> Result<String, AuthError> {
        let client = build_oauth2_client(provider)?;
        let token_response: BasicTokenResponse = client
            .exchange_code(code)
            .request_async(&http_client)
            .await?;
        info!(provider = %provider, "authorization code exchanged");
        Ok(token_response.access_token().secret().clone())
    }

    /// Fetch the provider's profile endpoint and normalize it to claims.
    pub async fn fetch_claims(
        provider: SsoProvider,
        access_token: &str,
        http_client: reqwest::Client,
    ) -> Result<ProviderClaims, AuthError> {
        let accept = match provider {
            SsoProvider::Google => "application/json",
            SsoProvider::Github => "application/vnd.github.v3+json",
        };
        let resp = http_client
            .get(provider.userinfo_url())
            .bearer_auth(access_token)
            .header("Accept", accept)
            .send()
            .await
            .map_err(|e| {
                AuthError::ProviderExchange(format!(
                    "failed to reach {} profile endpoint: {e}",
                    provider.display_name()
                ))
            })?;
        if !resp.status().is_success() {
            return Err(AuthError::ProviderExchange(format!(
                "{} profile fetch failed with status {}",
                provider.display_name(),
                resp.status()
            )));
        }

        let claims = match provider {
            SsoProvider::Google => {
                let user: GoogleUserinfo = resp.json().await?;
                ProviderClaims {
                    external_id: user.id,
                    login: None,
                    email: user.email,
                    avatar_url: user.picture,
                }
            }
            SsoProvider::Github => {
                let user: GithubUser = resp.json().await?;
                ProviderClaims {
                    external_id: user.id.to_string(),
                    login: Some(user.login),
                    email: user.email,
                    avatar_url: user.avatar_url,
                }
            }
        };
        info!(provider = %provider, external_id = %claims.external_id, "provider profile fetched");
        Ok(claims)
    }
}

/// Build the typestate OAuth2 client for a provider, failing closed when the
/// client credentials are not configured.
fn build_oauth2_client(provider: SsoProvider) -> Result<SsoOauth2Client, AuthError> {
    let client_id = provider
        .client_id()
        .ok_or(AuthError::ProviderNotConfigured(provider.display_name()))?;
    let client_secret = provider
        .client_secret()
        .ok_or(AuthError::ProviderNotConfigured(provider.display_name()))?;

    let client = OAuth2Client::new(ClientId::new(client_id.to_string()))
        .set_client_secret(ClientSecret::new(client_secret.to_string()))
        .set_auth_uri(AuthUrl::new(provider.auth_url().to_string())?)
        .set_token_uri(TokenUrl::new(provider.token_url().to_string())?)
        .set_redirect_uri(RedirectUrl::new(provider.redirect_uri())?);
    Ok(client)
}

#[derive(Debug, Deserialize)]
struct GoogleUserinfo {
    id: String,
    email: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GithubUser {
    id: i64,
    login: String,
    email: Option<String>,
    avatar_url: Option<String>,
}

type SsoOauth2Client = OAuth2Client<
    BasicErrorResponse,
    BasicTokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;
