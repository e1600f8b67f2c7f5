//! Authorization URL construction and token exchange.

use oauth2::{
    AuthUrl, ClientId, ClientSecret, EndpointNotSet, EndpointSet, PkceCodeVerifier, RedirectUrl,
    RefreshToken, TokenResponse, TokenUrl,
    basic::{BasicClient, BasicTokenType},
};
use secrecy::ExposeSecret;
use url::Url;

use turbomcp_core::{Error, Result};

use crate::config::OAuthConfig;
use crate::pkce::PkceChallenge;
use crate::types::OAuthToken;

type Client = BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// A configured OAuth client for one server: builds authorization URLs
/// and exchanges/refreshes tokens against one authorization server.
pub struct OAuthClient {
    inner: Client,
    http_client: reqwest::Client,
    authorization_url: String,
    audience: Option<String>,
}

impl std::fmt::Debug for OAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthClient")
            .field("authorization_url", &self.authorization_url)
            .finish_non_exhaustive()
    }
}

impl OAuthClient {
    /// Build a client from a server's OAuth configuration.
    pub fn new(config: &OAuthConfig) -> Result<Self> {
        let auth_url = AuthUrl::new(config.authorization_url.clone())
            .map_err(|e| Error::missing_config(format!("invalid authorization_url: {e}")))?;
        let token_url = TokenUrl::new(config.token_url.clone())
            .map_err(|e| Error::missing_config(format!("invalid token_url: {e}")))?;
        let redirect_url = RedirectUrl::new(config.redirect_uri.clone())
            .map_err(|e| Error::missing_config(format!("invalid redirect_uri: {e}")))?;

        let mut client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_auth_uri(auth_url)
            .set_token_uri(token_url)
            .set_redirect_uri(redirect_url);

        if let Some(secret) = &config.client_secret {
            client = client.set_client_secret(ClientSecret::new(secret.expose_secret().to_string()));
        }

        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner: client,
            http_client,
            authorization_url: config.authorization_url.clone(),
            audience: config.audience.clone(),
        })
    }

    /// Build the authorization URL the user's browser should be sent to.
    ///
    /// Attaches `client_id`, `response_type=code`, `redirect_uri`, `state`,
    /// `code_challenge`, `code_challenge_method=S256`, and space-joined
    /// `scope`/`audience` when supplied.
    pub fn authorization_url(
        &self,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[String],
        challenge: &PkceChallenge,
    ) -> Result<String> {
        let mut url = Url::parse(&self.authorization_url)
            .map_err(|e| Error::missing_config(format!("invalid authorization_url: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", client_id);
            query.append_pair("response_type", "code");
            query.append_pair("redirect_uri", redirect_uri);
            query.append_pair("state", &challenge.state);
            query.append_pair("code_challenge", &challenge.code_challenge);
            query.append_pair("code_challenge_method", "S256");
            if !scopes.is_empty() {
                query.append_pair("scope", &scopes.join(" "));
            }
            if let Some(audience) = &self.audience {
                query.append_pair("audience", audience);
            }
        }

        Ok(url.to_string())
    }

    /// Exchange an authorization code for an access token.
    pub async fn exchange_code(&self, code: String, code_verifier: String) -> Result<OAuthToken> {
        let response = self
            .inner
            .exchange_code(oauth2::AuthorizationCode::new(code))
            .set_pkce_verifier(PkceCodeVerifier::new(code_verifier))
            .request_async(&self.http_client)
            .await
            .map_err(|e| Error::token_exchange_failed(e.to_string()))?;

        Ok(to_oauth_token(response))
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<OAuthToken> {
        let response = self
            .inner
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&self.http_client)
            .await
            .map_err(|e| Error::token_refresh_failed(e.to_string()))?;

        Ok(to_oauth_token(response))
    }
}

fn to_oauth_token(
    response: oauth2::StandardTokenResponse<oauth2::EmptyExtraTokenFields, BasicTokenType>,
) -> OAuthToken {
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64;

    let expires_at_ms = response
        .expires_in()
        .map(|d| now_ms + d.as_millis() as i64);

    OAuthToken {
        access_token: response.access_token().secret().clone(),
        token_type: "Bearer".to_string(),
        expires_at_ms,
        refresh_token: response.refresh_token().map(|t| t.secret().clone()),
        scope: response.scopes().map(|scopes| {
            scopes
                .iter()
                .map(oauth2::Scope::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> OAuthConfig {
        OAuthConfig {
            client_id: "abc".to_string(),
            client_secret: None,
            authorization_url: "https://a.example/authz".to_string(),
            token_url: "https://a.example/token".to_string(),
            redirect_uri: "http://localhost:7777/oauth/callback".to_string(),
            scopes: vec!["r".to_string(), "w".to_string()],
            audience: None,
            mcp_server_url: None,
        }
    }

    #[test]
    fn authorization_url_contains_required_params() {
        let config = sample_config();
        let client = OAuthClient::new(&config).unwrap();
        let challenge = PkceChallenge::generate();

        let url = client
            .authorization_url(&config.client_id, &config.redirect_uri, &config.scopes, &challenge)
            .unwrap();

        assert!(url.contains("response_type=code"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("scope=r+w"));
        assert!(url.contains(&format!("state={}", challenge.state)));
    }
}
