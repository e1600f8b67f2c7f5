//! Top-level Authorization-Code + PKCE flow: `authenticate` and `refresh`.

use turbomcp_core::{Error, Result};

use crate::callback::{self, CallbackOutcome};
use crate::config::OAuthConfig;
use crate::oauth2::OAuthClient;
use crate::pkce::PkceChallenge;
use crate::types::OAuthToken;

/// Run the full Authorization-Code + PKCE dance for one server: build the
/// authorization URL, open the browser (best-effort), wait for the
/// localhost callback, and exchange the returned code for a token.
pub async fn authenticate(config: &OAuthConfig) -> Result<OAuthToken> {
    let client = OAuthClient::new(config)?;
    let challenge = PkceChallenge::generate();

    let authorization_url = client.authorization_url(
        &config.client_id,
        &config.redirect_uri,
        &config.scopes,
        &challenge,
    )?;

    callback::open_browser(&authorization_url);

    let outcome = callback::await_callback(config.callback_port()).await?;

    match outcome {
        CallbackOutcome::Denied {
            error,
            description,
        } => Err(Error::authorization_denied(format!(
            "{error}{}",
            description.map(|d| format!(": {d}")).unwrap_or_default()
        ))),
        CallbackOutcome::Authorized { code, state } => {
            if state != challenge.state {
                return Err(Error::invalid_callback(
                    "callback state did not match the issued value",
                ));
            }
            client.exchange_code(code, challenge.code_verifier).await
        }
    }
}

/// Refresh an access token using a previously issued refresh token.
pub async fn refresh_access_token(config: &OAuthConfig, refresh_token: &str) -> Result<OAuthToken> {
    let client = OAuthClient::new(config)?;
    client.refresh(refresh_token).await
}
