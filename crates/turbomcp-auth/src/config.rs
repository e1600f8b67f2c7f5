//! OAuth configuration for a single MCP server connection.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// The localhost port the callback server binds by default.
pub const DEFAULT_CALLBACK_PORT: u16 = 7777;

/// Callback path the local HTTP listener serves.
pub const CALLBACK_PATH: &str = "/oauth/callback";

fn default_redirect_uri() -> String {
    format!("http://localhost:{DEFAULT_CALLBACK_PORT}{CALLBACK_PATH}")
}

/// Authorization-Code + PKCE configuration for one server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthConfig {
    /// Client identifier registered with the authorization server.
    pub client_id: String,
    /// Client secret, if the authorization server requires confidential clients.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_secret_opt",
        deserialize_with = "deserialize_secret_opt"
    )]
    pub client_secret: Option<SecretString>,
    /// Authorization endpoint the user's browser is sent to.
    pub authorization_url: String,
    /// Token endpoint used for code exchange and refresh.
    pub token_url: String,
    /// Redirect URI registered with the authorization server. Must match
    /// the callback server's host and path.
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    /// Requested scopes.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Optional `audience` parameter (used by providers implementing
    /// RFC 8707 resource indicators).
    #[serde(default)]
    pub audience: Option<String>,
    /// The MCP server this credential is being negotiated for, recorded
    /// alongside the token for display/debugging.
    #[serde(default)]
    pub mcp_server_url: Option<String>,
}

fn serialize_secret_opt<S>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match secret {
        Some(s) => serializer.serialize_str(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_secret_opt<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    Ok(s.map(SecretString::new))
}

impl OAuthConfig {
    /// Port the redirect URI's host names, if it's a `localhost` URI.
    #[must_use]
    pub fn callback_port(&self) -> u16 {
        url::Url::parse(&self.redirect_uri)
            .ok()
            .and_then(|u| u.port())
            .unwrap_or(DEFAULT_CALLBACK_PORT)
    }
}
