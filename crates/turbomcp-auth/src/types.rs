//! OAuth token and credential types.

use serde::{Deserialize, Serialize};

/// An access token (and optional refresh token) returned by the
/// authorization server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthToken {
    /// The access token.
    pub access_token: String,
    /// Token type, typically `Bearer`.
    pub token_type: String,
    /// Absolute expiry in epoch milliseconds, if the server reported `expires_in`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<i64>,
    /// Refresh token, if the server issued one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Granted scope, space-separated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// A persisted credential: a token plus enough context to refresh and
/// display it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthCredential {
    /// The MCP server name this credential authenticates to.
    pub server_name: String,
    /// The current token.
    pub token: OAuthToken,
    /// Client id used to obtain the token, for refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Token endpoint used to obtain the token, for refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    /// The MCP server URL this credential was negotiated against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_server_url: Option<String>,
    /// When this credential was last written, epoch milliseconds.
    pub updated_at_ms: i64,
}
