//! Unified error handling for the runtime.
//!
//! A single [`McpError`] type is used across every crate in the workspace,
//! replacing ad-hoc `anyhow`/per-crate error enums. It classifies failures
//! into the taxonomy the runtime promises callers: config, transport,
//! lifecycle, invocation, auth, crypto, and storage. Errors never carry
//! secret material or cryptographic internals in their message text.
//!
//! # Example
//!
//! ```rust
//! use turbomcp_core::error::{ErrorKind, McpError};
//!
//! fn load() -> Result<(), McpError> {
//!     Err(McpError::new(ErrorKind::ServerSpecIncomplete, "missing `command` or `url`"))
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type alias used throughout the runtime.
pub type Result<T> = std::result::Result<T, McpError>;

/// Unified runtime error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    /// Error classification.
    pub kind: ErrorKind,
    /// Human-readable message. Never includes secret material or paths
    /// that should not be surfaced to callers.
    pub message: String,
    /// Semantic field paths for validation failures (§7 `ValidationError`).
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub paths: Vec<String>,
    /// Additional structured context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Box<ErrorContext>>,
}

/// Additional, optional error context.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Operation being performed when the error occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Component (server name, agent id, ...) the error relates to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

/// Error classification. Variants are grouped by the taxonomy in spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    // --- Config ---
    /// A server descriptor or config file failed schema validation.
    SchemaInvalid,
    /// A server descriptor is missing a required field (`command` or `url`).
    ServerSpecIncomplete,

    // --- Transport ---
    /// Transport construction failed synchronously.
    TransportInit,
    /// Transport faulted after a connection was established.
    TransportFaulted,
    /// A request exceeded its deadline.
    Timeout,

    // --- Lifecycle ---
    /// The server descriptor is marked `disabled`.
    Disabled,
    /// An operation was attempted against a server with no live connection.
    NotConnected,
    /// `connect` failed; the underlying cause is in `message`.
    ConnectFailed,
    /// `connect` was called on an already-connected server (non-fatal).
    AlreadyConnected,

    // --- Invocation ---
    /// Tool input failed JSON-Schema validation; see `paths`.
    ValidationError,
    /// The server reported a tool execution error.
    ToolError,
    /// No prompt by that name is registered.
    PromptNotFound,
    /// No resource by that URI is registered or the read failed.
    ResourceNotFound,
    /// A resource or content part carried a MIME type with no handling rule.
    UnsupportedMime,

    // --- Auth ---
    /// OAuth configuration is missing a required field.
    MissingConfig,
    /// The authorization server or user denied the request.
    AuthorizationDenied,
    /// The OAuth callback's `state` did not match the one issued.
    InvalidCallback,
    /// The authorization-code exchange failed.
    TokenExchangeFailed,
    /// The refresh-token exchange failed.
    TokenRefreshFailed,

    // --- Crypto (A2A) ---
    /// No secret is registered for the claimed sender.
    NoKey,
    /// The derived key id does not match the signature's `keyId`.
    KeyIdMismatch,
    /// The key used to sign has since been revoked.
    KeyRevoked,
    /// `signature.timestamp` is older than `maxAge`.
    SignatureExpired,
    /// `signature.timestamp` is further in the future than the allowed skew.
    SignatureInFuture,
    /// MAC verification failed.
    SignatureInvalid,
    /// The message's canonical form no longer matches `signedPayload`.
    MessageModified,
    /// The signed message is structurally malformed.
    Malformed,

    // --- Storage ---
    /// Encrypted blob is not `iv:tag:ciphertext`.
    InvalidEncryptedFormat,
    /// AEAD decryption or tag verification failed.
    DecryptionFailed,
    /// Underlying filesystem operation failed.
    IoError,

    /// Catch-all for programmer errors that should fail loud.
    Internal,
}

impl fmt::Display for McpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for McpError {}

impl McpError {
    /// Create a new error with a kind and message.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            paths: Vec::new(),
            context: None,
        }
    }

    /// Attach semantic validation paths.
    #[must_use]
    pub fn with_paths(mut self, paths: Vec<String>) -> Self {
        self.paths = paths;
        self
    }

    /// Record the operation in progress when this error occurred.
    #[must_use]
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context
            .get_or_insert_with(|| Box::new(ErrorContext::default()))
            .operation = Some(operation.into());
        self
    }

    /// Record the component (server name, agent id) this error relates to.
    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.context
            .get_or_insert_with(|| Box::new(ErrorContext::default()))
            .component = Some(component.into());
        self
    }

    /// `true` for errors a caller may reasonably retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Timeout | ErrorKind::TransportFaulted | ErrorKind::ConnectFailed
        )
    }

    /// Construct a [`ErrorKind::ValidationError`] with semantic paths.
    #[must_use]
    pub fn validation(paths: Vec<String>) -> Self {
        let summary = if paths.is_empty() {
            "validation failed".to_string()
        } else {
            format!("validation failed: {}", paths.join(", "))
        };
        Self::new(ErrorKind::ValidationError, summary).with_paths(paths)
    }

    /// Construct a [`ErrorKind::ToolError`].
    #[must_use]
    pub fn tool_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ToolError, message)
    }

    /// Construct a [`ErrorKind::NotConnected`].
    #[must_use]
    pub fn not_connected(server_name: impl Into<String>) -> Self {
        let name = server_name.into();
        Self::new(ErrorKind::NotConnected, format!("not connected: {name}")).with_component(name)
    }

    /// Construct a [`ErrorKind::TransportFaulted`].
    #[must_use]
    pub fn transport_faulted(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportFaulted, message)
    }

    /// Construct a [`ErrorKind::Timeout`].
    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Construct an [`ErrorKind::Internal`] error for programmer mistakes.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Construct a [`ErrorKind::TransportFaulted`] for a send/receive failure.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportFaulted, message)
    }

    /// Construct a [`ErrorKind::Malformed`] for a message that didn't parse
    /// as valid JSON-RPC or didn't match the shape a method expects.
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Malformed, message)
    }

    /// Construct an error from a JSON-RPC error object a server returned.
    #[must_use]
    pub fn rpc(code: i32, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ToolError, format!("[{code}] {}", message.into()))
    }

    /// Construct a [`ErrorKind::ValidationError`] for a call that violates
    /// this runtime's own preconditions (not initialized, empty argument).
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    /// Construct a [`ErrorKind::MissingConfig`].
    #[must_use]
    pub fn missing_config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingConfig, message)
    }

    /// Construct a [`ErrorKind::AuthorizationDenied`].
    #[must_use]
    pub fn authorization_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthorizationDenied, message)
    }

    /// Construct a [`ErrorKind::InvalidCallback`].
    #[must_use]
    pub fn invalid_callback(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCallback, message)
    }

    /// Construct a [`ErrorKind::TokenExchangeFailed`].
    #[must_use]
    pub fn token_exchange_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenExchangeFailed, message)
    }

    /// Construct a [`ErrorKind::TokenRefreshFailed`].
    #[must_use]
    pub fn token_refresh_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TokenRefreshFailed, message)
    }

    /// Construct a [`ErrorKind::NoKey`].
    #[must_use]
    pub fn no_key(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoKey, message)
    }

    /// Construct a [`ErrorKind::KeyIdMismatch`].
    #[must_use]
    pub fn key_id_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::KeyIdMismatch, message)
    }

    /// Construct a [`ErrorKind::KeyRevoked`].
    #[must_use]
    pub fn key_revoked(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::KeyRevoked, message)
    }

    /// Construct a [`ErrorKind::SignatureExpired`].
    #[must_use]
    pub fn signature_expired(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SignatureExpired, message)
    }

    /// Construct a [`ErrorKind::SignatureInFuture`].
    #[must_use]
    pub fn signature_in_future(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SignatureInFuture, message)
    }

    /// Construct a [`ErrorKind::SignatureInvalid`].
    #[must_use]
    pub fn signature_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SignatureInvalid, message)
    }

    /// Construct a [`ErrorKind::MessageModified`].
    #[must_use]
    pub fn message_modified(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MessageModified, message)
    }

    /// Construct a [`ErrorKind::InvalidEncryptedFormat`].
    #[must_use]
    pub fn invalid_encrypted_format(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidEncryptedFormat, message)
    }

    /// Construct a [`ErrorKind::DecryptionFailed`].
    #[must_use]
    pub fn decryption_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DecryptionFailed, message)
    }

    /// Construct a [`ErrorKind::SchemaInvalid`].
    #[must_use]
    pub fn schema_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaInvalid, message)
    }

    /// Construct a [`ErrorKind::ServerSpecIncomplete`].
    #[must_use]
    pub fn server_spec_incomplete(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServerSpecIncomplete, message)
    }

    /// Construct a [`ErrorKind::TransportInit`].
    #[must_use]
    pub fn transport_init(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TransportInit, message)
    }

    /// Construct a [`ErrorKind::Disabled`].
    #[must_use]
    pub fn disabled(server_name: impl Into<String>) -> Self {
        let name = server_name.into();
        Self::new(ErrorKind::Disabled, format!("server `{name}` is disabled")).with_component(name)
    }

    /// Construct a [`ErrorKind::ConnectFailed`] wrapping the underlying cause.
    #[must_use]
    pub fn connect_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConnectFailed, message)
    }

    /// Construct a [`ErrorKind::AlreadyConnected`].
    #[must_use]
    pub fn already_connected(server_name: impl Into<String>) -> Self {
        let name = server_name.into();
        Self::new(ErrorKind::AlreadyConnected, format!("already connected: {name}"))
            .with_component(name)
    }

    /// Construct a [`ErrorKind::PromptNotFound`].
    #[must_use]
    pub fn prompt_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PromptNotFound, message)
    }

    /// Construct a [`ErrorKind::ResourceNotFound`].
    #[must_use]
    pub fn resource_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResourceNotFound, message)
    }

    /// Construct a [`ErrorKind::UnsupportedMime`].
    #[must_use]
    pub fn unsupported_mime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedMime, message)
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        let kind = if err.is_syntax() || err.is_eof() {
            ErrorKind::Malformed
        } else {
            ErrorKind::ValidationError
        };
        Self::new(kind, format!("json error: {err}"))
    }
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind as IoKind;
        let kind = match err.kind() {
            IoKind::NotFound => ErrorKind::ResourceNotFound,
            IoKind::ConnectionRefused
            | IoKind::ConnectionReset
            | IoKind::ConnectionAborted
            | IoKind::NotConnected
            | IoKind::BrokenPipe => ErrorKind::TransportFaulted,
            IoKind::TimedOut => ErrorKind::Timeout,
            _ => ErrorKind::IoError,
        };
        Self::new(kind, format!("io error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_carries_paths() {
        let err = McpError::validation(vec!["arguments.name".into()]);
        assert_eq!(err.kind, ErrorKind::ValidationError);
        assert_eq!(err.paths, vec!["arguments.name".to_string()]);
    }

    #[test]
    fn context_builders_chain() {
        let err = McpError::internal("boom")
            .with_operation("connect")
            .with_component("server-a");
        let ctx = err.context.unwrap();
        assert_eq!(ctx.operation.as_deref(), Some("connect"));
        assert_eq!(ctx.component.as_deref(), Some("server-a"));
    }

    #[test]
    fn retryable_classification() {
        assert!(McpError::timeout("x").is_retryable());
        assert!(!McpError::new(ErrorKind::KeyRevoked, "x").is_retryable());
    }
}
