//! # `TurboMCP` Core
//!
//! Foundational types shared by every crate in the runtime: the MCP wire
//! types (tools, prompts, resources, content parts), the unified error
//! taxonomy, and JSON-RPC 2.0 primitives.
//!
//! ## Module Organization
//!
//! - [`types`]: Core MCP protocol types (tools, resources, prompts, content)
//! - [`error`]: Unified error type and taxonomy
//! - [`jsonrpc`]: JSON-RPC 2.0 request/response/notification types
//!
//! ## Example
//!
//! ```rust
//! use turbomcp_core::types::{Tool, ToolInputSchema};
//!
//! let tool = Tool {
//!     name: "calculator".into(),
//!     description: Some("Performs calculations".into()),
//!     input_schema: ToolInputSchema::default(),
//!     ..Default::default()
//! };
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod error;
pub mod jsonrpc;
pub mod types;

// Re-export commonly used types at crate root.
pub use error::{ErrorKind, McpError, McpError as Error, Result};
pub use jsonrpc::{
    JSONRPC_VERSION, JsonRpcError, JsonRpcErrorCode, JsonRpcMessage, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, JsonRpcVersion,
};
pub use types::core::MessageId;

/// MCP Protocol version spoken by this runtime.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Maximum message size accepted from a transport, in bytes (1 MiB).
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Default request deadline in milliseconds when a caller supplies none.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// SDK version (this crate's `CARGO_PKG_VERSION`).
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol method names used when framing JSON-RPC requests.
pub mod methods {
    /// Initialize handshake method.
    pub const INITIALIZE: &str = "initialize";
    /// Initialized notification method.
    pub const INITIALIZED: &str = "notifications/initialized";
    /// List available tools.
    pub const LIST_TOOLS: &str = "tools/list";
    /// Call a specific tool.
    pub const CALL_TOOL: &str = "tools/call";
    /// List available prompts.
    pub const LIST_PROMPTS: &str = "prompts/list";
    /// Get a specific prompt.
    pub const GET_PROMPT: &str = "prompts/get";
    /// List available resources.
    pub const LIST_RESOURCES: &str = "resources/list";
    /// Read a specific resource.
    pub const READ_RESOURCE: &str = "resources/read";
    /// Subscribe to resource updates.
    pub const SUBSCRIBE: &str = "resources/subscribe";
    /// Unsubscribe from resource updates.
    pub const UNSUBSCRIBE: &str = "resources/unsubscribe";
    /// Resource-updated notification.
    pub const RESOURCE_UPDATED: &str = "notifications/resources/updated";
    /// List resource templates.
    pub const LIST_RESOURCE_TEMPLATES: &str = "resources/templates/list";
    /// Liveness check.
    pub const PING: &str = "ping";
    /// Set the server's minimum logging level.
    pub const SET_LEVEL: &str = "logging/setLevel";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_constants() {
        assert_eq!(PROTOCOL_VERSION, "2025-06-18");
        assert_eq!(MAX_MESSAGE_SIZE, 1024 * 1024);
    }
}
