//! # `TurboMCP` Protocol
//!
//! Message validation and capability negotiation layered on top of the wire
//! types in `turbomcp-core`. This crate does not define its own MCP types —
//! `turbomcp-core::types` is the single source of truth for the protocol's
//! request/response/notification shapes; this crate only adds the checks
//! that run before a message crosses the wire.
//!
//! ## Architecture
//!
//! ```text
//! turbomcp-protocol/
//! ├── capabilities/    # Client/server feature negotiation
//! └── validation/      # Structural and semantic message validation
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    clippy::all
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Capability negotiation and compatibility checking between client and server.
pub mod capabilities;
/// Structural and semantic validation of protocol messages.
pub mod validation;

pub use capabilities::{CapabilityError, CapabilityMatcher, CapabilityNegotiator, CapabilitySet};
pub use validation::{ProtocolValidator, ValidationError, ValidationResult, ValidationWarning};

/// MCP wire types, re-exported from `turbomcp-core` for backward-compatible import paths.
pub use turbomcp_core::types;
pub use turbomcp_core::{
    Error, MAX_MESSAGE_SIZE, McpError, MessageId, PROTOCOL_VERSION, Result,
    types::core::Implementation,
    jsonrpc::{
        JsonRpcError, JsonRpcErrorCode, JsonRpcMessage, JsonRpcNotification, JsonRpcRequest,
        JsonRpcResponse, JsonRpcVersion, RequestId,
    },
    methods,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert_eq!(PROTOCOL_VERSION, "2025-06-18");
    }

    #[test]
    fn test_method_names() {
        assert_eq!(methods::INITIALIZE, "initialize");
        assert_eq!(methods::LIST_TOOLS, "tools/list");
        assert_eq!(methods::CALL_TOOL, "tools/call");
    }
}
