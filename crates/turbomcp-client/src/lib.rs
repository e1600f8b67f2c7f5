//! # `TurboMCP` Client
//!
//! A single-connection MCP (Model Context Protocol) client: the `initialize`
//! handshake, and the tools/prompts/resources operations a connected server
//! exposes. Transport-agnostic over any [`Transport`](turbomcp_transport::Transport)
//! implementation.
//!
//! Coordinating multiple server connections - attach/detach, health
//! monitoring, failure isolation - is the responsibility of the runtime layer
//! built on top of this crate, not `Client` itself.
//!
//! ## Architecture
//!
//! ```text
//! Application Layer
//!        ↓
//! Client API (this crate)
//!        ↓
//! Protocol Layer (turbomcp-protocol)
//!        ↓
//! Transport Layer (turbomcp-transport)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use turbomcp_client::{Client, ClientBuilder};
//! use turbomcp_transport::StdioTransport;
//!
//! # async fn example() -> turbomcp_core::Result<()> {
//! let client = ClientBuilder::new()
//!     .with_tools(true)
//!     .with_prompts(true)
//!     .build(StdioTransport::new("mcp-server-filesystem", Vec::<String>::new()));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod prelude;

use turbomcp_transport::Transport;

pub use client::core::Client;
pub use client::config::ConnectionConfig;
pub use client::config::InitializeResult;

/// Which MCP operation categories a [`Client`] intends to use.
///
/// This is local bookkeeping, not a wire type: the MCP `initialize` handshake
/// negotiates tools/prompts/resources support from the *server* side, so
/// these flags only drive which operations a caller expects to be available
/// and don't change what's sent on the wire.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientCapabilities {
    /// Whether the caller intends to call tools.
    pub tools: bool,
    /// Whether the caller intends to fetch prompts.
    pub prompts: bool,
    /// Whether the caller intends to read or subscribe to resources.
    pub resources: bool,
}

impl ClientCapabilities {
    /// Capabilities with every operation category enabled.
    #[must_use]
    pub fn all() -> Self {
        Self {
            tools: true,
            prompts: true,
            resources: true,
        }
    }
}

/// Builder for configuring and constructing a [`Client`].
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    capabilities: ClientCapabilities,
    connection_config: ConnectionConfig,
}

impl ClientBuilder {
    /// Create a new builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable tool support.
    #[must_use]
    pub fn with_tools(mut self, enabled: bool) -> Self {
        self.capabilities.tools = enabled;
        self
    }

    /// Enable or disable prompt support.
    #[must_use]
    pub fn with_prompts(mut self, enabled: bool) -> Self {
        self.capabilities.prompts = enabled;
        self
    }

    /// Enable or disable resource support.
    #[must_use]
    pub fn with_resources(mut self, enabled: bool) -> Self {
        self.capabilities.resources = enabled;
        self
    }

    /// Configure all capabilities at once.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: ClientCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.connection_config.timeout_ms = timeout_ms;
        self
    }

    /// Set the maximum retry attempts.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.connection_config.max_retries = max_retries;
        self
    }

    /// Set the retry delay.
    #[must_use]
    pub fn with_retry_delay(mut self, delay_ms: u64) -> Self {
        self.connection_config.retry_delay_ms = delay_ms;
        self
    }

    /// Set the keep-alive interval.
    #[must_use]
    pub fn with_keepalive(mut self, interval_ms: u64) -> Self {
        self.connection_config.keepalive_ms = interval_ms;
        self
    }

    /// Configure connection settings all at once.
    #[must_use]
    pub fn with_connection_config(mut self, config: ConnectionConfig) -> Self {
        self.connection_config = config;
        self
    }

    /// The capabilities configured so far.
    #[must_use]
    pub fn capabilities(&self) -> &ClientCapabilities {
        &self.capabilities
    }

    /// The connection configuration so far.
    #[must_use]
    pub fn connection_config(&self) -> &ConnectionConfig {
        &self.connection_config
    }

    /// Build a client with the configured capabilities.
    ///
    /// `connection_config` is not yet threaded through to the transport layer;
    /// retry/timeout enforcement happens at the call site for now.
    pub fn build<T: Transport>(self, transport: T) -> Client<T> {
        Client::with_capabilities(transport, self.capabilities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_no_capabilities() {
        let builder = ClientBuilder::new();
        assert!(!builder.capabilities().tools);
        assert!(!builder.capabilities().prompts);
        assert!(!builder.capabilities().resources);
    }

    #[test]
    fn builder_chains_capability_flags() {
        let builder = ClientBuilder::new().with_tools(true).with_prompts(true);
        assert!(builder.capabilities().tools);
        assert!(builder.capabilities().prompts);
        assert!(!builder.capabilities().resources);
    }

    #[test]
    fn all_capabilities_enables_everything() {
        let caps = ClientCapabilities::all();
        assert!(caps.tools && caps.prompts && caps.resources);
    }
}
