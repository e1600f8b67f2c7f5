//! Core Client implementation for MCP communication
//!
//! Contains the `Client<T>` struct and its connection lifecycle: construction,
//! the `initialize` handshake, and capability storage. Per-area operations
//! (tools, prompts, resources, connection utilities) live under `operations/`.

use turbomcp_core::{Error, Result};
use turbomcp_protocol::types::{
    ClientCapabilities as ProtocolClientCapabilities, InitializeRequest, ServerCapabilities,
};

use super::config::InitializeResult;
use super::protocol::ProtocolClient;
use crate::ClientCapabilities;

/// A single-connection MCP client speaking JSON-RPC over one transport.
///
/// `Client` owns exactly one server connection and performs requests
/// synchronously, one in flight at a time. Coordinating several servers -
/// attaching, detaching, isolating a failure to one server - is the job of
/// the runtime layer built on top of this crate, not this type.
#[derive(Debug)]
pub struct Client<T: turbomcp_transport::Transport> {
    pub(super) protocol: ProtocolClient<T>,
    pub(super) capabilities: ClientCapabilities,
    pub(super) initialized: bool,
    pub(super) server_capabilities: Option<ServerCapabilities>,
}

impl<T: turbomcp_transport::Transport> Client<T> {
    /// Create a new client over the given transport with default capabilities.
    pub fn new(transport: T) -> Self {
        Self::with_capabilities(transport, ClientCapabilities::default())
    }

    /// Create a new client with explicit capabilities to advertise during `initialize`.
    pub fn with_capabilities(transport: T, capabilities: ClientCapabilities) -> Self {
        Self {
            protocol: ProtocolClient::new(transport),
            capabilities,
            initialized: false,
            server_capabilities: None,
        }
    }

    /// Perform the MCP `initialize` handshake and send the `initialized` notification.
    ///
    /// `client_name` is sent verbatim as the handshake's `Implementation.name`,
    /// so a caller speaking to several servers (e.g. the runtime's
    /// `ConnectionManager`) can identify itself per-server rather than with
    /// one static label every server sees alike.
    ///
    /// Every other operation returns
    /// [`ErrorKind::ValidationError`](turbomcp_core::error::ErrorKind::ValidationError)
    /// via [`Error::bad_request`] if called before this completes.
    pub async fn initialize(&mut self, client_name: &str) -> Result<InitializeResult> {
        let request = InitializeRequest::new(turbomcp_protocol::Implementation::new(
            client_name,
            env!("CARGO_PKG_VERSION"),
        ))
        .with_capabilities(ProtocolClientCapabilities::default());

        let result: turbomcp_protocol::types::InitializeResult = self
            .protocol
            .request(
                turbomcp_core::methods::INITIALIZE,
                Some(serde_json::to_value(&request).map_err(|e| {
                    Error::protocol(format!("failed to serialize initialize request: {e}"))
                })?),
            )
            .await?;

        self.protocol
            .notify(turbomcp_core::methods::INITIALIZED, None)
            .await?;

        self.server_capabilities = Some(result.capabilities.clone());
        self.initialized = true;

        Ok(InitializeResult {
            server_info: result.server_info,
            server_capabilities: result.capabilities,
        })
    }

    /// Whether `initialize` has completed successfully.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.initialized
    }

    /// The capabilities this client was constructed with.
    #[must_use]
    pub fn capabilities(&self) -> &ClientCapabilities {
        &self.capabilities
    }

    /// The capabilities the server advertised back, once connected.
    #[must_use]
    pub fn server_capabilities(&self) -> Option<&ServerCapabilities> {
        self.server_capabilities.as_ref()
    }

    /// Disconnect the underlying transport.
    pub async fn disconnect(&mut self) -> Result<()> {
        self.initialized = false;
        self.protocol.disconnect().await
    }

    pub(super) fn require_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(Error::bad_request("client not initialized"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use turbomcp_transport::{
        Transport, TransportCapabilities, TransportMessage, TransportMetrics, TransportResult,
        TransportState, TransportType,
    };

    #[derive(Debug, Default)]
    struct NullTransport {
        capabilities: TransportCapabilities,
    }

    impl Transport for NullTransport {
        fn transport_type(&self) -> TransportType {
            TransportType::Stdio
        }

        fn capabilities(&self) -> &TransportCapabilities {
            &self.capabilities
        }

        fn state(&self) -> Pin<Box<dyn Future<Output = TransportState> + Send + '_>> {
            Box::pin(async { TransportState::Disconnected })
        }

        fn connect(&self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
            Box::pin(async { Ok(()) })
        }

        fn disconnect(&self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
            Box::pin(async { Ok(()) })
        }

        fn send(
            &self,
            _message: TransportMessage,
        ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
            Box::pin(async { Ok(()) })
        }

        fn receive(
            &self,
        ) -> Pin<Box<dyn Future<Output = TransportResult<Option<TransportMessage>>> + Send + '_>>
        {
            Box::pin(async { Ok(None) })
        }

        fn metrics(&self) -> Pin<Box<dyn Future<Output = TransportMetrics> + Send + '_>> {
            Box::pin(async { TransportMetrics::default() })
        }
    }

    #[test]
    fn new_client_is_not_initialized() {
        let client = Client::new(NullTransport::default());
        assert!(!client.is_connected());
        assert!(client.server_capabilities().is_none());
    }

    #[test]
    fn require_initialized_rejects_before_handshake() {
        let client = Client::new(NullTransport::default());
        assert!(client.require_initialized().is_err());
    }
}
