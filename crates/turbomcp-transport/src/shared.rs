//! Thread-safe wrapper for sharing a single [`Transport`] across async tasks.
//!
//! `Transport` methods take `&self` but the underlying implementations (a
//! child process's stdin/stdout, an HTTP client's session state) still need
//! serialized access for connect/disconnect and to keep send/receive
//! ordering intact when the connection manager and subscription engine poll
//! the same server concurrently.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::Mutex;

use turbomcp_transport_traits::{
    Transport, TransportCapabilities, TransportConfig, TransportMessage, TransportMetrics,
    TransportResult, TransportState, TransportType,
};

/// Serializes access to a boxed [`Transport`] so it can be cloned and shared
/// across the tasks that poll it (the connection manager and the
/// subscription engine's pollers).
#[derive(Clone)]
pub struct SharedTransport {
    inner: Arc<Mutex<Box<dyn Transport>>>,
}

impl SharedTransport {
    /// Wrap a transport for shared, serialized access.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self { inner: Arc::new(Mutex::new(transport)) }
    }

    /// The transport's type, e.g. stdio or HTTP.
    pub async fn transport_type(&self) -> TransportType {
        self.inner.lock().await.transport_type()
    }

    /// A snapshot of the transport's declared capabilities.
    pub async fn capabilities(&self) -> TransportCapabilities {
        self.inner.lock().await.capabilities().clone()
    }

    /// The transport's current connection state.
    pub async fn state(&self) -> TransportState {
        self.inner.lock().await.state().await
    }

    /// Connect to the server.
    pub async fn connect(&self) -> TransportResult<()> {
        self.inner.lock().await.connect().await
    }

    /// Disconnect from the server.
    pub async fn disconnect(&self) -> TransportResult<()> {
        self.inner.lock().await.disconnect().await
    }

    /// Send a message.
    pub async fn send(&self, message: TransportMessage) -> TransportResult<()> {
        self.inner.lock().await.send(message).await
    }

    /// Receive the next available message, if any.
    pub async fn receive(&self) -> TransportResult<Option<TransportMessage>> {
        self.inner.lock().await.receive().await
    }

    /// A snapshot of the transport's performance counters.
    pub async fn metrics(&self) -> TransportMetrics {
        self.inner.lock().await.metrics().await
    }

    /// Whether the transport currently reports itself connected.
    pub async fn is_connected(&self) -> bool {
        self.inner.lock().await.is_connected().await
    }

    /// The endpoint the transport is configured to reach, if any.
    pub async fn endpoint(&self) -> Option<String> {
        self.inner.lock().await.endpoint()
    }

    /// Apply a new configuration to the transport.
    pub async fn configure(&self, config: TransportConfig) -> TransportResult<()> {
        self.inner.lock().await.configure(config).await
    }
}

impl std::fmt::Debug for SharedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTransport").finish_non_exhaustive()
    }
}

impl Transport for SharedTransport {
    fn transport_type(&self) -> TransportType {
        // Requires the async mutex; callers on the hot path should prefer
        // the inherent `transport_type()` method above.
        self.inner
            .try_lock()
            .map(|guard| guard.transport_type())
            .unwrap_or(TransportType::Stdio)
    }

    fn capabilities(&self) -> &TransportCapabilities {
        unimplemented!(
            "SharedTransport::capabilities() cannot borrow through the mutex; \
             use the inherent async capabilities() method instead"
        )
    }

    fn state(&self) -> Pin<Box<dyn Future<Output = TransportState> + Send + '_>> {
        Box::pin(self.state())
    }

    fn connect(&self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(self.connect())
    }

    fn disconnect(&self) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(self.disconnect())
    }

    fn send(
        &self,
        message: TransportMessage,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(self.send(message))
    }

    fn receive(
        &self,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Option<TransportMessage>>> + Send + '_>> {
        Box::pin(self.receive())
    }

    fn metrics(&self) -> Pin<Box<dyn Future<Output = TransportMetrics> + Send + '_>> {
        Box::pin(self.metrics())
    }

    fn is_connected(&self) -> Pin<Box<dyn Future<Output = bool> + Send + '_>> {
        Box::pin(self.is_connected())
    }

    fn configure(
        &self,
        config: TransportConfig,
    ) -> Pin<Box<dyn Future<Output = TransportResult<()>> + Send + '_>> {
        Box::pin(self.configure(config))
    }
}
