//! Parallel, failure-isolated connection lifecycle for every configured
//! server: attach, detach, and report per-server health.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{info, warn};

use turbomcp_auth::{CredentialStore, OAuthToken, authenticate};
use turbomcp_client::{Client, ClientCapabilities};
use turbomcp_core::Error;
use turbomcp_transport::{Transport, build_transport};

use crate::descriptor::ServerDescriptor;
use crate::registry::CapabilityRegistry;
use crate::subscription::SubscriptionEngine;

/// Identity label this crate sends as the handshake's client name prefix;
/// each connected server sees `"{CLIENT_LABEL}:{serverName}"` rather than
/// one static string shared across every server.
const CLIENT_LABEL: &str = "turbomcp-runtime";

/// A shared, lockable handle to one server's client, cheap to clone out of
/// the manager for a single call (e.g. a subscription poll) without holding
/// the manager's connection map locked for the duration.
pub type ClientHandle = Arc<RwLock<Client<Box<dyn Transport>>>>;

/// A server the manager has successfully attached to.
struct ConnectedServer {
    client: ClientHandle,
    descriptor: ServerDescriptor,
}

/// A snapshot of one server's connection state, as reported by [`ConnectionManager::status`].
#[derive(Debug, Clone)]
pub struct ServerStatus {
    /// The server's configured name.
    pub name: String,
    /// Whether the server is currently connected and initialized.
    pub connected: bool,
    /// The most recent connection failure, if any (cleared on success).
    pub last_error: Option<String>,
}

/// Coordinates attach/detach/health across every configured server,
/// isolating one server's failure from the rest and keeping the
/// [`CapabilityRegistry`] and [`SubscriptionEngine`] in sync with which
/// servers are actually live.
pub struct ConnectionManager {
    connected: DashMap<String, ConnectedServer>,
    last_errors: DashMap<String, String>,
    registry: Arc<CapabilityRegistry>,
    subscriptions: Arc<SubscriptionEngine>,
    credential_store: Arc<CredentialStore>,
}

impl ConnectionManager {
    /// Build a manager backed by the given registry, subscription engine,
    /// and OAuth credential store.
    #[must_use]
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        subscriptions: Arc<SubscriptionEngine>,
        credential_store: Arc<CredentialStore>,
    ) -> Self {
        Self {
            connected: DashMap::new(),
            last_errors: DashMap::new(),
            registry,
            subscriptions,
            credential_store,
        }
    }

    /// Resolve an `Authorization: Bearer` header for `descriptor`, minting
    /// a fresh token via the OAuth flow if none is cached or the cached one
    /// has expired.
    async fn bearer_header(&self, server_name: &str, descriptor: &ServerDescriptor) -> Result<HashMap<String, String>, Error> {
        let Some(oauth) = &descriptor.oauth else {
            return Ok(HashMap::new());
        };

        let cached = self
            .credential_store
            .get(server_name)
            .map_err(|e| Error::connect_failed(format!("failed to read cached oauth token: {e}")))?;
        let token: OAuthToken = match cached {
            Some(credential) if !self.credential_store.is_expired(&credential.token) => credential.token,
            _ => {
                let token = authenticate(oauth)
                    .await
                    .map_err(|e| Error::connect_failed(format!("oauth authentication failed: {e}")))?;
                self.credential_store
                    .save(
                        server_name,
                        token.clone(),
                        Some(oauth.client_id.clone()),
                        Some(oauth.token_url.clone()),
                        oauth.mcp_server_url.clone(),
                    )
                    .map_err(|e| Error::connect_failed(format!("failed to persist oauth token: {e}")))?;
                token
            }
        };

        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), format!("Bearer {}", token.access_token));
        Ok(headers)
    }

    /// Attach to one configured server: build and connect its transport,
    /// perform the MCP handshake, and fuse its capabilities into the
    /// registry. Leaves every other connected server untouched on failure.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Disabled`](turbomcp_core::ErrorKind::Disabled) if the
    /// descriptor is disabled, [`ErrorKind::AlreadyConnected`](turbomcp_core::ErrorKind::AlreadyConnected)
    /// if already attached, or [`ErrorKind::ConnectFailed`](turbomcp_core::ErrorKind::ConnectFailed)
    /// if the transport or handshake fails.
    pub async fn connect(&self, name: &str, descriptor: ServerDescriptor) -> Result<(), Error> {
        if descriptor.disabled {
            let err = Error::disabled(name);
            self.last_errors.insert(name.to_string(), err.to_string());
            return Err(err);
        }
        if self.connected.contains_key(name) {
            return Err(Error::already_connected(name));
        }

        let result = self.connect_inner(name, &descriptor).await;
        match result {
            Ok(client) => {
                if let Err(err) = {
                    let guard = client.read().await;
                    self.registry.discover(name, &guard, descriptor.tool_filter.as_ref()).await
                } {
                    let err = Error::connect_failed(format!("capability discovery failed: {err}"));
                    self.last_errors.insert(name.to_string(), err.to_string());
                    return Err(err);
                }
                self.last_errors.remove(name);
                self.connected.insert(name.to_string(), ConnectedServer { client, descriptor });
                info!(server = name, "connected");
                Ok(())
            }
            Err(err) => {
                self.last_errors.insert(name.to_string(), err.to_string());
                warn!(server = name, error = %err, "connect failed");
                Err(err)
            }
        }
    }

    async fn connect_inner(&self, name: &str, descriptor: &ServerDescriptor) -> Result<ClientHandle, Error> {
        let extra_headers = if descriptor.is_http() {
            self.bearer_header(name, descriptor).await?
        } else {
            HashMap::new()
        };

        let transport_config = descriptor.to_transport_config(&extra_headers);
        let transport = build_transport(&transport_config)
            .await
            .map_err(|e| Error::connect_failed(format!("{name}: {e}")))?;
        transport
            .connect()
            .await
            .map_err(|e| Error::connect_failed(format!("{name}: {e}")))?;

        let mut client = Client::with_capabilities(transport, ClientCapabilities::all());
        client
            .initialize(&format!("{CLIENT_LABEL}:{name}"))
            .await
            .map_err(|e| Error::connect_failed(format!("{name}: handshake failed: {e}")))?;
        Ok(Arc::new(RwLock::new(client)))
    }

    /// Attach to every descriptor in `servers` concurrently. A failing
    /// server does not prevent the others from connecting; call [`Self::status`]
    /// afterward to see which ones failed and why.
    pub async fn connect_all(self: &Arc<Self>, servers: HashMap<String, ServerDescriptor>) {
        let mut handles = Vec::with_capacity(servers.len());
        for (name, descriptor) in servers {
            let this = Arc::clone(self);
            handles.push(tokio::spawn(async move {
                let _ = this.connect(&name, descriptor).await;
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Detach from `name`, dropping its capabilities from the registry and
    /// its subscriptions from the subscription engine.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotConnected`](turbomcp_core::ErrorKind::NotConnected) if
    /// `name` is not currently connected.
    pub async fn disconnect(&self, name: &str) -> Result<(), Error> {
        let Some((_, connected)) = self.connected.remove(name) else {
            return Err(Error::not_connected(name));
        };
        self.registry.remove_server(name);
        self.subscriptions.unsubscribe_by_server(name).await;
        let _ = connected.client.write().await.disconnect().await;
        info!(server = name, "disconnected");
        Ok(())
    }

    /// Detach from every currently connected server, concurrently.
    pub async fn disconnect_all(self: &Arc<Self>) {
        let names: Vec<String> = self.connected.iter().map(|e| e.key().clone()).collect();
        let mut handles = Vec::with_capacity(names.len());
        for name in names {
            let this = Arc::clone(self);
            handles.push(tokio::spawn(async move {
                let _ = this.disconnect(&name).await;
            }));
        }
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// A status snapshot for every server ever attempted: currently
    /// connected servers plus any that most recently failed to connect.
    #[must_use]
    pub fn status(&self) -> Vec<ServerStatus> {
        let mut names: std::collections::BTreeSet<String> = self.connected.iter().map(|e| e.key().clone()).collect();
        names.extend(self.last_errors.iter().map(|e| e.key().clone()));

        names
            .into_iter()
            .map(|name| ServerStatus {
                connected: self.connected.contains_key(&name),
                last_error: self.last_errors.get(&name).map(|e| e.value().clone()),
                name,
            })
            .collect()
    }

    /// Whether `name` is currently connected.
    #[must_use]
    pub fn is_connected(&self, name: &str) -> bool {
        self.connected.contains_key(name)
    }

    /// A clonable handle to `name`'s client, for callers (the invocation and
    /// subscription engines) that need to make a call without holding the
    /// manager's connection map locked for the duration.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotConnected`](turbomcp_core::ErrorKind::NotConnected) if
    /// `name` is not currently connected.
    pub fn client_handle(&self, name: &str) -> Result<ClientHandle, Error> {
        self.connected
            .get(name)
            .map(|entry| Arc::clone(&entry.client))
            .ok_or_else(|| Error::not_connected(name))
    }

    /// The descriptor `name` was connected with, if currently connected.
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<ServerDescriptor> {
        self.connected.get(name).map(|entry| entry.descriptor.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_empty_when_nothing_attempted() {
        let registry = Arc::new(CapabilityRegistry::new());
        let subs = Arc::new(SubscriptionEngine::new());
        let store = Arc::new(CredentialStore::with_default_path());
        let manager = ConnectionManager::new(registry, subs, store);
        assert!(manager.status().is_empty());
    }
}
