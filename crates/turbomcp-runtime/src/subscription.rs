//! Resource change notifications, backed by polling: subscribing asks the
//! server for updates and starts a background task that re-reads the
//! resource on an interval, publishing a diff-aware event whenever its
//! content actually changes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use turbomcp_core::Error;
use turbomcp_core::types::ReadResourceResult;

use crate::manager::ClientHandle;

/// Default interval between re-reads of a subscribed resource.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Capacity of the broadcast channel backing [`SubscriptionEngine::events`].
/// A lagging subscriber misses the oldest events rather than blocking publishers.
const EVENT_CHANNEL_CAPACITY: usize = 256;

fn subscription_id(server_name: &str, uri: &str) -> String {
    format!("{server_name}::{uri}")
}

fn content_hash(result: &ReadResourceResult) -> u64 {
    let mut hasher = DefaultHasher::new();
    for content in &result.contents {
        content.uri.hash(&mut hasher);
        content.mime_type.hash(&mut hasher);
        content.text.hash(&mut hasher);
        content.blob.hash(&mut hasher);
    }
    hasher.finish()
}

/// A resource update observed by the poller, or notice that polling for a
/// subscription has stopped because its server disconnected.
#[derive(Debug, Clone)]
pub enum SubscriptionEvent {
    /// `uri` on `server_name` was re-read and its content changed.
    Updated {
        /// The server the resource belongs to.
        server_name: String,
        /// The resource's URI.
        uri: String,
        /// The freshly read content.
        result: ReadResourceResult,
    },
    /// Polling for `uri` on `server_name` stopped because a poll failed
    /// repeatedly or the server disconnected.
    Lapsed {
        /// The server the resource belongs to.
        server_name: String,
        /// The resource's URI.
        uri: String,
        /// Why polling stopped.
        reason: String,
    },
}

struct SubscriptionHandle {
    task: JoinHandle<()>,
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Tracks every active resource subscription and the background pollers
/// backing them, and fans out change events to interested consumers.
pub struct SubscriptionEngine {
    handles: DashMap<String, SubscriptionHandle>,
    events: broadcast::Sender<SubscriptionEvent>,
    poll_interval: Duration,
}

impl Default for SubscriptionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionEngine {
    /// A new engine polling at [`DEFAULT_POLL_INTERVAL`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_poll_interval(DEFAULT_POLL_INTERVAL)
    }

    /// A new engine polling at a custom interval.
    #[must_use]
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            handles: DashMap::new(),
            events,
            poll_interval,
        }
    }

    /// A receiver for every [`SubscriptionEvent`] published from this point on.
    #[must_use]
    pub fn events(&self) -> broadcast::Receiver<SubscriptionEvent> {
        self.events.subscribe()
    }

    /// Register interest in `uri` on `server_name` and start polling it for
    /// changes via `client`. Subscribing to the same `(server_name, uri)`
    /// pair twice replaces the previous poller.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial `subscribe` call to the server fails.
    pub async fn subscribe(&self, server_name: &str, uri: &str, client: ClientHandle) -> Result<(), Error> {
        {
            let guard = client.read().await;
            guard.subscribe(uri).await?;
        }

        let id = subscription_id(server_name, uri);
        let server_name_owned = server_name.to_string();
        let uri_owned = uri.to_string();
        let events = self.events.clone();
        let interval = self.poll_interval;

        let task = tokio::spawn(async move {
            poll_loop(server_name_owned, uri_owned, client, events, interval).await;
        });

        if let Some(old) = self.handles.insert(id, SubscriptionHandle { task }) {
            old.task.abort();
        }
        Ok(())
    }

    /// Cancel the subscription for `(server_name, uri)`, if any, and notify
    /// the server. Idempotent: unsubscribing twice is not an error.
    pub async fn unsubscribe(&self, server_name: &str, uri: &str, client: Option<ClientHandle>) {
        let id = subscription_id(server_name, uri);
        if let Some((_, handle)) = self.handles.remove(&id) {
            handle.task.abort();
        }
        if let Some(client) = client {
            let guard = client.read().await;
            let _ = guard.unsubscribe(uri).await;
        }
    }

    /// Cancel every subscription belonging to `server_name` (called on disconnect).
    pub async fn unsubscribe_by_server(&self, server_name: &str) {
        let prefix = format!("{server_name}::");
        let ids: Vec<String> = self
            .handles
            .iter()
            .map(|e| e.key().clone())
            .filter(|id| id.starts_with(&prefix))
            .collect();
        for id in ids {
            if let Some((_, handle)) = self.handles.remove(&id) {
                handle.task.abort();
            }
        }
    }

    /// How many subscriptions are currently active.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.handles.len()
    }
}

async fn poll_loop(
    server_name: String,
    uri: String,
    client: ClientHandle,
    events: broadcast::Sender<SubscriptionEvent>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut last_hash: Option<u64> = None;
    let mut consecutive_failures = 0u32;
    const MAX_CONSECUTIVE_FAILURES: u32 = 5;

    loop {
        ticker.tick().await;

        let read_result = {
            let guard = client.read().await;
            guard.read_resource(&uri).await
        };

        match read_result {
            Ok(result) => {
                consecutive_failures = 0;
                let hash = content_hash(&result);
                if last_hash != Some(hash) {
                    last_hash = Some(hash);
                    let _ = events.send(SubscriptionEvent::Updated {
                        server_name: server_name.clone(),
                        uri: uri.clone(),
                        result,
                    });
                }
            }
            Err(err) => {
                consecutive_failures += 1;
                warn!(server = %server_name, uri = %uri, error = %err, "resource poll failed");
                if consecutive_failures >= MAX_CONSECUTIVE_FAILURES {
                    let _ = events.send(SubscriptionEvent::Lapsed {
                        server_name: server_name.clone(),
                        uri: uri.clone(),
                        reason: format!("poll failed {consecutive_failures} times in a row: {err}"),
                    });
                    debug!(server = %server_name, uri = %uri, "subscription poller giving up");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_id_joins_server_and_uri() {
        assert_eq!(subscription_id("fs", "file:///a"), "fs::file:///a");
    }

    #[tokio::test]
    async fn events_receiver_starts_empty() {
        let engine = SubscriptionEngine::new();
        let mut rx = engine.events();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unsubscribe_unknown_subscription_is_not_an_error() {
        let engine = SubscriptionEngine::new();
        engine.unsubscribe("fs", "file:///missing", None).await;
        assert_eq!(engine.active_count(), 0);
    }
}
