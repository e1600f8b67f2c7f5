//! Thin runtime-facing wrapper over the agent-to-agent signing layer: owns
//! the key registry and stamps outbound/inbound messages with wall-clock
//! time so callers never have to thread `now_ms` through by hand.

use std::time::{SystemTime, UNIX_EPOCH};

use turbomcp_a2a::{KeyRegistry, Message, SignedMessage, VerifyOutcome, VerifyPolicy, sign_message, verify_message};
use turbomcp_core::{Error, Result};

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Signs outbound agent-to-agent messages and verifies inbound ones against
/// a shared [`KeyRegistry`].
#[derive(Debug, Default)]
pub struct A2aChannel {
    registry: KeyRegistry,
}

impl A2aChannel {
    /// An empty channel with no agent keys registered yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh secret for `agent_id`, returning its derived key id.
    ///
    /// # Errors
    ///
    /// Returns an error if `secret` matches a previously revoked key for this agent.
    pub fn register_agent(&self, agent_id: &str, secret: Vec<u8>) -> Result<String> {
        self.registry.register(agent_id, secret, now_ms())
    }

    /// Revoke `key_id` for `agent_id`; previously signed messages remain
    /// verifiable history, but new signatures under that key are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if `agent_id` has no such key.
    pub fn revoke_agent_key(&self, agent_id: &str, key_id: &str, reason: &str) -> Result<()> {
        self.registry.revoke(agent_id, key_id, reason, now_ms())
    }

    /// Sign `message` with the sender's currently active key.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NoKey`](turbomcp_core::ErrorKind::NoKey) if the sender has
    /// no active key registered.
    pub fn sign(&self, message: Message) -> Result<SignedMessage> {
        sign_message(&self.registry, message, now_ms())
    }

    /// Verify `signed` against the registered keys, rejecting stale or
    /// future-dated signatures per `policy`.
    #[must_use]
    pub fn verify(&self, signed: &SignedMessage, policy: VerifyPolicy) -> VerifyOutcome {
        verify_message(&self.registry, signed, now_ms(), policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_signed_message() {
        let channel = A2aChannel::new();
        channel.register_agent("agent-a", b"a-very-long-shared-secret-key-material".to_vec()).unwrap();

        let message = Message {
            message_type: None,
            from: "agent-a".to_string(),
            to: "agent-b".to_string(),
            id: None,
            timestamp: now_ms(),
            method: "ping".to_string(),
            params: None,
        };

        let signed = channel.sign(message).unwrap();
        let outcome = channel.verify(&signed, VerifyPolicy::default());
        assert!(outcome.valid);
    }

    #[test]
    fn revoked_key_fails_new_signatures() {
        let channel = A2aChannel::new();
        let key_id = channel
            .register_agent("agent-a", b"a-very-long-shared-secret-key-material".to_vec())
            .unwrap();
        channel.revoke_agent_key("agent-a", &key_id, "rotated").unwrap();

        let message = Message {
            message_type: None,
            from: "agent-a".to_string(),
            to: "agent-b".to_string(),
            id: None,
            timestamp: now_ms(),
            method: "ping".to_string(),
            params: None,
        };

        let err = channel.sign(message).unwrap_err();
        assert!(matches!(err.kind, turbomcp_core::ErrorKind::NoKey));
    }
}
