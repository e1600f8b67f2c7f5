//! Per-agent HMAC key registry: registration, rotation, and revocation.

use std::collections::HashMap;

use hmac::{Hmac, Mac};
use parking_lot::RwLock;
use sha2::Sha256;

use turbomcp_core::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

const KEY_ID_SALT: &[u8] = b"keyid-salt";

/// Derive the `keyId` for a secret: `HMAC-SHA256("keyid-salt", secret)`
/// truncated to the first 16 hex characters.
#[must_use]
pub fn derive_key_id(secret: &[u8]) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(KEY_ID_SALT)
        .expect("HMAC accepts keys of any length");
    mac.update(secret);
    let digest = mac.finalize().into_bytes();
    hex::encode(digest)[..16].to_string()
}

/// HMAC-SHA256 over `message` keyed by `secret`, hex-encoded.
pub(crate) fn hmac_hex(secret: &[u8], message: &[u8]) -> String {
    let mut mac =
        <HmacSha256 as Mac>::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Metadata recorded alongside an active key.
#[derive(Debug, Clone)]
pub struct KeyMeta {
    pub registered_at_ms: i64,
    pub key_id: String,
    pub algorithm: String,
}

#[derive(Debug, Clone)]
struct ActiveKey {
    secret: Vec<u8>,
    meta: KeyMeta,
}

/// A revoked key entry, kept so a revoked `keyId` can never be re-registered.
#[derive(Debug, Clone)]
pub struct RevokedKey {
    pub key_id: String,
    pub revoked_at_ms: i64,
    pub reason: String,
}

/// Registry statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyRegistryStats {
    pub registered: usize,
    pub revoked: usize,
    pub agents_with_revoked: usize,
}

#[derive(Debug, Default)]
struct AgentKeys {
    active: Option<ActiveKey>,
    revoked: Vec<RevokedKey>,
}

/// Thread-safe registry of per-agent HMAC secrets.
///
/// `register` rejects a secret whose derived `keyId` has already been
/// revoked for that agent. `rotate` atomically revokes the current key
/// (reason `"Key rotation"`) then registers the new one. `revoke` fails if
/// there is no current key or the given `keyId` doesn't match it; the same
/// `keyId` can never be revoked twice.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    agents: RwLock<HashMap<String, AgentKeys>>,
}

impl KeyRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a secret for `agent_id`, returning its derived `keyId`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::key_revoked`] if the derived `keyId` is on the
    /// revoked list for this agent.
    pub fn register(&self, agent_id: &str, secret: Vec<u8>, now_ms: i64) -> Result<String> {
        let key_id = derive_key_id(&secret);
        let mut agents = self.agents.write();
        let entry = agents.entry(agent_id.to_string()).or_default();

        if entry.revoked.iter().any(|r| r.key_id == key_id) {
            return Err(Error::key_revoked("Cannot register revoked key"));
        }

        entry.active = Some(ActiveKey {
            secret,
            meta: KeyMeta {
                registered_at_ms: now_ms,
                key_id: key_id.clone(),
                algorithm: "hmac-sha256".to_string(),
            },
        });
        Ok(key_id)
    }

    /// Revoke the current key for `agent_id` and register `new_secret` in
    /// its place.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::key_revoked`] from the inner `register` call.
    pub fn rotate(&self, agent_id: &str, new_secret: Vec<u8>, now_ms: i64) -> Result<String> {
        let _ = self.revoke_current(agent_id, "Key rotation", now_ms);
        self.register(agent_id, new_secret, now_ms)
    }

    /// Revoke `key_id` for `agent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::no_key`] if there is no active key, or
    /// [`Error::key_id_mismatch`] if `key_id` doesn't match the active key.
    pub fn revoke(&self, agent_id: &str, key_id: &str, reason: &str, now_ms: i64) -> Result<()> {
        let mut agents = self.agents.write();
        let entry = agents
            .get_mut(agent_id)
            .ok_or_else(|| Error::no_key(format!("no active key for agent {agent_id}")))?;

        let active = entry
            .active
            .as_ref()
            .ok_or_else(|| Error::no_key(format!("no active key for agent {agent_id}")))?;

        if active.meta.key_id != key_id {
            return Err(Error::key_id_mismatch(format!(
                "key {key_id} is not the active key for agent {agent_id}"
            )));
        }

        entry.active = None;
        entry.revoked.push(RevokedKey {
            key_id: key_id.to_string(),
            revoked_at_ms: now_ms,
            reason: reason.to_string(),
        });
        Ok(())
    }

    fn revoke_current(&self, agent_id: &str, reason: &str, now_ms: i64) -> Result<()> {
        let key_id = {
            let agents = self.agents.read();
            agents
                .get(agent_id)
                .and_then(|a| a.active.as_ref())
                .map(|a| a.meta.key_id.clone())
        };
        match key_id {
            Some(key_id) => self.revoke(agent_id, &key_id, reason, now_ms),
            None => Ok(()),
        }
    }

    /// Look up the active secret for `agent_id`.
    #[must_use]
    pub fn active_secret(&self, agent_id: &str) -> Option<Vec<u8>> {
        self.agents
            .read()
            .get(agent_id)
            .and_then(|a| a.active.as_ref())
            .map(|a| a.secret.clone())
    }

    /// Look up the active key's metadata for `agent_id`.
    #[must_use]
    pub fn active_meta(&self, agent_id: &str) -> Option<KeyMeta> {
        self.agents
            .read()
            .get(agent_id)
            .and_then(|a| a.active.as_ref())
            .map(|a| a.meta.clone())
    }

    /// Whether `key_id` is the active (non-revoked) key for `agent_id`.
    #[must_use]
    pub fn is_valid(&self, agent_id: &str, key_id: &str) -> bool {
        self.agents
            .read()
            .get(agent_id)
            .and_then(|a| a.active.as_ref())
            .is_some_and(|a| a.meta.key_id == key_id)
    }

    /// The revoked keys recorded for `agent_id`.
    #[must_use]
    pub fn get_revoked(&self, agent_id: &str) -> Vec<RevokedKey> {
        self.agents
            .read()
            .get(agent_id)
            .map(|a| a.revoked.clone())
            .unwrap_or_default()
    }

    /// All agent ids known to the registry.
    #[must_use]
    pub fn list_agents(&self) -> Vec<String> {
        self.agents.read().keys().cloned().collect()
    }

    /// Aggregate counts across all agents.
    #[must_use]
    pub fn stats(&self) -> KeyRegistryStats {
        let agents = self.agents.read();
        let mut stats = KeyRegistryStats::default();
        for agent in agents.values() {
            if agent.active.is_some() {
                stats.registered += 1;
            }
            stats.revoked += agent.revoked.len();
            if !agent.revoked.is_empty() {
                stats.agents_with_revoked += 1;
            }
        }
        stats
    }
}
