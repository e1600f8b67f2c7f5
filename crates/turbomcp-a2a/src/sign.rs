//! HMAC-SHA256 signing of agent-to-agent messages.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use serde_json::json;

use turbomcp_core::{Error, Result};

use crate::canonical::canonicalize_message;
use crate::message::{Message, Signature, SignedMessage};
use crate::registry::{KeyRegistry, hmac_hex};

const ALGORITHM: &str = "hmac-sha256";

/// Sign `message` on behalf of `message.from`, using the registry's
/// currently active secret for that agent.
///
/// Computes `HMAC-SHA256(secret, JSON.stringify({payload, timestamp, nonce}))`
/// where `payload` is the canonical JSON of `message`, `timestamp` is
/// `now_ms`, and `nonce` is 32 random bytes, base64-encoded.
///
/// # Errors
///
/// Returns [`Error::no_key`] if `message.from` has no active key.
pub fn sign_message(registry: &KeyRegistry, message: Message, now_ms: i64) -> Result<SignedMessage> {
    let secret = registry
        .active_secret(&message.from)
        .ok_or_else(|| Error::no_key(format!("no active key for agent {}", message.from)))?;
    let key_id = registry
        .active_meta(&message.from)
        .map(|meta| meta.key_id)
        .unwrap_or_default();

    let payload = canonicalize_message(&message);
    let nonce = random_nonce();

    let signing_input = json!({
        "payload": payload,
        "timestamp": now_ms,
        "nonce": nonce,
    })
    .to_string();

    let signature_hex = hmac_hex(&secret, signing_input.as_bytes());

    Ok(SignedMessage {
        message,
        signature: Signature {
            algorithm: ALGORITHM.to_string(),
            key_id,
            signature: signature_hex,
            timestamp: now_ms,
            nonce,
        },
        signed_payload: payload,
    })
}

fn random_nonce() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message() -> Message {
        Message {
            message_type: None,
            from: "agent-a".to_string(),
            to: "agent-b".to_string(),
            id: None,
            timestamp: 1_000,
            method: "ping".to_string(),
            params: None,
        }
    }

    #[test]
    fn sign_message_fails_without_a_registered_key() {
        let registry = KeyRegistry::new();
        let err = sign_message(&registry, sample_message(), 2_000).unwrap_err();
        assert!(err.to_string().contains("no active key"));
    }

    #[test]
    fn sign_message_uses_active_key_id_and_algorithm() {
        let registry = KeyRegistry::new();
        let key_id = registry.register("agent-a", b"secret".to_vec(), 1_000).unwrap();

        let signed = sign_message(&registry, sample_message(), 2_000).unwrap();

        assert_eq!(signed.signature.key_id, key_id);
        assert_eq!(signed.signature.algorithm, "hmac-sha256");
        assert_eq!(signed.signature.timestamp, 2_000);
        assert_eq!(signed.signed_payload, canonicalize_message(&sample_message()));
    }

    #[test]
    fn successive_signatures_use_distinct_nonces() {
        let registry = KeyRegistry::new();
        registry.register("agent-a", b"secret".to_vec(), 1_000).unwrap();

        let first = sign_message(&registry, sample_message(), 2_000).unwrap();
        let second = sign_message(&registry, sample_message(), 2_000).unwrap();

        assert_ne!(first.signature.nonce, second.signature.nonce);
        assert_ne!(first.signature.signature, second.signature.signature);
    }
}
