//! Seven-gate verification of a [`SignedMessage`].

use serde_json::json;
use subtle::ConstantTimeEq;

use crate::canonical::canonicalize_message;
use crate::message::SignedMessage;
use crate::registry::{KeyRegistry, derive_key_id, hmac_hex};

/// Default maximum age of a signature: 5 minutes.
pub const DEFAULT_MAX_AGE_MS: i64 = 5 * 60 * 1000;
/// Default allowed clock skew into the future: 60 seconds.
pub const DEFAULT_SKEW_MS: i64 = 60 * 1000;

/// Verification policy: how old a signature may be, and how far into the
/// future its timestamp may sit before it's rejected as not-yet-valid.
#[derive(Debug, Clone, Copy)]
pub struct VerifyPolicy {
    pub max_age_ms: i64,
    pub skew_ms: i64,
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        Self {
            max_age_ms: DEFAULT_MAX_AGE_MS,
            skew_ms: DEFAULT_SKEW_MS,
        }
    }
}

/// The result of verifying a [`SignedMessage`].
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    pub valid: bool,
    pub error: Option<String>,
    pub details: Option<String>,
}

impl VerifyOutcome {
    fn ok() -> Self {
        Self {
            valid: true,
            error: None,
            details: None,
        }
    }

    fn fail(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
            details: Some(details.into()),
        }
    }
}

/// Verify `signed` against the agent secrets held in `registry`.
///
/// Runs, in order: age check, future-timestamp check, key lookup, key-id
/// match, revocation check, constant-time MAC comparison, and payload
/// integrity (re-canonicalization). The first failing gate short-circuits
/// the remaining ones.
#[must_use]
pub fn verify_message(
    registry: &KeyRegistry,
    signed: &SignedMessage,
    now_ms: i64,
    policy: VerifyPolicy,
) -> VerifyOutcome {
    let sig = &signed.signature;

    // 1. Age check.
    if now_ms - sig.timestamp > policy.max_age_ms {
        return VerifyOutcome::fail(
            "signature expired",
            format!(
                "signature timestamp {} is older than the {}ms maximum age",
                sig.timestamp, policy.max_age_ms
            ),
        );
    }

    // 2. Future check.
    if sig.timestamp > now_ms + policy.skew_ms {
        return VerifyOutcome::fail(
            "signature timestamp in the future",
            format!(
                "signature timestamp {} is beyond the {}ms allowed skew",
                sig.timestamp, policy.skew_ms
            ),
        );
    }

    // 3. Key lookup.
    let Some(secret) = registry.active_secret(&signed.message.from) else {
        return VerifyOutcome::fail(
            "no key registered",
            format!("no active key registered for agent {}", signed.message.from),
        );
    };

    // 4. Key id match.
    let expected_key_id = derive_key_id(&secret);
    if expected_key_id != sig.key_id {
        return VerifyOutcome::fail(
            "key id mismatch",
            format!(
                "signature key id {} does not match the active key for {}",
                sig.key_id, signed.message.from
            ),
        );
    }

    // 5. Revocation check.
    if !registry.is_valid(&signed.message.from, &sig.key_id) {
        return VerifyOutcome::fail(
            "key revoked",
            format!("key {} for agent {} has been revoked", sig.key_id, signed.message.from),
        );
    }

    // 6. MAC equality, constant-time.
    let signing_input = json!({
        "payload": signed.signed_payload,
        "timestamp": sig.timestamp,
        "nonce": sig.nonce,
    })
    .to_string();
    let expected_mac = hmac_hex(&secret, signing_input.as_bytes());

    let macs_match: bool = expected_mac.as_bytes().ct_eq(sig.signature.as_bytes()).into();
    if !macs_match {
        return VerifyOutcome::fail("signature invalid", "MAC does not match the signed payload");
    }

    // 7. Integrity: re-canonicalize and compare against the signed payload.
    let recomputed = canonicalize_message(&signed.message);
    if recomputed != signed.signed_payload {
        return VerifyOutcome::fail(
            "message modified after signing",
            "the message no longer canonicalizes to its signed payload",
        );
    }

    VerifyOutcome::ok()
}
