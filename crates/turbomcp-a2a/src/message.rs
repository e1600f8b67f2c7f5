//! Agent-to-agent message shapes: the unsigned base message and the
//! signature envelope attached once it has been signed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default `messageType` used when a message omits one.
pub const DEFAULT_MESSAGE_TYPE: &str = "request";

/// An agent-to-agent message before signing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub timestamp: i64,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Message {
    /// The effective `messageType`, defaulting to `"request"`.
    #[must_use]
    pub fn message_type(&self) -> &str {
        self.message_type.as_deref().unwrap_or(DEFAULT_MESSAGE_TYPE)
    }
}

/// The HMAC-SHA256 signature attached to a signed message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    pub algorithm: String,
    #[serde(rename = "keyId")]
    pub key_id: String,
    pub signature: String,
    pub timestamp: i64,
    pub nonce: String,
}

/// A [`Message`] plus its [`Signature`] and the canonical payload that was
/// signed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedMessage {
    #[serde(flatten)]
    pub message: Message,
    pub signature: Signature,
    #[serde(rename = "signedPayload")]
    pub signed_payload: String,
}
