//! # `TurboMCP` A2A
//!
//! Canonical-JSON signing and verification for agent-to-agent messages.
//! Each sender holds an HMAC-SHA256 secret registered under its agent id;
//! [`sign_message`] attaches a [`Signature`] and the canonical payload that
//! was signed, and [`verify_message`] runs the resulting [`SignedMessage`]
//! through seven ordered gates (age, future-timestamp, key lookup, key-id
//! match, revocation, constant-time MAC comparison, and re-canonicalization)
//! before trusting it.
//!
//! ## Architecture
//!
//! - `message` — [`Message`], [`Signature`], [`SignedMessage`] wire shapes
//! - `canonical` — deterministic canonical JSON serialization
//! - `registry` — [`KeyRegistry`]: per-agent key registration, rotation, revocation
//! - `sign` — [`sign_message`]
//! - `verify` — [`verify_message`], [`VerifyOutcome`], [`VerifyPolicy`]

pub mod canonical;
pub mod message;
pub mod registry;
pub mod sign;
pub mod verify;

pub use canonical::{canonicalize_message, canonicalize_value};
pub use message::{Message, Signature, SignedMessage};
pub use registry::{KeyMeta, KeyRegistry, KeyRegistryStats, RevokedKey, derive_key_id};
pub use sign::sign_message;
pub use verify::{VerifyOutcome, VerifyPolicy, verify_message};
