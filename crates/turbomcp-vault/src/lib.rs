//! # `TurboMCP` Vault
//!
//! A file-backed, AES-256-GCM encrypted store for provider secrets
//! (`providerName -> secret | structuredConfig`). Entries are persisted as
//! `ivHex:authTagHex:ciphertextHex`, re-encrypted under a fresh IV on every
//! write; the key is derived from a passphrase via `scrypt`.
//!
//! ## Architecture
//!
//! - `cipher` — [`cipher::encrypt`] / [`cipher::decrypt`] and key derivation
//! - `schema` — minimal structural validation for provider entries
//! - `store` — [`EncryptedConfigStore`], the file-backed map

pub mod cipher;
pub mod schema;
pub mod store;

pub use store::{EncryptedConfigStore, ProviderEntry};
