//! # `TurboMCP` Auth
//!
//! Authorization-Code + PKCE (RFC 7636) OAuth for MCP servers that require
//! it: authorization URL construction, a single-shot localhost callback
//! listener, code-for-token exchange, refresh, and a JSON credential store.
//!
//! ## Flow
//!
//! [`authenticate`] runs the whole dance for one server: it generates a
//! PKCE verifier/challenge and CSRF `state`, builds the authorization URL,
//! opens the user's browser (best-effort), binds `127.0.0.1:7777` and waits
//! up to five minutes for the redirect, validates `state`, and exchanges
//! the returned code for a token. [`refresh_access_token`] repeats the
//! token-endpoint half of that using a stored refresh token.
//!
//! [`CredentialStore`] persists the resulting [`OAuthCredential`]s as a
//! JSON array, one file per process, written with owner-only (`0600`)
//! permissions.
//!
//! ## Architecture
//!
//! - `config` — [`OAuthConfig`], the per-server flow configuration
//! - `types` — [`OAuthToken`] / [`OAuthCredential`] wire and storage shapes
//! - `pkce` — verifier/challenge/state generation
//! - `callback` — the localhost redirect listener
//! - `oauth2` — authorization URL building and token exchange
//! - `credentials` — the JSON credential store
//! - `flow` — [`authenticate`] / [`refresh_access_token`]

pub mod callback;
pub mod config;
pub mod credentials;
pub mod flow;
pub mod oauth2;
pub mod pkce;
pub mod types;

pub use config::OAuthConfig;
pub use credentials::CredentialStore;
pub use flow::{authenticate, refresh_access_token};
pub use oauth2::OAuthClient;
pub use pkce::PkceChallenge;
pub use types::{OAuthCredential, OAuthToken};
