//! Authorization-Code + PKCE OAuth client.

pub mod client;

pub use client::OAuthClient;
