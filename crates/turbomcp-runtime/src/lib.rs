//! # `TurboMCP` Runtime
//!
//! The multi-server coordination layer built on top of [`turbomcp_client`]'s
//! single-connection `Client`: it attaches to every configured server in
//! parallel, isolating one server's failure from the rest ([`manager`]),
//! fuses their tools/prompts/resources into one namespace with
//! collision-prefixing ([`registry`]), dispatches tool calls / prompt
//! renders / resource reads against the right server
//! ([`invocation`]), and turns `resources/subscribe` into a polled,
//! diff-aware event stream ([`subscription`]).
//!
//! Two subsystems sit orthogonally alongside connection management rather
//! than inside its lifecycle: authenticated agent-to-agent messaging
//! ([`a2a`], wrapping [`turbomcp_a2a`]) and an encrypted on-disk config
//! store (re-exported from [`turbomcp_vault`]). Neither is wired into
//! [`manager::ConnectionManager`] directly; callers compose them as needed.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use turbomcp_runtime::{CapabilityRegistry, ConnectionManager, ServerDescriptor, ServerKind, SubscriptionEngine};
//! use turbomcp_auth::CredentialStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(CapabilityRegistry::new());
//! let subscriptions = Arc::new(SubscriptionEngine::new());
//! let credentials = Arc::new(CredentialStore::with_default_path());
//! let manager = Arc::new(ConnectionManager::new(registry, subscriptions, credentials));
//!
//! let descriptor = ServerDescriptor {
//!     kind: ServerKind::Stdio {
//!         command: "mcp-server-filesystem".to_string(),
//!         args: vec!["/tmp".to_string()],
//!         env: Default::default(),
//!         cwd: None,
//!         stderr_mode: Default::default(),
//!     },
//!     disabled: false,
//!     tool_filter: None,
//!     oauth: None,
//! };
//! manager.connect("fs", descriptor).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms, clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod a2a;
pub mod descriptor;
pub mod invocation;
pub mod manager;
pub mod registry;
pub mod subscription;

pub use a2a::A2aChannel;
pub use descriptor::{ServerDescriptor, ServerDescriptorFile, ServerKind, ToolFilter};
pub use invocation::{InvocationEngine, ResourceReadOutcome, is_text_like_mime, resolve_template};
pub use manager::{ClientHandle, ConnectionManager, ServerStatus};
pub use registry::{CapabilityRegistry, Registered};
pub use subscription::{SubscriptionEngine, SubscriptionEvent, DEFAULT_POLL_INTERVAL};

/// Encrypted on-disk store for MCP-adjacent secrets (API keys, provider
/// credentials) that aren't OAuth tokens, re-exported for runtime consumers
/// that otherwise only depend on this crate.
pub use turbomcp_vault::{EncryptedConfigStore, ProviderEntry};
