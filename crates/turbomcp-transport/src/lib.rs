//! # TurboMCP Transport
//!
//! Picks the right wire transport for each configured MCP server and spawns
//! it. A server is either a child process speaking newline-delimited JSON
//! over stdio, or a Streamable HTTP endpoint; this crate is the one place
//! that turns a server's configuration into a connected [`Transport`] trait
//! object, without the rest of the runtime needing to know which kind it got.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use turbomcp_transport::{ServerTransportConfig, build_transport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerTransportConfig::Stdio {
//!     command: "mcp-server-filesystem".to_string(),
//!     args: vec!["/tmp".to_string()],
//!     env: Default::default(),
//!     working_directory: None,
//! };
//!
//! let transport = build_transport(&config).await?;
//! transport.connect().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms, clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod factory;
mod shared;

pub use factory::{ServerTransportConfig, StderrMode, build_transport, expand_env_template};
pub use shared::SharedTransport;

// Re-export the trait surface so downstream crates only need to depend on
// this crate and the two transport implementations it picks between.
pub use turbomcp_transport_traits::{
    Transport, TransportCapabilities, TransportConfig, TransportError, TransportEvent,
    TransportMessage, TransportMetrics, TransportResult, TransportState, TransportType,
};
pub use turbomcp_stdio::StdioTransport;
pub use turbomcp_http::{StreamableHttpClientConfig, StreamableHttpClientTransport};
