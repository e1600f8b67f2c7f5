//! Convenient imports for building applications with the `TurboMCP` client.
//!
//! # Example
//!
//! ```rust,no_run
//! use turbomcp_client::prelude::*;
//! use turbomcp_transport::StdioTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut client = ClientBuilder::new()
//!         .with_tools(true)
//!         .build(StdioTransport::new("mcp-server-filesystem", Vec::<String>::new()));
//!     client.initialize("my-app").await?;
//!
//!     let tools = client.list_tools().await?;
//!     println!("Found {} tools", tools.len());
//!
//!     Ok(())
//! }
//! ```

pub use crate::{Client, ClientBuilder, ClientCapabilities, ConnectionConfig, InitializeResult};

pub use turbomcp_core::{Error, Result};

pub use turbomcp_core::types::{
    CallToolResult, Content, EmptyResult, GetPromptResult, Implementation, LogLevel, Prompt,
    ReadResourceResult, Resource, ResourceTemplate, ServerCapabilities, Tool,
};

pub use turbomcp_transport::Transport;
