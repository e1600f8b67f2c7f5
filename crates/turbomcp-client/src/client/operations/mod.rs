//! Client-initiated MCP operations, grouped by area:
//!
//! - `tools`: list and call tools
//! - `resources`: list, read, and (un)subscribe to resources
//! - `prompts`: list and get prompts
//! - `connection`: liveness (`ping`) and log-level control
//!
//! `roots/list` is a server-to-client request, not a client operation, and
//! isn't modeled here.

pub mod connection;
pub mod prompts;
pub mod resources;
pub mod tools;
