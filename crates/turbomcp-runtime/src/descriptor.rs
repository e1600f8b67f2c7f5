//! A configured MCP server: how to reach it, whether it's enabled, and
//! which of its tools the runtime should register.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use turbomcp_auth::OAuthConfig;
use turbomcp_transport::{ServerTransportConfig, StderrMode};

/// How to connect to one configured MCP server, plus the runtime-level
/// policy (enable/disable, tool filtering, OAuth) layered on top of the
/// bare connection recipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerDescriptor {
    /// The connection recipe itself.
    #[serde(flatten)]
    pub kind: ServerKind,
    /// Skip this server entirely; `connect` fails fast with `Disabled`.
    #[serde(default)]
    pub disabled: bool,
    /// Restrict which of the server's tools get registered.
    #[serde(default, rename = "toolFilter")]
    pub tool_filter: Option<ToolFilter>,
    /// Authorization-Code + PKCE configuration, for servers that require it.
    #[serde(default)]
    pub oauth: Option<OAuthConfig>,
}

/// The bare connection recipe: stdio child process or Streamable HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ServerKind {
    /// Launch a child process speaking newline-delimited JSON over stdio.
    Stdio {
        /// Executable to run.
        command: String,
        /// Arguments passed to the executable.
        #[serde(default)]
        args: Vec<String>,
        /// Extra environment variables, as `$VAR`/`${VAR}`/`${VAR:-default}` templates.
        #[serde(default)]
        env: HashMap<String, String>,
        /// Working directory for the child process.
        #[serde(default)]
        cwd: Option<String>,
        /// How the child's stderr stream is handled.
        #[serde(default, rename = "stderrMode")]
        stderr_mode: StderrMode,
    },
    /// Connect to a server exposed over Streamable HTTP.
    Http {
        /// Base URL of the server's MCP endpoint.
        url: String,
        /// Additional headers to send on every request.
        #[serde(default)]
        headers: HashMap<String, String>,
        /// Per-request timeout in milliseconds.
        #[serde(default, rename = "timeoutMs")]
        timeout_ms: Option<u64>,
    },
}

impl ServerDescriptor {
    /// Build the bare transport-layer config this descriptor describes,
    /// folding in `extra_headers` (e.g. a freshly-minted `Authorization`
    /// bearer header from the OAuth subsystem).
    #[must_use]
    pub fn to_transport_config(&self, extra_headers: &HashMap<String, String>) -> ServerTransportConfig {
        match &self.kind {
            ServerKind::Stdio {
                command,
                args,
                env,
                cwd,
                stderr_mode,
            } => ServerTransportConfig::Stdio {
                command: command.clone(),
                args: args.clone(),
                env: env.clone(),
                working_directory: cwd.clone(),
                stderr: *stderr_mode,
            },
            ServerKind::Http { url, headers, .. } => {
                let mut merged = headers.clone();
                merged.extend(extra_headers.clone());
                ServerTransportConfig::Http {
                    url: url.clone(),
                    headers: merged,
                }
            }
        }
    }

    /// Whether this descriptor's transport is HTTP (the only kind OAuth
    /// bearer tokens are injected into).
    #[must_use]
    pub fn is_http(&self) -> bool {
        matches!(self.kind, ServerKind::Http { .. })
    }
}

/// Which of a server's tools to register: `include` beats `exclude`; an
/// empty filter (both `None`) admits everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolFilter {
    /// If set, only these tool names are registered.
    #[serde(default)]
    pub include: Option<Vec<String>>,
    /// If set (and `include` is not), these tool names are skipped.
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
}

impl ToolFilter {
    /// Whether `name` passes this filter.
    #[must_use]
    pub fn admits(&self, name: &str) -> bool {
        if let Some(include) = &self.include {
            return include.iter().any(|n| n == name);
        }
        if let Some(exclude) = &self.exclude {
            return !exclude.iter().any(|n| n == name);
        }
        true
    }
}

/// A descriptor file's top-level shape: `{ "mcpServers": { name: descriptor } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerDescriptorFile {
    /// Configured servers, keyed by name.
    #[serde(rename = "mcpServers")]
    pub mcp_servers: HashMap<String, ServerDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_beats_exclude() {
        let filter = ToolFilter {
            include: Some(vec!["a".into()]),
            exclude: Some(vec!["a".into()]),
        };
        assert!(filter.admits("a"));
        assert!(!filter.admits("b"));
    }

    #[test]
    fn empty_filter_admits_all() {
        let filter = ToolFilter::default();
        assert!(filter.admits("anything"));
    }

    #[test]
    fn exclude_only_blocks_named_tools() {
        let filter = ToolFilter {
            include: None,
            exclude: Some(vec!["dangerous".into()]),
        };
        assert!(filter.admits("safe"));
        assert!(!filter.admits("dangerous"));
    }

    #[test]
    fn stdio_descriptor_round_trips_through_json() {
        let json = serde_json::json!({
            "kind": "stdio",
            "command": "node",
            "args": ["server.js"],
        });
        let descriptor: ServerDescriptor = serde_json::from_value(json).unwrap();
        assert!(!descriptor.disabled);
        assert!(!descriptor.is_http());
        match descriptor.kind {
            ServerKind::Stdio { command, .. } => assert_eq!(command, "node"),
            ServerKind::Http { .. } => panic!("expected stdio"),
        }
    }

    #[test]
    fn http_descriptor_merges_extra_headers_without_mutating_itself() {
        let descriptor = ServerDescriptor {
            kind: ServerKind::Http {
                url: "https://example.com".into(),
                headers: HashMap::from([("X-Api-Key".to_string(), "k".to_string())]),
                timeout_ms: None,
            },
            disabled: false,
            tool_filter: None,
            oauth: None,
        };
        let mut extra = HashMap::new();
        extra.insert("Authorization".to_string(), "Bearer tok".to_string());

        let config = descriptor.to_transport_config(&extra);
        match config {
            ServerTransportConfig::Http { headers, .. } => {
                assert_eq!(headers.get("X-Api-Key").map(String::as_str), Some("k"));
                assert_eq!(headers.get("Authorization").map(String::as_str), Some("Bearer tok"));
            }
            ServerTransportConfig::Stdio { .. } => panic!("expected http"),
        }
        assert!(descriptor.is_http());
    }

    #[test]
    fn descriptor_file_parses_multiple_servers() {
        let json = serde_json::json!({
            "mcpServers": {
                "fs": { "kind": "stdio", "command": "mcp-fs" },
                "api": { "kind": "http", "url": "https://example.com" },
            }
        });
        let file: ServerDescriptorFile = serde_json::from_value(json).unwrap();
        assert_eq!(file.mcp_servers.len(), 2);
    }
}
