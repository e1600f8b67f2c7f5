//! Picks and spawns the right transport for a configured server.
//!
//! Each server in the runtime's configuration is either launched as a child
//! process speaking newline-delimited JSON over stdio, or reached over
//! Streamable HTTP. This module is the single place that turns a server
//! descriptor into a connected [`Transport`] trait object.

use std::collections::HashMap;
use std::process::Stdio as StdStdio;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use turbomcp_http::{StreamableHttpClientConfig, StreamableHttpClientTransport};
use turbomcp_stdio::StdioTransport;
use turbomcp_transport_traits::{Transport, TransportError, TransportResult};

/// How a stdio child's stderr stream should be handled.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StderrMode {
    /// Inherit the parent process's stderr (the default).
    #[default]
    Inherit,
    /// Capture stderr on a pipe instead of surfacing it.
    Pipe,
    /// Discard stderr entirely.
    Ignore,
}

/// How to reach a single configured MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerTransportConfig {
    /// Launch the server as a child process and speak newline-delimited JSON
    /// over its stdin/stdout.
    Stdio {
        /// Executable to run.
        command: String,
        /// Arguments passed to the executable.
        #[serde(default)]
        args: Vec<String>,
        /// Extra environment variables to set for the child, as templates
        /// expanded against the parent process environment (`$VAR`,
        /// `${VAR}`, `${VAR:-default}`).
        #[serde(default)]
        env: HashMap<String, String>,
        /// Working directory for the child process.
        #[serde(default)]
        working_directory: Option<String>,
        /// How the child's stderr stream is handled.
        #[serde(default)]
        stderr: StderrMode,
    },
    /// Connect to a server exposed over Streamable HTTP.
    Http {
        /// Base URL of the server's MCP endpoint, e.g. `https://example.com`.
        url: String,
        /// Additional headers to send on every request (e.g. API keys).
        #[serde(default)]
        headers: HashMap<String, String>,
    },
}

/// Expand `$VAR`, `${VAR}`, and `${VAR:-default}` references in `template`
/// against the parent process environment. An unset `$VAR`/`${VAR}`
/// resolves to the empty string; `${VAR:-default}` resolves to `default`
/// in that case instead.
#[must_use]
pub fn expand_env_template(template: &str) -> String {
    let chars: Vec<char> = template.chars().collect();
    let mut result = String::with_capacity(template.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '$' || i + 1 >= chars.len() {
            result.push(chars[i]);
            i += 1;
            continue;
        }

        if chars[i + 1] == '{' {
            if let Some(close) = chars[i + 2..].iter().position(|&c| c == '}') {
                let inner: String = chars[i + 2..i + 2 + close].iter().collect();
                result.push_str(&resolve_braced(&inner));
                i += 2 + close + 1;
                continue;
            }
        } else if chars[i + 1].is_alphabetic() || chars[i + 1] == '_' {
            let start = i + 1;
            let mut end = start;
            while end < chars.len() && (chars[end].is_alphanumeric() || chars[end] == '_') {
                end += 1;
            }
            let name: String = chars[start..end].iter().collect();
            result.push_str(&std::env::var(&name).unwrap_or_default());
            i = end;
            continue;
        }

        result.push(chars[i]);
        i += 1;
    }

    result
}

fn resolve_braced(inner: &str) -> String {
    match inner.split_once(":-") {
        Some((name, default)) => std::env::var(name).unwrap_or_else(|_| default.to_string()),
        None => std::env::var(inner).unwrap_or_default(),
    }
}

fn stdio_from_mode(mode: StderrMode) -> StdStdio {
    match mode {
        StderrMode::Inherit => StdStdio::inherit(),
        StderrMode::Pipe => StdStdio::piped(),
        StderrMode::Ignore => StdStdio::null(),
    }
}

/// Builds the transport for `config` and, for stdio servers, spawns the
/// child process. The returned transport has not yet called `connect()`.
///
/// # Errors
///
/// Returns [`TransportError::ConnectionFailed`] if a stdio server's process
/// fails to spawn.
pub async fn build_transport(config: &ServerTransportConfig) -> TransportResult<Box<dyn Transport>> {
    match config {
        ServerTransportConfig::Stdio { command, args, env, working_directory, stderr } => {
            let resolved_env: HashMap<String, String> = env
                .iter()
                .map(|(k, v)| (k.clone(), expand_env_template(v)))
                .collect();

            let mut cmd = Command::new(command);
            cmd.args(args)
                .envs(&resolved_env)
                .stdin(StdStdio::piped())
                .stdout(StdStdio::piped())
                .stderr(stdio_from_mode(*stderr))
                .kill_on_drop(true);
            if let Some(dir) = working_directory {
                cmd.current_dir(dir);
            }

            let mut child = cmd
                .spawn()
                .map_err(|e| TransportError::ConnectionFailed(format!("failed to spawn `{command}`: {e}")))?;

            let transport = StdioTransport::from_child(&mut child)?;
            Ok(Box::new(transport))
        }
        ServerTransportConfig::Http { url, headers } => {
            let config = StreamableHttpClientConfig {
                base_url: url.clone(),
                headers: headers.clone(),
                ..Default::default()
            };
            Ok(Box::new(StreamableHttpClientTransport::new(config)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdio_config_round_trips_through_json() {
        let config = ServerTransportConfig::Stdio {
            command: "node".to_string(),
            args: vec!["server.js".to_string()],
            env: HashMap::new(),
            working_directory: None,
            stderr: StderrMode::Inherit,
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: ServerTransportConfig = serde_json::from_str(&json).unwrap();
        match parsed {
            ServerTransportConfig::Stdio { command, args, .. } => {
                assert_eq!(command, "node");
                assert_eq!(args, vec!["server.js".to_string()]);
            }
            ServerTransportConfig::Http { .. } => panic!("expected stdio variant"),
        }
    }

    #[tokio::test]
    async fn stdio_transport_spawns_child_process() {
        let config = ServerTransportConfig::Stdio {
            command: "cat".to_string(),
            args: vec![],
            env: HashMap::new(),
            working_directory: None,
            stderr: StderrMode::Inherit,
        };

        let transport = build_transport(&config).await.unwrap();
        assert_eq!(transport.transport_type(), turbomcp_transport_traits::TransportType::Stdio);
    }

    #[tokio::test]
    async fn stdio_transport_reports_spawn_failure() {
        let config = ServerTransportConfig::Stdio {
            command: "/no/such/binary-turbomcp-test".to_string(),
            args: vec![],
            env: HashMap::new(),
            working_directory: None,
            stderr: StderrMode::Inherit,
        };

        let err = build_transport(&config).await.unwrap_err();
        assert!(matches!(err, TransportError::ConnectionFailed(_)));
    }

    #[test]
    fn http_transport_is_built_from_url() {
        let config = ServerTransportConfig::Http {
            url: "https://example.com".to_string(),
            headers: HashMap::new(),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"type\":\"http\""));
    }

    #[test]
    fn expand_env_template_substitutes_braced_and_bare_vars() {
        // SAFETY: test runs single-threaded within this process's env mutation.
        unsafe { std::env::set_var("TURBOMCP_FACTORY_TEST_VAR", "value") };
        assert_eq!(expand_env_template("${TURBOMCP_FACTORY_TEST_VAR}"), "value");
        assert_eq!(expand_env_template("$TURBOMCP_FACTORY_TEST_VAR"), "value");
        assert_eq!(
            expand_env_template("prefix-$TURBOMCP_FACTORY_TEST_VAR-suffix"),
            "prefix-value-suffix"
        );
        unsafe { std::env::remove_var("TURBOMCP_FACTORY_TEST_VAR") };
    }

    #[test]
    fn expand_env_template_missing_var_is_empty() {
        assert_eq!(expand_env_template("${TURBOMCP_FACTORY_DEFINITELY_UNSET}"), "");
    }

    #[test]
    fn expand_env_template_honors_default_fallback() {
        assert_eq!(
            expand_env_template("${TURBOMCP_FACTORY_DEFINITELY_UNSET:-fallback}"),
            "fallback"
        );
    }
}
