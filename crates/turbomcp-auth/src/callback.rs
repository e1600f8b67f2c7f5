//! Single-shot localhost HTTP listener for the OAuth redirect.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::timeout;
use turbomcp_core::{Error, Result};

use crate::config::CALLBACK_PATH;

/// Hard wall-clock limit on the whole authorization flow.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// The query parameters the authorization server redirected back with.
#[derive(Debug, Clone)]
pub enum CallbackOutcome {
    /// `?code=<c>&state=<s>`
    Authorized { code: String, state: String },
    /// `?error=<code>&error_description=<d>`
    Denied {
        error: String,
        description: Option<String>,
    },
}

const SUCCESS_BODY: &str =
    "<html><body><h3>Authentication complete.</h3>You may close this window.</body></html>";

/// Bind `127.0.0.1:port`, accept exactly one request to [`CALLBACK_PATH`],
/// and return its query parameters. Enforces [`CALLBACK_TIMEOUT`] for the
/// whole wait (bind + accept + read).
pub async fn await_callback(port: u16) -> Result<CallbackOutcome> {
    timeout(CALLBACK_TIMEOUT, await_callback_inner(port))
        .await
        .map_err(|_| Error::timeout("OAuth callback timed out after 5 minutes"))?
}

async fn await_callback_inner(port: u16) -> Result<CallbackOutcome> {
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .map_err(|e| Error::transport_faulted(format!("failed to bind callback port: {e}")))?;

    loop {
        let (mut stream, _) = listener
            .accept()
            .await
            .map_err(|e| Error::transport_faulted(format!("callback accept failed: {e}")))?;

        let request_line = read_request_line(&mut stream).await?;
        let Some(query) = parse_callback_query(&request_line) else {
            // Not our path (e.g. a stray favicon request); keep listening.
            let _ = write_response(&mut stream, 404, "Not Found").await;
            continue;
        };

        let _ = write_response(&mut stream, 200, SUCCESS_BODY).await;
        return Ok(query_to_outcome(&query));
    }
}

async fn read_request_line(stream: &mut tokio::net::TcpStream) -> Result<String> {
    let mut buf = Vec::with_capacity(512);
    let mut byte = [0u8; 1];
    loop {
        let n = stream
            .read(&mut byte)
            .await
            .map_err(|e| Error::transport_faulted(format!("callback read failed: {e}")))?;
        if n == 0 || byte[0] == b'\n' {
            break;
        }
        buf.push(byte[0]);
        if buf.len() > 8192 {
            return Err(Error::invalid_callback("callback request line too long"));
        }
    }
    Ok(String::from_utf8_lossy(&buf).trim().to_string())
}

async fn write_response(
    stream: &mut tokio::net::TcpStream,
    status: u16,
    body: &str,
) -> std::io::Result<()> {
    let reason = if status == 200 { "OK" } else { "Not Found" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.flush().await
}

/// Parse `GET /oauth/callback?code=...&state=... HTTP/1.1` into its query
/// string, returning `None` if the path doesn't match [`CALLBACK_PATH`].
fn parse_callback_query(request_line: &str) -> Option<String> {
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?;
    if method != "GET" {
        return None;
    }
    let target = parts.next()?;
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    if path != CALLBACK_PATH {
        return None;
    }
    Some(query.to_string())
}

fn query_to_outcome(query: &str) -> CallbackOutcome {
    let params: std::collections::HashMap<String, String> = url::form_urlencoded::parse(
        query.as_bytes(),
    )
    .into_owned()
    .collect();

    if let Some(error) = params.get("error") {
        return CallbackOutcome::Denied {
            error: error.clone(),
            description: params.get("error_description").cloned(),
        };
    }

    CallbackOutcome::Authorized {
        code: params.get("code").cloned().unwrap_or_default(),
        state: params.get("state").cloned().unwrap_or_default(),
    }
}

/// Best-effort attempt to open the system browser. Absence of a working
/// opener is non-fatal; the user can still paste the URL manually.
pub fn open_browser(url: &str) {
    #[cfg(target_os = "macos")]
    let result = std::process::Command::new("open").arg(url).status();
    #[cfg(target_os = "linux")]
    let result = std::process::Command::new("xdg-open").arg(url).status();
    #[cfg(target_os = "windows")]
    let result = std::process::Command::new("cmd")
        .args(["/C", "start", "", url])
        .status();
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    let result: std::io::Result<std::process::ExitStatus> =
        Err(std::io::Error::other("no known browser opener for this platform"));

    if let Err(e) = result {
        tracing::debug!("could not open browser automatically: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_authorized_query() {
        let query = "code=abc123&state=xyz789";
        match query_to_outcome(query) {
            CallbackOutcome::Authorized { code, state } => {
                assert_eq!(code, "abc123");
                assert_eq!(state, "xyz789");
            }
            CallbackOutcome::Denied { .. } => panic!("expected Authorized"),
        }
    }

    #[test]
    fn parses_denied_query() {
        let query = "error=access_denied&error_description=user+said+no";
        match query_to_outcome(query) {
            CallbackOutcome::Denied { error, description } => {
                assert_eq!(error, "access_denied");
                assert_eq!(description.as_deref(), Some("user said no"));
            }
            CallbackOutcome::Authorized { .. } => panic!("expected Denied"),
        }
    }

    #[test]
    fn rejects_non_callback_paths() {
        assert!(parse_callback_query("GET /favicon.ico HTTP/1.1").is_none());
    }

    #[test]
    fn accepts_callback_path_with_query() {
        let query = parse_callback_query("GET /oauth/callback?code=a&state=b HTTP/1.1");
        assert_eq!(query.as_deref(), Some("code=a&state=b"));
    }
}
