//! Executes tools, renders prompts, and reads resources against the server
//! that owns them, resolving URI templates along the way.

use std::borrow::Cow;
use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::Value;

use turbomcp_core::Error;
use turbomcp_core::types::{CallToolResult, GetPromptResult};

use crate::manager::ConnectionManager;
use crate::registry::CapabilityRegistry;

/// The first content block of a resource read, with its MIME type
/// classified and binary blobs decoded to text where that's meaningful.
#[derive(Debug, Clone)]
pub struct ResourceReadOutcome {
    /// The content's MIME type, if the server reported one.
    pub mime_type: Option<String>,
    /// Text content: either the server's own `text` field, or a decoded
    /// `blob` when the MIME type is text-like.
    pub text: Option<String>,
    /// The raw base64 `blob`, kept as-is when the MIME type is binary-like.
    pub blob: Option<String>,
    /// A human-readable size (`"1.2 KB"`) computed from the decoded content length.
    pub human_size: Option<String>,
}

/// Whether `mime` should be treated as text (and so have its `blob` decoded)
/// rather than left as an opaque binary blob.
#[must_use]
pub fn is_text_like_mime(mime: &str) -> bool {
    let mime = mime.to_ascii_lowercase();
    mime.starts_with("text/")
        || mime == "application/json"
        || mime == "application/xml"
        || mime == "application/javascript"
        || mime.ends_with("+xml")
        || mime.ends_with("+json")
}

fn human_size(bytes: usize) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[unit])
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

/// Characters `encodeURIComponent` leaves unescaped; everything else in
/// [`NON_ALPHANUMERIC`] gets percent-encoded.
const URI_COMPONENT_UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Runs tool/prompt/resource operations against a specific connected server,
/// using the fused registry to resolve tool names and validate inputs.
pub struct InvocationEngine<'a> {
    manager: &'a ConnectionManager,
    registry: &'a CapabilityRegistry,
}

impl<'a> InvocationEngine<'a> {
    /// Build an engine over the given manager and registry.
    #[must_use]
    pub fn new(manager: &'a ConnectionManager, registry: &'a CapabilityRegistry) -> Self {
        Self { manager, registry }
    }

    /// Call `name` on `server_name` with `arguments`. Validation failures
    /// (unknown tool) are a hard error; failures reported by the tool
    /// itself come back as `Ok` with `CallToolResult::is_error == Some(true)`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ValidationError`](turbomcp_core::ErrorKind::ValidationError) if
    /// `server_name` has no tool named `name`, or [`ErrorKind::NotConnected`](turbomcp_core::ErrorKind::NotConnected)
    /// if `server_name` is not connected.
    pub async fn execute_tool(
        &self,
        server_name: &str,
        name: &str,
        arguments: Option<HashMap<String, Value>>,
    ) -> Result<CallToolResult, Error> {
        if self.registry.tool_for(server_name, name).is_none() {
            return Err(Error::validation(vec![format!("{server_name}::{name}")]));
        }

        let client = self.manager.client_handle(server_name)?;
        let guard = client.read().await;
        match guard.call_tool(name, arguments).await {
            Ok(result) => Ok(result),
            Err(err) => Ok(CallToolResult::error(err.to_string())),
        }
    }

    /// Render `name` on `server_name` with `arguments`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::PromptNotFound`](turbomcp_core::ErrorKind::PromptNotFound) if
    /// `server_name` has no prompt named `name`, or propagates the server's error otherwise.
    pub async fn get_prompt(
        &self,
        server_name: &str,
        name: &str,
        arguments: Option<HashMap<String, String>>,
    ) -> Result<GetPromptResult, Error> {
        let owns_prompt = self
            .registry
            .all_prompts()
            .into_iter()
            .any(|p| p.server_name == server_name && p.original_name == name);
        if !owns_prompt {
            return Err(Error::prompt_not_found(format!("{server_name}::{name}")));
        }

        let client = self.manager.client_handle(server_name)?;
        let guard = client.read().await;
        guard.get_prompt(name, arguments).await
    }

    /// Read `uri` from `server_name`, returning its first content block with
    /// the MIME type classified, a text-like `blob` decoded, and a
    /// human-readable size computed. Rejects MIME types the caller didn't
    /// ask for when `accepted_mime_types` is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ResourceNotFound`](turbomcp_core::ErrorKind::ResourceNotFound) if
    /// the server has no such resource or returned no content, or
    /// [`ErrorKind::UnsupportedMime`](turbomcp_core::ErrorKind::UnsupportedMime)
    /// if its MIME type isn't in `accepted_mime_types`.
    pub async fn read_resource(
        &self,
        server_name: &str,
        uri: &str,
        accepted_mime_types: &[&str],
    ) -> Result<ResourceReadOutcome, Error> {
        let client = self.manager.client_handle(server_name)?;
        let guard = client.read().await;
        let result = guard
            .read_resource(uri)
            .await
            .map_err(|e| Error::resource_not_found(format!("{server_name}::{uri}: {e}")))?;

        let content = result
            .contents
            .into_iter()
            .next()
            .ok_or_else(|| Error::resource_not_found(format!("{server_name}::{uri}: no content returned")))?;

        let mime = content
            .mime_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());
        if !accepted_mime_types.is_empty() && !accepted_mime_types.contains(&mime.as_str()) {
            return Err(Error::unsupported_mime(format!(
                "{uri} has mime type `{mime}`, expected one of {accepted_mime_types:?}"
            )));
        }

        let text_like = is_text_like_mime(&mime);
        let decoded_len = content
            .blob
            .as_deref()
            .and_then(|b| BASE64.decode(b).ok())
            .map(|bytes| bytes.len());

        let (text, blob) = match (&content.text, &content.blob) {
            (Some(text), _) => (Some(text.clone()), content.blob.clone()),
            (None, Some(blob)) if text_like => {
                let decoded = BASE64
                    .decode(blob)
                    .map_err(|e| Error::schema_invalid(format!("{uri}: invalid base64 blob: {e}")))?;
                let text = String::from_utf8(decoded)
                    .map_err(|e| Error::schema_invalid(format!("{uri}: blob is not valid UTF-8 text: {e}")))?;
                (Some(text), None)
            }
            (None, blob) => (None, blob.clone()),
        };

        let size = decoded_len.or_else(|| text.as_ref().map(String::len));

        Ok(ResourceReadOutcome {
            mime_type: Some(mime),
            text,
            blob,
            human_size: size.map(human_size),
        })
    }
}

/// Expand `{placeholder}` segments in a URI template against `values`,
/// percent-encoding each substituted value the way `encodeURIComponent` does.
/// A placeholder with no matching entry in `values` is left in the output
/// verbatim (including its braces) rather than erroring.
#[must_use]
pub fn resolve_template(template: &str, values: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(template.len());
    let chars: Vec<char> = template.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == '{' {
            let Some(close) = chars[i + 1..].iter().position(|&c| c == '}') else {
                result.push(chars[i]);
                i += 1;
                continue;
            };
            let placeholder: String = chars[i + 1..i + 1 + close].iter().collect();
            match values.get(&placeholder) {
                Some(value) => {
                    let encoded: Cow<'_, str> = utf8_percent_encode(value, URI_COMPONENT_UNRESERVED).into();
                    result.push_str(&encoded);
                }
                None => {
                    result.push('{');
                    result.push_str(&placeholder);
                    result.push('}');
                }
            }
            i += close + 2;
        } else {
            result.push(chars[i]);
            i += 1;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_template_percent_encodes_like_encode_uri_component() {
        let mut values = HashMap::new();
        values.insert("user".to_string(), "a b".to_string());
        values.insert("doc".to_string(), "x/y".to_string());

        let resolved = resolve_template("file:///u/{user}/d/{doc}", &values);
        assert_eq!(resolved, "file:///u/a%20b/d/x%2Fy");
    }

    #[test]
    fn resolve_template_leaves_unreserved_characters_alone() {
        let mut values = HashMap::new();
        values.insert("id".to_string(), "abc-123_DEF.~*'()".to_string());
        let resolved = resolve_template("urn:{id}", &values);
        assert_eq!(resolved, "urn:abc-123_DEF.~*'()");
    }

    #[test]
    fn resolve_template_leaves_hole_intact_on_missing_value() {
        let values = HashMap::new();
        let resolved = resolve_template("file:///{missing}", &values);
        assert_eq!(resolved, "file:///{missing}");
    }

    #[test]
    fn resolve_template_leaves_unterminated_placeholder_intact() {
        let values = HashMap::new();
        let resolved = resolve_template("file:///{oops", &values);
        assert_eq!(resolved, "file:///{oops");
    }

    #[test]
    fn classifies_text_like_mime_types() {
        assert!(is_text_like_mime("text/plain"));
        assert!(is_text_like_mime("application/json"));
        assert!(is_text_like_mime("application/ld+json"));
        assert!(is_text_like_mime("image/svg+xml"));
        assert!(!is_text_like_mime("image/png"));
        assert!(!is_text_like_mime("application/octet-stream"));
        assert!(!is_text_like_mime("application/pdf"));
    }

    #[test]
    fn human_size_scales_units() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
    }
}
