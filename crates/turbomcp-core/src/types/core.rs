//! Core protocol types shared across MCP.

use std::string::String;
use std::vec::Vec;
use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::jsonrpc::RequestId;

/// Protocol version string
pub type ProtocolVersion = String;

/// Message ID (same as RequestId)
pub type MessageId = RequestId;

/// URI string type
pub type Uri = String;

/// MIME type string
pub type MimeType = String;

/// Base64 encoded string
pub type Base64String = String;

/// Pagination cursor
pub type Cursor = String;

/// Role in conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User role
    User,
    /// Assistant role
    Assistant,
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

/// Implementation information for MCP clients and servers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Implementation {
    /// Implementation name (programmatic identifier)
    pub name: String,
    /// Display title for UI
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Implementation version
    pub version: String,
}

impl Default for Implementation {
    fn default() -> Self {
        Self {
            name: "unknown".into(),
            title: None,
            version: "0.0.0".into(),
        }
    }
}

impl Implementation {
    /// Create a new implementation info
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            version: version.into(),
        }
    }

    /// Set the display title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Base metadata with name and title
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseMetadata {
    /// Programmatic name/identifier
    pub name: String,
    /// Human-readable display title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Optional metadata hints for MCP objects.
///
/// Per MCP spec, annotations are **weak hints only** - clients may ignore them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    /// Role-based audience hint ("user" or "assistant")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<Vec<String>>,
    /// Subjective priority hint (no standard range)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<f64>,
    /// ISO 8601 timestamp of last modification
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "lastModified")]
    pub last_modified: Option<String>,
    /// Application-specific extensions
    #[serde(flatten)]
    pub custom: HashMap<String, Value>,
}

/// Base result type for MCP responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Result {
    /// Optional metadata
    #[serde(rename = "_meta", skip_serializing_if = "Option::is_none")]
    pub _meta: Option<Value>,
}

impl Result {
    /// Create a new result
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with metadata
    #[must_use]
    pub fn with_meta(meta: Value) -> Self {
        Self { _meta: Some(meta) }
    }
}

/// Empty result type
pub type EmptyResult = Result;

/// Result of a `ping` request. Carries no data beyond `_meta`.
pub type PingResult = Result;

/// Severity levels a server can be asked to log at, per RFC 5424 syslog
/// severities as adopted by the `logging/setLevel` MCP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug-level messages
    Debug,
    /// Informational messages
    Info,
    /// Normal but significant events
    Notice,
    /// Warning conditions
    Warning,
    /// Error conditions
    Error,
    /// Critical conditions
    Critical,
    /// Action must be taken immediately
    Alert,
    /// System is unusable
    Emergency,
}

/// Request to set the minimum log level the server reports at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetLevelRequest {
    /// The desired logging level
    pub level: LogLevel,
}

/// Result of a `logging/setLevel` request.
pub type SetLevelResult = Result;

/// Model hints for sampling
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelHint {
    /// Optional model name hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An icon that can be displayed in a UI alongside a tool, prompt, or resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Icon {
    /// Data URI or external URL for the icon image
    pub src: String,
    /// MIME type of the icon, if not inferrable from `src`
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Size hint, e.g. "48x48" or "any"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<String>,
}

impl Icon {
    /// Create a new icon from its source URI
    #[must_use]
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            mime_type: None,
            sizes: None,
        }
    }
}

/// Model preferences for sampling
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelPreferences {
    /// Model hints in order of preference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<ModelHint>>,
    /// Cost priority (0-1, lower = prefer cheaper)
    #[serde(rename = "costPriority", skip_serializing_if = "Option::is_none")]
    pub cost_priority: Option<f64>,
    /// Speed priority (0-1, lower = prefer faster)
    #[serde(rename = "speedPriority", skip_serializing_if = "Option::is_none")]
    pub speed_priority: Option<f64>,
    /// Intelligence priority (0-1, lower = prefer smarter)
    #[serde(rename = "intelligencePriority", skip_serializing_if = "Option::is_none")]
    pub intelligence_priority: Option<f64>,
}
