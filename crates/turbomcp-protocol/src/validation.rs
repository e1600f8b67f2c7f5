//! # Protocol Validation
//!
//! This module provides validation for MCP protocol messages, ensuring
//! data integrity and specification compliance before requests leave the
//! client or after responses arrive from a server.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use turbomcp_core::jsonrpc::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};
use turbomcp_core::types::{InitializeRequest, ModelPreferences, Prompt, Resource, Tool, ToolInputSchema};

/// Cached regex for URI validation (compiled once)
static URI_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*:").expect("Invalid URI regex pattern"));

/// Cached regex for method name validation (compiled once)
static METHOD_NAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9_/]*$").expect("Invalid method name regex pattern")
});

/// Protocol message validator
#[derive(Debug, Clone)]
pub struct ProtocolValidator {
    rules: ValidationRules,
}

/// Validation rules configuration
#[derive(Debug, Clone)]
pub struct ValidationRules {
    /// Maximum string length
    pub max_string_length: usize,
    /// Maximum array length
    pub max_array_length: usize,
    /// Maximum object depth
    pub max_object_depth: usize,
    /// Required fields per message type, for reference by callers
    pub required_fields: HashMap<String, HashSet<String>>,
}

impl ValidationRules {
    /// Get the URI validation regex (cached globally)
    #[inline]
    pub fn uri_regex(&self) -> &Regex {
        &URI_REGEX
    }

    /// Get the method name validation regex (cached globally)
    #[inline]
    pub fn method_name_regex(&self) -> &Regex {
        &METHOD_NAME_REGEX
    }
}

impl Default for ValidationRules {
    fn default() -> Self {
        let mut required_fields = HashMap::new();
        required_fields.insert(
            "request".to_string(),
            ["jsonrpc", "method", "id"].iter().map(|s| s.to_string()).collect(),
        );
        required_fields.insert(
            "initialize".to_string(),
            ["protocolVersion", "capabilities", "clientInfo"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        required_fields.insert(
            "tool".to_string(),
            ["name", "inputSchema"].iter().map(|s| s.to_string()).collect(),
        );

        Self {
            max_string_length: 1024 * 1024,
            max_array_length: 10_000,
            max_object_depth: 32,
            required_fields,
        }
    }
}

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Validation passed
    Valid,
    /// Validation passed with warnings
    ValidWithWarnings(Vec<ValidationWarning>),
    /// Validation failed
    Invalid(Vec<ValidationError>),
}

/// Validation warning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Warning code
    pub code: String,
    /// Warning message
    pub message: String,
    /// Field path (if applicable)
    pub field_path: Option<String>,
}

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Error code
    pub code: String,
    /// Error message
    pub message: String,
    /// Field path (if applicable)
    pub field_path: Option<String>,
}

struct ValidationContext {
    path: Vec<String>,
    depth: usize,
    warnings: Vec<ValidationWarning>,
    errors: Vec<ValidationError>,
}

impl ValidationContext {
    fn new() -> Self {
        Self {
            path: Vec::new(),
            depth: 0,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn push_path(&mut self, segment: String) {
        self.path.push(segment);
    }

    fn pop_path(&mut self) {
        self.path.pop();
    }

    fn current_path(&self) -> Option<String> {
        if self.path.is_empty() {
            None
        } else {
            Some(self.path.join("."))
        }
    }

    fn add_error(&mut self, code: &str, message: String, field_path: Option<String>) {
        let path = field_path.or_else(|| self.current_path());
        self.errors.push(ValidationError {
            code: code.to_string(),
            message,
            field_path: path,
        });
    }

    fn add_warning(&mut self, code: &str, message: String, field_path: Option<String>) {
        let path = field_path.or_else(|| self.current_path());
        self.warnings.push(ValidationWarning {
            code: code.to_string(),
            message,
            field_path: path,
        });
    }

    fn into_result(self) -> ValidationResult {
        if !self.errors.is_empty() {
            ValidationResult::Invalid(self.errors)
        } else if !self.warnings.is_empty() {
            ValidationResult::ValidWithWarnings(self.warnings)
        } else {
            ValidationResult::Valid
        }
    }
}

impl ProtocolValidator {
    /// Create a new validator with default rules
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: ValidationRules::default(),
        }
    }

    /// Set custom validation rules
    #[must_use]
    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    /// Validate a JSON-RPC request
    pub fn validate_request(&self, request: &JsonRpcRequest) -> ValidationResult {
        let mut ctx = ValidationContext::new();
        self.validate_method_name(&request.method, &mut ctx);
        if let Some(params) = &request.params {
            self.validate_parameters(params, &mut ctx);
        }
        ctx.into_result()
    }

    /// Validate a JSON-RPC response
    pub fn validate_response(&self, response: &JsonRpcResponse) -> ValidationResult {
        let mut ctx = ValidationContext::new();
        match (response.result().is_some(), response.error().is_some()) {
            (true, true) => ctx.add_error(
                "RESPONSE_BOTH_RESULT_AND_ERROR",
                "Response cannot have both result and error".to_string(),
                None,
            ),
            (false, false) => ctx.add_error(
                "RESPONSE_MISSING_RESULT_OR_ERROR",
                "Response must have either result or error".to_string(),
                None,
            ),
            _ => {}
        }
        if let Some(result) = response.result() {
            self.validate_value_structure(result, &mut ctx);
        }
        ctx.into_result()
    }

    /// Validate a JSON-RPC notification
    pub fn validate_notification(&self, notification: &JsonRpcNotification) -> ValidationResult {
        let mut ctx = ValidationContext::new();
        self.validate_method_name(&notification.method, &mut ctx);
        if let Some(params) = &notification.params {
            self.validate_parameters(params, &mut ctx);
        }
        ctx.into_result()
    }

    /// Validate a tool definition
    pub fn validate_tool(&self, tool: &Tool) -> ValidationResult {
        let mut ctx = ValidationContext::new();

        if tool.name.is_empty() {
            ctx.add_error(
                "TOOL_EMPTY_NAME",
                "Tool name cannot be empty".to_string(),
                Some("name".to_string()),
            );
        }
        if tool.name.len() > self.rules.max_string_length {
            ctx.add_error(
                "TOOL_NAME_TOO_LONG",
                format!("Tool name exceeds maximum length of {}", self.rules.max_string_length),
                Some("name".to_string()),
            );
        }
        self.validate_tool_input(&tool.input_schema, &mut ctx);
        ctx.into_result()
    }

    /// Validate a prompt definition
    pub fn validate_prompt(&self, prompt: &Prompt) -> ValidationResult {
        let mut ctx = ValidationContext::new();

        if prompt.name.is_empty() {
            ctx.add_error(
                "PROMPT_EMPTY_NAME",
                "Prompt name cannot be empty".to_string(),
                Some("name".to_string()),
            );
        }
        if let Some(arguments) = &prompt.arguments
            && arguments.len() > self.rules.max_array_length
        {
            ctx.add_error(
                "PROMPT_TOO_MANY_ARGS",
                format!("Prompt has too many arguments (max: {})", self.rules.max_array_length),
                Some("arguments".to_string()),
            );
        }
        ctx.into_result()
    }

    /// Validate a resource definition
    pub fn validate_resource(&self, resource: &Resource) -> ValidationResult {
        let mut ctx = ValidationContext::new();

        if !self.rules.uri_regex().is_match(&resource.uri) {
            ctx.add_error(
                "RESOURCE_INVALID_URI",
                format!("Invalid URI format: {}", resource.uri),
                Some("uri".to_string()),
            );
        }
        if resource.name.is_empty() {
            ctx.add_error(
                "RESOURCE_EMPTY_NAME",
                "Resource name cannot be empty".to_string(),
                Some("name".to_string()),
            );
        }
        ctx.into_result()
    }

    /// Validate an initialize request
    pub fn validate_initialize_request(&self, request: &InitializeRequest) -> ValidationResult {
        let mut ctx = ValidationContext::new();

        if request.protocol_version != turbomcp_core::PROTOCOL_VERSION {
            ctx.add_warning(
                "UNSUPPORTED_PROTOCOL_VERSION",
                format!(
                    "Protocol version {} is not officially supported",
                    request.protocol_version
                ),
                Some("protocolVersion".to_string()),
            );
        }
        if request.client_info.name.is_empty() {
            ctx.add_error(
                "EMPTY_CLIENT_NAME",
                "Client name cannot be empty".to_string(),
                Some("clientInfo.name".to_string()),
            );
        }
        if request.client_info.version.is_empty() {
            ctx.add_error(
                "EMPTY_CLIENT_VERSION",
                "Client version cannot be empty".to_string(),
                Some("clientInfo.version".to_string()),
            );
        }
        ctx.into_result()
    }

    /// Validate model preferences (priority ranges must be 0.0-1.0)
    pub fn validate_model_preferences(&self, prefs: &ModelPreferences) -> ValidationResult {
        let mut ctx = ValidationContext::new();

        let priorities = [
            ("costPriority", prefs.cost_priority),
            ("speedPriority", prefs.speed_priority),
            ("intelligencePriority", prefs.intelligence_priority),
        ];

        for (name, value) in priorities {
            if let Some(v) = value
                && !(0.0..=1.0).contains(&v)
            {
                ctx.add_error(
                    "PRIORITY_OUT_OF_RANGE",
                    format!("{name} must be between 0.0 and 1.0 (inclusive), got {v}"),
                    Some(name.to_string()),
                );
            }
        }
        ctx.into_result()
    }

    fn validate_method_name(&self, method: &str, ctx: &mut ValidationContext) {
        if method.is_empty() {
            ctx.add_error(
                "EMPTY_METHOD_NAME",
                "Method name cannot be empty".to_string(),
                Some("method".to_string()),
            );
            return;
        }
        if method.len() > self.rules.max_string_length {
            ctx.add_error(
                "METHOD_NAME_TOO_LONG",
                format!("Method name exceeds maximum length of {}", self.rules.max_string_length),
                Some("method".to_string()),
            );
        } else if !self.rules.method_name_regex().is_match(method) {
            ctx.add_error(
                "INVALID_METHOD_NAME",
                format!("Invalid method name format: '{method}'"),
                Some("method".to_string()),
            );
        }
    }

    fn validate_tool_input(&self, input: &ToolInputSchema, ctx: &mut ValidationContext) {
        ctx.push_path("inputSchema".to_string());
        if input.schema_type != "object" {
            ctx.add_warning(
                "NON_OBJECT_SCHEMA",
                "Tool input schema should typically be 'object'".to_string(),
                Some("type".to_string()),
            );
        }
        ctx.pop_path();
    }

    fn validate_value_structure(&self, value: &Value, ctx: &mut ValidationContext) {
        if ctx.depth > self.rules.max_object_depth {
            ctx.add_error(
                "MAX_DEPTH_EXCEEDED",
                format!("Maximum object depth ({}) exceeded", self.rules.max_object_depth),
                None,
            );
            return;
        }

        match value {
            Value::Object(obj) => {
                ctx.depth += 1;
                for (key, val) in obj {
                    ctx.push_path(key.clone());
                    self.validate_value_structure(val, ctx);
                    ctx.pop_path();
                }
                ctx.depth -= 1;
            }
            Value::Array(arr) => {
                if arr.len() > self.rules.max_array_length {
                    ctx.add_error(
                        "ARRAY_TOO_LONG",
                        format!("Array exceeds maximum length of {}", self.rules.max_array_length),
                        None,
                    );
                }
                for (index, val) in arr.iter().enumerate() {
                    ctx.push_path(index.to_string());
                    self.validate_value_structure(val, ctx);
                    ctx.pop_path();
                }
            }
            Value::String(s) => {
                if s.len() > self.rules.max_string_length {
                    ctx.add_error(
                        "STRING_TOO_LONG",
                        format!("String exceeds maximum length of {}", self.rules.max_string_length),
                        None,
                    );
                }
            }
            _ => {}
        }
    }

    fn validate_parameters(&self, params: &Value, ctx: &mut ValidationContext) {
        self.validate_value_structure(params, ctx);
    }
}

impl Default for ProtocolValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    /// Check if validation passed (with or without warnings)
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !matches!(self, ValidationResult::Invalid(_))
    }

    /// Check if validation failed
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, ValidationResult::Invalid(_))
    }

    /// Check if validation has warnings
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        matches!(self, ValidationResult::ValidWithWarnings(_))
    }

    /// Get warnings (if any)
    #[must_use]
    pub fn warnings(&self) -> &[ValidationWarning] {
        match self {
            ValidationResult::ValidWithWarnings(warnings) => warnings,
            _ => &[],
        }
    }

    /// Get errors (if any)
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            ValidationResult::Invalid(errors) => errors,
            _ => &[],
        }
    }
}

/// Standalone validation helpers
pub mod utils {
    use super::ValidationRules;

    /// Check if a string is a valid URI
    #[must_use]
    pub fn is_valid_uri(uri: &str) -> bool {
        ValidationRules::default().uri_regex().is_match(uri)
    }

    /// Check if a string is a valid method name
    #[must_use]
    pub fn is_valid_method_name(method: &str) -> bool {
        ValidationRules::default().method_name_regex().is_match(method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use turbomcp_core::jsonrpc::{JsonRpcVersion, RequestId};
    use turbomcp_core::types::{ClientCapabilities, Implementation};

    #[test]
    fn test_tool_validation() {
        let validator = ProtocolValidator::new();

        let tool = Tool::new("test_tool").with_input_schema(ToolInputSchema::object());
        assert!(validator.validate_tool(&tool).is_valid());

        let invalid_tool = Tool::new("");
        assert!(validator.validate_tool(&invalid_tool).is_invalid());
    }

    #[test]
    fn test_request_validation() {
        let validator = ProtocolValidator::new();

        let request = JsonRpcRequest {
            jsonrpc: JsonRpcVersion,
            method: "tools/list".to_string(),
            params: None,
            id: RequestId::String("test-id".to_string()),
        };
        assert!(validator.validate_request(&request).is_valid());

        let invalid_request = JsonRpcRequest {
            jsonrpc: JsonRpcVersion,
            method: String::new(),
            params: None,
            id: RequestId::String("test-id".to_string()),
        };
        assert!(validator.validate_request(&invalid_request).is_invalid());
    }

    #[test]
    fn test_initialize_validation() {
        let validator = ProtocolValidator::new();

        let request = InitializeRequest::new(Implementation::new("test-client", "1.0.0"))
            .with_capabilities(ClientCapabilities::default());
        assert!(validator.validate_initialize_request(&request).is_valid());

        let old_version = InitializeRequest::new(Implementation::new("test-client", "1.0.0"))
            .with_protocol_version("2023-01-01");
        let result = validator.validate_initialize_request(&old_version);
        assert!(result.is_valid());
        assert!(result.has_warnings());
    }

    #[test]
    fn test_utils() {
        assert!(utils::is_valid_uri("file://test.txt"));
        assert!(utils::is_valid_uri("https://example.com"));
        assert!(!utils::is_valid_uri("not-a-uri"));

        assert!(utils::is_valid_method_name("tools/list"));
        assert!(utils::is_valid_method_name("initialize"));
        assert!(!utils::is_valid_method_name("invalid-method-name!"));
    }
}
