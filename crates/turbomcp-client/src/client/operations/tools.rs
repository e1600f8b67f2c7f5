//! Tool operations for MCP client: listing tools and calling them.

use std::collections::HashMap;

use turbomcp_core::{Error, Result, methods};
use turbomcp_protocol::types::{CallToolRequest, CallToolResult, Content, ListToolsResult, Tool};

impl<T: turbomcp_transport::Transport> super::super::core::Client<T> {
    /// List all tools the server provides, with their full input schemas.
    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        self.require_initialized()?;
        let response: ListToolsResult = self.protocol.request(methods::LIST_TOOLS, None).await?;
        Ok(response.tools)
    }

    /// List tool names only, for callers that don't need the input schemas.
    pub async fn list_tool_names(&self) -> Result<Vec<String>> {
        Ok(self
            .list_tools()
            .await?
            .into_iter()
            .map(|tool| tool.name)
            .collect())
    }

    /// Call a tool by name with the given arguments.
    ///
    /// Returns the server's raw [`CallToolResult`]; use [`Client::call_tool_text`]
    /// when only a flattened view of the first content part is needed.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Option<HashMap<String, serde_json::Value>>,
    ) -> Result<CallToolResult> {
        self.require_initialized()?;
        if name.is_empty() {
            return Err(Error::bad_request("tool name cannot be empty"));
        }

        let request = CallToolRequest {
            name: name.to_string(),
            arguments,
            _meta: None,
        };

        self.protocol
            .request(
                methods::CALL_TOOL,
                Some(serde_json::to_value(&request).map_err(|e| {
                    Error::protocol(format!("failed to serialize call_tool request: {e}"))
                })?),
            )
            .await
    }

    /// Call a tool and collapse its content into a single JSON value, for
    /// callers that don't want to match on every `Content` variant themselves.
    pub async fn call_tool_text(
        &self,
        name: &str,
        arguments: Option<HashMap<String, serde_json::Value>>,
    ) -> Result<serde_json::Value> {
        let result = self.call_tool(name, arguments).await?;
        Ok(summarize_tool_content(&result))
    }
}

fn summarize_tool_content(response: &CallToolResult) -> serde_json::Value {
    let is_error = response.is_error.unwrap_or(false);
    let Some(content) = response.content.first() else {
        return serde_json::json!({ "message": "no content returned", "is_error": is_error });
    };

    match content {
        Content::Text { text, .. } => serde_json::json!({ "text": text, "is_error": is_error }),
        Content::Image { data, mime_type, .. } => {
            serde_json::json!({ "image": data, "mime_type": mime_type, "is_error": is_error })
        }
        Content::Audio { data, mime_type, .. } => {
            serde_json::json!({ "audio": data, "mime_type": mime_type, "is_error": is_error })
        }
        Content::Resource { resource, .. } => {
            serde_json::json!({ "resource": resource, "is_error": is_error })
        }
    }
}
