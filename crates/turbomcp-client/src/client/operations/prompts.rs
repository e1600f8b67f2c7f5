//! Prompt operations for MCP client: listing prompt templates and rendering them.

use std::collections::HashMap;

use turbomcp_core::{Error, Result, methods};
use turbomcp_protocol::types::{GetPromptRequest, GetPromptResult, ListPromptsResult, Prompt};

impl<T: turbomcp_transport::Transport> super::super::core::Client<T> {
    /// List the prompt templates the server provides, with their argument schemas.
    pub async fn list_prompts(&self) -> Result<Vec<Prompt>> {
        self.require_initialized()?;
        let response: ListPromptsResult =
            self.protocol.request(methods::LIST_PROMPTS, None).await?;
        Ok(response.prompts)
    }

    /// Get a prompt by name, optionally substituting `{argument}` placeholders.
    ///
    /// Pass `None` to get the raw template form.
    pub async fn get_prompt(
        &self,
        name: &str,
        arguments: Option<HashMap<String, String>>,
    ) -> Result<GetPromptResult> {
        self.require_initialized()?;
        if name.is_empty() {
            return Err(Error::bad_request("prompt name cannot be empty"));
        }

        let request = GetPromptRequest {
            name: name.to_string(),
            arguments,
            _meta: None,
        };

        self.protocol
            .request(
                methods::GET_PROMPT,
                Some(serde_json::to_value(&request).map_err(|e| {
                    Error::protocol(format!("failed to serialize get_prompt request: {e}"))
                })?),
            )
            .await
    }
}
