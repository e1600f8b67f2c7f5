//! Resource operations for MCP client: listing, reading, and subscribing to resources.

use turbomcp_core::{Error, Result, methods};
use turbomcp_protocol::types::{
    EmptyResult, ListResourceTemplatesResult, ListResourcesResult, ReadResourceRequest,
    ReadResourceResult, Resource, ResourceTemplate, SubscribeRequest, UnsubscribeRequest,
};

impl<T: turbomcp_transport::Transport> super::super::core::Client<T> {
    /// List the resources the server exposes, with their URIs and metadata.
    pub async fn list_resources(&self) -> Result<Vec<Resource>> {
        self.require_initialized()?;
        let response: ListResourcesResult =
            self.protocol.request(methods::LIST_RESOURCES, None).await?;
        Ok(response.resources)
    }

    /// Read the content of a resource by URI.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResult> {
        self.require_initialized()?;
        if uri.is_empty() {
            return Err(Error::bad_request("resource URI cannot be empty"));
        }

        let request = ReadResourceRequest {
            uri: uri.to_string(),
            _meta: None,
        };

        self.protocol
            .request(
                methods::READ_RESOURCE,
                Some(serde_json::to_value(&request).map_err(|e| {
                    Error::protocol(format!("failed to serialize read_resource request: {e}"))
                })?),
            )
            .await
    }

    /// List resource templates describing families of related resource URIs.
    pub async fn list_resource_templates(&self) -> Result<Vec<ResourceTemplate>> {
        self.require_initialized()?;
        let response: ListResourceTemplatesResult = self
            .protocol
            .request(methods::LIST_RESOURCE_TEMPLATES, None)
            .await?;
        Ok(response.resource_templates)
    }

    /// Subscribe to change notifications for a resource.
    ///
    /// The runtime layer is responsible for polling `read_resource` on an
    /// interval after subscribing; this call only registers interest with the
    /// server.
    pub async fn subscribe(&self, uri: &str) -> Result<EmptyResult> {
        self.require_initialized()?;
        if uri.is_empty() {
            return Err(Error::bad_request("subscription URI cannot be empty"));
        }

        let request = SubscribeRequest {
            uri: uri.to_string(),
            _meta: None,
        };

        self.protocol
            .request(
                methods::SUBSCRIBE,
                Some(serde_json::to_value(&request).map_err(|e| {
                    Error::protocol(format!("failed to serialize subscribe request: {e}"))
                })?),
            )
            .await
    }

    /// Cancel a previous subscription to a resource.
    pub async fn unsubscribe(&self, uri: &str) -> Result<EmptyResult> {
        self.require_initialized()?;
        if uri.is_empty() {
            return Err(Error::bad_request("unsubscription URI cannot be empty"));
        }

        let request = UnsubscribeRequest {
            uri: uri.to_string(),
            _meta: None,
        };

        self.protocol
            .request(
                methods::UNSUBSCRIBE,
                Some(serde_json::to_value(&request).map_err(|e| {
                    Error::protocol(format!("failed to serialize unsubscribe request: {e}"))
                })?),
            )
            .await
    }
}
