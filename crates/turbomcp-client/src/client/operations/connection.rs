//! Connection utility operations for MCP client: liveness and log-level control.

use turbomcp_core::types::{LogLevel, PingResult, SetLevelRequest, SetLevelResult};
use turbomcp_core::{Error, Result, methods};

impl<T: turbomcp_transport::Transport> super::super::core::Client<T> {
    /// Ping the server to check that the connection is live and responding.
    pub async fn ping(&self) -> Result<PingResult> {
        self.require_initialized()?;
        self.protocol.request(methods::PING, None).await
    }

    /// Set the minimum level at which the server reports log messages.
    pub async fn set_log_level(&self, level: LogLevel) -> Result<SetLevelResult> {
        self.require_initialized()?;
        let request = SetLevelRequest { level };
        self.protocol
            .request(
                methods::SET_LEVEL,
                Some(serde_json::to_value(&request).map_err(|e| {
                    Error::protocol(format!("failed to serialize set_log_level request: {e}"))
                })?),
            )
            .await
    }
}
