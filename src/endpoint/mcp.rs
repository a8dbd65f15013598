//! Executor handles backed by tools on remote MCP services.
//!
//! The argument list is sent as `{"args": [...]}`. A result flagged `is_error`
//! is a failed action; its text content becomes the message.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::warn;

use super::{ActionExecutor, BoxFuture, ConditionObserver, EndpointFactory};
use crate::config::{EndpointConfig, EndpointTarget};
use crate::error::RuntimeError;
use crate::mcp_client::{self, RunningService};
use crate::types::{ActionResult, ObservationResult};

/// One remote tool. The service connection is opened on first call and reused
/// until a call fails; the next call then connects again.
pub struct McpEndpoint {
    tool: String,
    target: EndpointTarget,
    call_timeout: Option<Duration>,
    client: Mutex<Option<RunningService>>,
}

impl McpEndpoint {
    pub fn new(tool: impl Into<String>, target: EndpointTarget) -> Self {
        Self {
            tool: tool.into(),
            target,
            call_timeout: None,
            client: Mutex::new(None),
        }
    }

    /// Bound on a whole call, including connecting and the MCP handshake.
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    #[cfg(test)]
    pub(crate) async fn is_connected(&self) -> bool {
        self.client.lock().await.is_some()
    }

    async fn call(&self, args: &[String]) -> Result<CallToolResult> {
        let mut slot = self.client.lock().await;

        let attempt = connect_and_call(&mut slot, &self.target, &self.tool, args);
        let outcome = match self.call_timeout {
            Some(limit) => tokio::time::timeout(limit, attempt)
                .await
                .unwrap_or_else(|_| {
                    Err(anyhow!("no response from `{}` within {:?}", self.tool, limit))
                }),
            None => attempt.await,
        };

        if outcome.is_err() && slot.take().is_some() {
            warn!(tool = %self.tool, "Dropping MCP connection after failed call");
        }
        outcome
    }
}

async fn connect_and_call(
    slot: &mut Option<RunningService>,
    target: &EndpointTarget,
    tool: &str,
    args: &[String],
) -> Result<CallToolResult> {
    if slot.is_none() {
        *slot = Some(mcp_client::start_service(target).await?);
    }
    let Some(running) = slot.as_ref() else {
        return Err(anyhow!("no connection to `{}`", tool));
    };

    let mut params = JsonObject::new();
    params.insert("args".to_string(), json!(args));

    mcp_client::call_tool(running, tool, params).await
}

impl ActionExecutor for McpEndpoint {
    fn trigger<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, Result<ActionResult>> {
        Box::pin(async move {
            let result = self.call(args).await?;
            Ok(ActionResult {
                success: !result.is_error.unwrap_or(false),
                message: mcp_client::text_content(&result.content),
            })
        })
    }
}

impl ConditionObserver for McpEndpoint {
    fn observe<'a>(&'a self, args: &'a [String]) -> BoxFuture<'a, Result<ObservationResult>> {
        Box::pin(async move {
            let result = self.call(args).await?;
            let text = mcp_client::text_content(&result.content);
            let value = match result.structured_content {
                Some(value) => value,
                None => serde_json::from_str(&text).unwrap_or(Value::String(text.clone())),
            };
            Ok(ObservationResult {
                success: !result.is_error.unwrap_or(false),
                value,
                message: text,
            })
        })
    }
}

/// Resolves registration targets into [`McpEndpoint`]s without connecting.
#[derive(Debug, Clone, Default)]
pub struct McpEndpointFactory {
    call_timeout: Option<Duration>,
}

impl McpEndpointFactory {
    pub fn new(call_timeout: Option<Duration>) -> Self {
        Self { call_timeout }
    }

    fn build(&self, name: &str, target: &EndpointConfig) -> Result<McpEndpoint> {
        let resolved = target.resolve()?;
        Ok(McpEndpoint::new(target.tool_name(name), resolved).with_call_timeout(self.call_timeout))
    }
}

impl EndpointFactory for McpEndpointFactory {
    fn action_executor(
        &self,
        name: &str,
        target: &EndpointConfig,
    ) -> Result<Arc<dyn ActionExecutor>, RuntimeError> {
        self.build(name, target)
            .map(|endpoint| Arc::new(endpoint) as Arc<dyn ActionExecutor>)
            .map_err(|e| RuntimeError::DuplicateOrInvalid {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }

    fn condition_observer(
        &self,
        name: &str,
        target: &EndpointConfig,
    ) -> Result<Arc<dyn ConditionObserver>, RuntimeError> {
        self.build(name, target)
            .map(|endpoint| Arc::new(endpoint) as Arc<dyn ConditionObserver>)
            .map_err(|e| RuntimeError::ObserverUnavailable {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }
}
