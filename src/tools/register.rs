//! Handlers for `register_action` and `register_condition`.

use std::pin::Pin;
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;

use crate::error::RuntimeResponse;
use crate::runtime::SharedRuntime;
use crate::tools::{ToolHandler, object_schema, parse_args, response_result};
use crate::types::RegisterRequest;

fn register_schema(what: &str) -> JsonObject {
    object_schema(
        json!({
            "name": {
                "type": "string",
                "description": format!("Name of the {} as it appears in plans.", what),
            },
            "target": {
                "type": "object",
                "description": "MCP endpoint: either a `command` (stdio child process) or a `url` (streamable HTTP). `tool` overrides the remote tool name.",
                "properties": {
                    "command": { "type": "string" },
                    "args": { "type": "array", "items": { "type": "string" } },
                    "env": { "type": "object", "additionalProperties": { "type": "string" } },
                    "url": { "type": "string" },
                    "tool": { "type": "string" },
                },
            },
        }),
        &["name", "target"],
    )
}

/// Handler for the `register_action` tool.
pub struct RegisterActionHandler {
    runtime: SharedRuntime,
}

impl RegisterActionHandler {
    pub fn new(runtime: SharedRuntime) -> Self {
        Self { runtime }
    }
}

impl ToolHandler for RegisterActionHandler {
    fn name(&self) -> &str {
        "register_action"
    }

    fn title(&self) -> Option<&str> {
        Some("Register Action")
    }

    fn description(&self) -> &str {
        "Bind an action name to a remote executor endpoint. Re-registering a name replaces the previous binding."
    }

    fn input_schema(&self) -> JsonObject {
        register_schema("action")
    }

    fn execute(
        &self,
        args: JsonObject,
    ) -> Pin<Box<dyn std::future::Future<Output = anyhow::Result<CallToolResult>> + Send + '_>> {
        Box::pin(async move {
            let request: RegisterRequest = match parse_args(self.name(), args) {
                Ok(r) => r,
                Err(result) => return Ok(result),
            };

            let mut runtime = self.runtime.lock().await;
            let response: RuntimeResponse =
                runtime.register_action(&request.name, &request.target).into();
            Ok(response_result(response))
        })
    }
}

/// Handler for the `register_condition` tool.
pub struct RegisterConditionHandler {
    runtime: SharedRuntime,
}

impl RegisterConditionHandler {
    pub fn new(runtime: SharedRuntime) -> Self {
        Self { runtime }
    }
}

impl ToolHandler for RegisterConditionHandler {
    fn name(&self) -> &str {
        "register_condition"
    }

    fn title(&self) -> Option<&str> {
        Some("Register Condition")
    }

    fn description(&self) -> &str {
        "Bind a condition name to a remote observer endpoint."
    }

    fn input_schema(&self) -> JsonObject {
        register_schema("condition")
    }

    fn execute(
        &self,
        args: JsonObject,
    ) -> Pin<Box<dyn std::future::Future<Output = anyhow::Result<CallToolResult>> + Send + '_>> {
        Box::pin(async move {
            let request: RegisterRequest = match parse_args(self.name(), args) {
                Ok(r) => r,
                Err(result) => return Ok(result),
            };

            let mut runtime = self.runtime.lock().await;
            let response: RuntimeResponse =
                runtime.register_condition(&request.name, &request.target).into();
            Ok(response_result(response))
        })
    }
}
