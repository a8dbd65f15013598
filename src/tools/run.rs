//! Handlers that trigger remote endpoints: `run_action`, `run_plan`, `observe`.

use std::pin::Pin;
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;

use crate::error::RuntimeResponse;
use crate::runtime::SharedRuntime;
use crate::tools::{ToolHandler, invoke_schema, object_schema, parse_args, response_result, tool_result};
use crate::types::{ConditionDescriptor, InvokeRequest};

/// Handler for the `run_action` tool.
pub struct RunActionHandler {
    runtime: SharedRuntime,
}

impl RunActionHandler {
    pub fn new(runtime: SharedRuntime) -> Self {
        Self { runtime }
    }
}

impl ToolHandler for RunActionHandler {
    fn name(&self) -> &str {
        "run_action"
    }

    fn title(&self) -> Option<&str> {
        Some("Run Action")
    }

    fn description(&self) -> &str {
        "Trigger one registered action with the given arguments, outside of any plan."
    }

    fn input_schema(&self) -> JsonObject {
        invoke_schema("action")
    }

    fn execute(
        &self,
        args: JsonObject,
    ) -> Pin<Box<dyn std::future::Future<Output = anyhow::Result<CallToolResult>> + Send + '_>> {
        Box::pin(async move {
            let request: InvokeRequest = match parse_args(self.name(), args) {
                Ok(r) => r,
                Err(result) => return Ok(result),
            };

            let runtime = self.runtime.lock().await;
            let result = runtime.run_action(&request.name, &request.args).await;
            Ok(response_result(RuntimeResponse {
                success: result.success,
                message: result.message,
            }))
        })
    }
}

/// Handler for the `run_plan` tool.
pub struct RunPlanHandler {
    runtime: SharedRuntime,
}

impl RunPlanHandler {
    pub fn new(runtime: SharedRuntime) -> Self {
        Self { runtime }
    }
}

impl ToolHandler for RunPlanHandler {
    fn name(&self) -> &str {
        "run_plan"
    }

    fn title(&self) -> Option<&str> {
        Some("Run Plan")
    }

    fn description(&self) -> &str {
        "Execute the stored plan from its first step, stopping at the first failing action."
    }

    fn input_schema(&self) -> JsonObject {
        object_schema(json!({}), &[])
    }

    fn execute(
        &self,
        _args: JsonObject,
    ) -> Pin<Box<dyn std::future::Future<Output = anyhow::Result<CallToolResult>> + Send + '_>> {
        Box::pin(async move {
            let mut runtime = self.runtime.lock().await;
            let response = match runtime.run_plan().await {
                Ok(report) => RuntimeResponse {
                    success: report.success(),
                    message: report.message,
                },
                Err(e) => e.into(),
            };
            Ok(response_result(response))
        })
    }
}

/// Handler for the `observe` tool.
pub struct ObserveHandler {
    runtime: SharedRuntime,
}

impl ObserveHandler {
    pub fn new(runtime: SharedRuntime) -> Self {
        Self { runtime }
    }
}

impl ToolHandler for ObserveHandler {
    fn name(&self) -> &str {
        "observe"
    }

    fn title(&self) -> Option<&str> {
        Some("Observe Condition")
    }

    fn description(&self) -> &str {
        "Query the observer registered for a condition and return its reading."
    }

    fn input_schema(&self) -> JsonObject {
        invoke_schema("condition")
    }

    fn execute(
        &self,
        args: JsonObject,
    ) -> Pin<Box<dyn std::future::Future<Output = anyhow::Result<CallToolResult>> + Send + '_>> {
        Box::pin(async move {
            let condition: ConditionDescriptor = match parse_args(self.name(), args) {
                Ok(c) => c,
                Err(result) => return Ok(result),
            };

            let runtime = self.runtime.lock().await;
            match runtime.observe(&condition).await {
                Ok(observation) => Ok(tool_result(observation.success, &observation)),
                Err(e) => Ok(response_result(e.into())),
            }
        })
    }
}
