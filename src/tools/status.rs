//! Handler for the `status` tool.

use std::pin::Pin;
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;

use crate::runtime::SharedRuntime;
use crate::tools::{ToolHandler, object_schema, tool_result};

/// Reports registered names, loaded inputs, the current plan and the last run.
pub struct StatusHandler {
    runtime: SharedRuntime,
}

impl StatusHandler {
    pub fn new(runtime: SharedRuntime) -> Self {
        Self { runtime }
    }
}

impl ToolHandler for StatusHandler {
    fn name(&self) -> &str {
        "status"
    }

    fn title(&self) -> Option<&str> {
        Some("Runtime Status")
    }

    fn description(&self) -> &str {
        "Describe the runtime: registered actions and conditions, loaded domain and problem, the stored plan and the outcome of the last run."
    }

    fn input_schema(&self) -> JsonObject {
        object_schema(json!({}), &[])
    }

    fn execute(
        &self,
        _args: JsonObject,
    ) -> Pin<Box<dyn std::future::Future<Output = anyhow::Result<CallToolResult>> + Send + '_>> {
        Box::pin(async move {
            let status = self.runtime.lock().await.status();
            Ok(tool_result(true, &status))
        })
    }
}
