//! Handlers for `load_pddl` and `create_plan`.

use std::pin::Pin;
use rmcp::model::{CallToolResult, JsonObject};
use serde_json::json;

use crate::error::RuntimeResponse;
use crate::runtime::SharedRuntime;
use crate::tools::{ToolHandler, object_schema, parse_args, response_result};
use crate::types::LoadPddlRequest;

/// Handler for the `load_pddl` tool.
pub struct LoadPddlHandler {
    runtime: SharedRuntime,
}

impl LoadPddlHandler {
    pub fn new(runtime: SharedRuntime) -> Self {
        Self { runtime }
    }
}

impl ToolHandler for LoadPddlHandler {
    fn name(&self) -> &str {
        "load_pddl"
    }

    fn title(&self) -> Option<&str> {
        Some("Load PDDL Input")
    }

    fn description(&self) -> &str {
        "Store a domain or problem file path for the next create_plan call."
    }

    fn input_schema(&self) -> JsonObject {
        object_schema(
            json!({
                "domain": { "type": "boolean", "description": "Load as the planning domain." },
                "problem": { "type": "boolean", "description": "Load as the planning problem." },
                "filepath": { "type": "string", "description": "Path handed to the planner." },
            }),
            &["filepath"],
        )
    }

    fn execute(
        &self,
        args: JsonObject,
    ) -> Pin<Box<dyn std::future::Future<Output = anyhow::Result<CallToolResult>> + Send + '_>> {
        Box::pin(async move {
            let request: LoadPddlRequest = match parse_args(self.name(), args) {
                Ok(r) => r,
                Err(result) => return Ok(result),
            };

            let mut runtime = self.runtime.lock().await;
            let response: RuntimeResponse = runtime
                .load_pddl(request.domain, request.problem, &request.filepath)
                .into();
            Ok(response_result(response))
        })
    }
}

/// Handler for the `create_plan` tool.
pub struct CreatePlanHandler {
    runtime: SharedRuntime,
}

impl CreatePlanHandler {
    pub fn new(runtime: SharedRuntime) -> Self {
        Self { runtime }
    }
}

impl ToolHandler for CreatePlanHandler {
    fn name(&self) -> &str {
        "create_plan"
    }

    fn title(&self) -> Option<&str> {
        Some("Create Plan")
    }

    fn description(&self) -> &str {
        "Discard the current plan and ask the planner for a new one from the loaded domain and problem."
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
            let response: RuntimeResponse = runtime.create_plan().await.into();
            Ok(response_result(response))
        })
    }
}
