//! MCP tool handlers exposing the runtime operations.
//!
//! Every handler answers with the JSON-encoded `{success, message}` response
//! (or a richer payload for `observe` and `status`) as text content, flagged
//! as an error when the operation failed.

mod registry;

pub use registry::{ToolHandler, ToolRegistry};

mod pddl;
mod register;
mod run;
mod status;

pub use pddl::{CreatePlanHandler, LoadPddlHandler};
pub use register::{RegisterActionHandler, RegisterConditionHandler};
pub use run::{ObserveHandler, RunActionHandler, RunPlanHandler};
pub use status::StatusHandler;

use rmcp::model::{CallToolResult, Content, JsonObject};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::RuntimeResponse;
use crate::runtime::SharedRuntime;

/// Build a registry holding one handler per runtime operation.
pub fn runtime_tools(runtime: SharedRuntime) -> ToolRegistry {
    ToolRegistry::new()
        .register_handler(LoadPddlHandler::new(runtime.clone()))
        .register_handler(CreatePlanHandler::new(runtime.clone()))
        .register_handler(RegisterActionHandler::new(runtime.clone()))
        .register_handler(RegisterConditionHandler::new(runtime.clone()))
        .register_handler(RunActionHandler::new(runtime.clone()))
        .register_handler(RunPlanHandler::new(runtime.clone()))
        .register_handler(ObserveHandler::new(runtime.clone()))
        .register_handler(StatusHandler::new(runtime))
}

/// Encode `payload` as text content, marking failures as tool errors.
fn tool_result<T: Serialize>(success: bool, payload: &T) -> CallToolResult {
    let text = serde_json::to_string(payload)
        .unwrap_or_else(|_| "internal serialization error".to_string());
    if success {
        CallToolResult::success(vec![Content::text(text)])
    } else {
        CallToolResult::error(vec![Content::text(text)])
    }
}

fn response_result(response: RuntimeResponse) -> CallToolResult {
    tool_result(response.success, &response)
}

/// Decode tool arguments into a request type, or produce the failure to return.
fn parse_args<T: DeserializeOwned>(tool: &str, args: JsonObject) -> Result<T, CallToolResult> {
    serde_json::from_value(Value::Object(args)).map_err(|e| {
        response_result(RuntimeResponse::failure(format!(
            "Invalid arguments for {}: {}",
            tool, e
        )))
    })
}

fn object_schema(properties: Value, required: &[&str]) -> JsonObject {
    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), properties);
    schema.insert("required".to_string(), json!(required));
    schema
}

fn invoke_schema(what: &str) -> JsonObject {
    object_schema(
        json!({
            "name": {
                "type": "string",
                "description": format!("Registered {} name.", what),
            },
            "args": {
                "type": "array",
                "items": { "type": "string" },
                "description": "Ordered arguments passed to the endpoint.",
            },
        }),
        &["name"],
    )
}
