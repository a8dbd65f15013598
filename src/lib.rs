// Core modules
pub mod config;
pub mod error;
pub mod types;
mod mcp_client;
pub mod endpoint;
pub mod registry;
mod plan_store;
pub mod planner;
mod executor;
pub mod runtime;

// Request surfaces
pub mod api;
mod tools;
pub mod server;

#[cfg(test)]
mod test_support;

// Re-export key types and functions
pub use config::{EndpointConfig, PlannerConfig, RuntimeConfig};
pub use error::{RuntimeError, RuntimeResponse};
pub use runtime::{ActionRuntime, RuntimeStatus, SharedRuntime};
pub use tools::{ToolHandler, ToolRegistry};
pub use types::{ActionDescriptor, ActionResult, ObservationResult, Plan, PlanReport, PlanState};
pub use server::McpServer;

use std::path::Path;
use anyhow::Result;

/// Load configuration (from `path`, or the default locations) and build a
/// shared runtime from it.
pub fn create_runtime(path: Option<&Path>) -> Result<SharedRuntime> {
    let config = RuntimeConfig::load(path)?;
    Ok(ActionRuntime::from_config(&config).into_shared())
}

/// Convenience function to create an MCP server over a shared runtime.
pub fn create_server(runtime: SharedRuntime) -> McpServer {
    McpServer::new(runtime)
}
