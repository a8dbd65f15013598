//! MCP server implementation using rmcp.
//!
//! Exposes the runtime operations as MCP tools, over stdio or streamable HTTP.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use rmcp::{
    ErrorData as McpError,
    handler::server::ServerHandler,
    model::*,
    service::{RequestContext, RoleServer},
};

use crate::runtime::SharedRuntime;
use crate::tools::{ToolRegistry, runtime_tools};

/// MCP server that handles protocol requests and delegates to tool handlers.
#[derive(Clone)]
pub struct McpServer {
    tool_registry: Arc<ToolRegistry>,
}

impl McpServer {
    /// Create a server exposing one tool per runtime operation.
    pub fn new(runtime: SharedRuntime) -> Self {
        Self {
            tool_registry: Arc::new(runtime_tools(runtime)),
        }
    }

    pub fn tool_registry(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }
}

impl ServerHandler for McpServer {
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let result = ListToolsResult {
            tools: self.tool_registry.list_tools(),
            next_cursor: None,
            ..Default::default()
        };
        std::future::ready(Ok(result))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        let tool_name = request.name.to_string();
        let args = request.arguments.unwrap_or_default();
        let registry = self.tool_registry.clone();

        async move {
            if registry.get(&tool_name).is_none() {
                return Err(McpError::invalid_params(
                    format!("Unknown tool: {}", tool_name),
                    None,
                ));
            }
            registry.call_tool(&tool_name, args).await.map_err(|e| {
                McpError::internal_error(format!("Tool execution failed: {}", e), None)
            })
        }
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Action runtime that binds symbolic action and condition names to remote MCP \
                 endpoints, asks a planner for a plan from a PDDL domain and problem, and \
                 executes it step by step, stopping at the first failing action."
                    .to_string(),
            ),
        }
    }
}

/// Router serving the MCP endpoint at `/mcp`. Every session shares the same
/// runtime.
pub fn mcp_router(runtime: SharedRuntime) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(McpServer::new(runtime.clone())),
        LocalSessionManager::default().into(),
        Default::default(),
    );

    Router::new().nest_service("/mcp", service)
}

/// Start the runtime as an MCP Streamable HTTP server on the given bind
/// address, e.g. `127.0.0.1:3943`.
pub async fn start_mcp_http(runtime: SharedRuntime, bind: &str) -> Result<()> {
    let router = mcp_router(runtime);
    let listener = tokio::net::TcpListener::bind(bind).await?;

    tracing::info!("MCP HTTP server listening on http://{}/mcp", bind);

    axum::serve(listener, router).await?;

    Ok(())
}
