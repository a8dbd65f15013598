// MCP client implementation backed by rmcp

use std::borrow::Cow;
use crate::config::EndpointTarget;
use anyhow::Result;
use rmcp::{
    service::{RunningService as RmcpRunningService, RoleClient},
    ServiceExt,
    transport::{TokioChildProcess, ConfigureCommandExt},
};
use rmcp::model::{CallToolRequestParam, CallToolResult, Content, JsonObject};
use rmcp::transport::StreamableHttpClientTransport;
use tokio::process::Command;
use tracing::info;

/// Wrapper for a running MCP service client.
pub struct RunningService {
    pub client: RmcpRunningService<RoleClient, ()>,
}

pub async fn start_stdio_service(
    command: &str,
    args: &[String],
    env: &std::collections::BTreeMap<String, String>,
) -> Result<RunningService> {
    info!("Starting MCP stdio endpoint `{command}` via rmcp");

    let mut cmd = Command::new(command);
    if !args.is_empty() {
        cmd.args(args.iter().cloned());
    }
    if !env.is_empty() {
        cmd.envs(env.iter().map(|(k, v)| (k, v)));
    }

    let child = TokioChildProcess::new(cmd.configure(|_cmd| {}))?;
    let client = ().serve(child).await?;

    Ok(RunningService { client })
}

pub async fn start_http_service(url: &url::Url) -> Result<RunningService> {
    info!("Connecting to MCP HTTP endpoint `{url}` via rmcp streamable HTTP");

    let transport = StreamableHttpClientTransport::from_uri(url.as_str());
    let client = ().serve(transport).await?;

    Ok(RunningService { client })
}

pub async fn start_service(target: &EndpointTarget) -> Result<RunningService> {
    match target {
        EndpointTarget::Stdio { command, args, env } => {
            start_stdio_service(command, args, env).await
        }
        EndpointTarget::Http { url } => start_http_service(url).await,
    }
}

pub async fn call_tool(
    running: &RunningService,
    tool_name: &str,
    args: JsonObject,
) -> Result<CallToolResult> {
    let request = CallToolRequestParam {
        name: Cow::from(tool_name.to_string()),
        arguments: Some(args),
        meta: None,
        task: None,
    };

    let resp = running.client.call_tool(request).await?;
    Ok(resp)
}

/// Concatenate the text parts of a tool result.
pub fn text_content(content: &[Content]) -> String {
    content
        .iter()
        .filter_map(|c| c.as_text().map(|t| t.text.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}
