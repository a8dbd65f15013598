use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use action_runtime::{RuntimeResponse, create_runtime, create_server};

// rmcp imports for MCP stdio server mode
use rmcp::service::ServiceExt;
use rmcp::transport::stdio;

#[derive(Parser)]
#[command(name = "action-runtime")]
#[command(about = "Plan-driven action runtime over MCP endpoints")]
struct Cli {
    /// Path to runtime.json (defaults to ACTION_RUNTIME_CONFIG, then the XDG config dir, then ./runtime.json)
    #[arg(long, global = true, env = "ACTION_RUNTIME_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST server (Axum HTTP API, not MCP)
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: String,
    },
    /// Run as an MCP stdio server (for use in mcp.json)
    McpStdio,
    /// Run as an MCP HTTP server
    McpHttp {
        /// Bind address, e.g. 0.0.0.0:3943
        #[arg(long, default_value = "127.0.0.1:3943")]
        bind: String,
    },
    /// Plan once from the given inputs, run the plan and exit
    Run {
        /// Domain file, overriding the configured one
        #[arg(long)]
        domain: Option<String>,
        /// Problem file, overriding the configured one
        #[arg(long)]
        problem: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the MCP stdio transport, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("action_runtime=info".parse()?)
                .add_directive("rmcp=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let runtime = create_runtime(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => {
            info!("Starting REST server on {}", bind);
            action_runtime::api::serve(runtime, &bind).await?;
        }
        Commands::McpStdio => {
            info!("Starting MCP stdio server (rmcp)");

            let service = create_server(runtime)
                .serve(stdio())
                .await
                .inspect_err(|e| tracing::error!("serving error: {:?}", e))?;

            // Block until the MCP session ends.
            service.waiting().await?;
            info!("MCP stdio server session ended");
        }
        Commands::McpHttp { bind } => {
            info!("Starting MCP HTTP server on {}", bind);
            action_runtime::server::start_mcp_http(runtime, &bind).await?;
        }
        Commands::Run { domain, problem } => {
            let mut runtime = runtime.lock().await;
            if let Some(domain) = domain {
                runtime.load_pddl(true, false, &domain)?;
            }
            if let Some(problem) = problem {
                runtime.load_pddl(false, true, &problem)?;
            }

            let steps = runtime.create_plan().await?;
            println!("Plan with {} steps:", steps);
            for step in runtime.plan().unwrap_or_default() {
                println!("  {}", step);
            }

            let report = runtime.run_plan().await?;
            let response = RuntimeResponse {
                success: report.success(),
                message: report.message.clone(),
            };
            println!("{}", serde_json::to_string_pretty(&response)?);

            if !report.success() {
                bail!(
                    "plan failed at step {} of {}",
                    report.failed_step.map(|i| i + 1).unwrap_or(report.steps_run),
                    report.steps_total
                );
            }
        }
    }

    Ok(())
}
