//! promcp CLI - runs the MCP servers over stdio and queries Prometheus directly

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use promcp_core::config::PrometheusConfig;
use promcp_core::mcp::{McpServer, StdioTransport};
use promcp_core::prometheus::{PrometheusClient, QueryDescriptor};
use promcp_core::system::SystemInfoProvider;
use promcp_core::tools::{PrometheusQueryTool, SystemTool, ToolRegistry};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "promcp")]
#[command(about = "Metrics tools for MCP hosts", long_about = None)]
#[command(version)]
struct Cli {
    /// Extra TOML config file, merged over promcp.toml
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an MCP server on stdin/stdout
    Serve {
        #[command(subcommand)]
        server: ServeCommands,
    },
    /// Run a single PromQL query and print the result envelope
    Query {
        /// PromQL expression
        expr: String,
        /// Evaluate over a time range instead of a single instant
        #[arg(long, requires_all = ["start", "end", "step"])]
        range: bool,
        /// Range start (RFC 3339 or Unix timestamp)
        #[arg(long)]
        start: Option<String>,
        /// Range end (RFC 3339 or Unix timestamp)
        #[arg(long)]
        end: Option<String>,
        /// Resolution step (e.g. "15s")
        #[arg(long)]
        step: Option<String>,
    },
    /// Print the resolved backend configuration
    Config,
    /// Version information
    Version,
}

#[derive(Subcommand)]
enum ServeCommands {
    /// Expose `prometheus_query`
    Prometheus,
    /// Expose `system_info`, `cpu_info` and `memory_info`
    System,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout is reserved for protocol frames
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { server } => match server {
            ServeCommands::Prometheus => {
                let config = load_config(cli.config.as_deref())?;
                let client = PrometheusClient::new(&config)?;

                let server = McpServer::builder()
                    .name("prometheus-mcp")
                    .version(env!("CARGO_PKG_VERSION"))
                    .with_tool(Arc::new(PrometheusQueryTool::new(client)))?
                    .build();

                server.run(StdioTransport::stdio()).await?;
            }
            ServeCommands::System => {
                let mut registry = ToolRegistry::new();
                registry.register_all(SystemTool::all(SystemInfoProvider::new()))?;

                let server = McpServer::builder()
                    .name("system-info-mcp")
                    .version(env!("CARGO_PKG_VERSION"))
                    .with_tools(registry)
                    .build();

                server.run(StdioTransport::stdio()).await?;
            }
        },
        Commands::Query {
            expr,
            range,
            start,
            end,
            step,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let client = PrometheusClient::new(&config)?;

            let descriptor = if range {
                QueryDescriptor::range(
                    expr,
                    start.unwrap_or_default(),
                    end.unwrap_or_default(),
                    step.unwrap_or_default(),
                )
            } else {
                QueryDescriptor::instant(expr)
            };

            let envelope = client.query(&descriptor).await;
            println!("{}", serde_json::to_string_pretty(&envelope)?);

            if !envelope.is_success() {
                std::process::exit(1);
            }
        }
        Commands::Config => {
            let config = load_config(cli.config.as_deref())?;
            let resolved = serde_json::json!({
                "url": config.url,
                "timeout": config.timeout,
                "headers": config.redacted_headers(),
            });
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
        Commands::Version => {
            println!("promcp {}", env!("CARGO_PKG_VERSION"));
            println!("promcp-core {}", promcp_core::VERSION);
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<PrometheusConfig> {
    PrometheusConfig::load_from(path).context("Could not resolve Prometheus configuration")
}
