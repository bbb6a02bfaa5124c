//! Expense MCP Server Entry Point
//!
//! Initializes logging, loads configuration, wires the Supabase sink into
//! the recorder, and starts the server with the configured transport.

use anyhow::Result;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use gastos_mcp_server::core::{Config, McpServer, TransportService};
use gastos_mcp_server::domains::expenses::{ExpenseRecorder, SupabaseSink};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment; missing Supabase credentials
    // abort startup here.
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);

    // Wire the persistence sink into the recorder and the server
    let sink = Arc::new(SupabaseSink::new(&config.supabase)?);
    let recorder = Arc::new(ExpenseRecorder::new(sink));
    let transport = TransportService::new(config.transport.clone());
    let server = McpServer::new(config, recorder);

    info!("Server initialized");

    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr so the stdio transport's stdout carries nothing but
/// protocol frames.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
