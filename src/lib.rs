//! Expense MCP Server Library
//!
//! This crate provides an MCP (Model Context Protocol) server that records
//! expenses in Colombian pesos to a Supabase table. One tool,
//! `registrar_gasto`, is exposed uniformly across three transport adapters:
//! an SSE streaming channel, stdio framing for subprocess clients, and a
//! single-shot HTTP POST route.
//!
//! # Architecture
//!
//! - **core**: Configuration, error handling, the server handler, and the
//!   transport layer
//! - **domains**: Business logic organized by bounded contexts
//!   - **expenses**: The recorder and the persistence sink boundary
//!   - **tools**: Tool definitions, registry, and dispatch
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gastos_mcp_server::core::{Config, McpServer};
//! use gastos_mcp_server::domains::expenses::{ExpenseRecorder, SupabaseSink};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let sink = Arc::new(SupabaseSink::new(&config.supabase)?);
//!     let recorder = Arc::new(ExpenseRecorder::new(sink));
//!     let server = McpServer::new(config, recorder);
//!     // Start the server...
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
