//! MCP Server implementation and lifecycle management.
//!
//! This module contains the main server handler that implements the MCP
//! protocol. The protocol transports (stdio/SSE) route tool calls through
//! the rmcp ToolRouter; the single-shot HTTP adapter goes through the
//! ToolRegistry. Both are built from the same tool definitions, so every
//! transport sees identical dispatch semantics.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, handler::server::tool::ToolRouter, model::*,
    service::RequestContext, tool_handler,
};
use std::sync::Arc;

use super::config::Config;
use crate::domains::expenses::ExpenseRecorder;
use crate::domains::tools::build_tool_router;

#[cfg(feature = "http")]
use crate::domains::tools::{ToolError, ToolRegistry};

/// The main MCP server handler.
///
/// Implements the `ServerHandler` trait from rmcp and carries the
/// constructor-injected expense recorder shared by all transports.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// The expense write path shared by every transport.
    recorder: Arc<ExpenseRecorder>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration and recorder.
    pub fn new(config: Config, recorder: Arc<ExpenseRecorder>) -> Self {
        Self {
            tool_router: build_tool_router::<Self>(recorder.clone()),
            config: Arc::new(config),
            recorder,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    // ========================================================================
    // Single-shot HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for the single-shot HTTP adapter).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for the single-shot HTTP adapter).
    #[cfg(feature = "http")]
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, ToolError> {
        let registry = ToolRegistry::new(self.recorder.clone());
        registry.call_tool(name, arguments).await
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Gestor de gastos: registra gastos en pesos colombianos con la \
                 herramienta registrar_gasto."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
