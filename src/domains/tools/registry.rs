//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools
//! - Dispatch of name + argument pairs to the matching tool
//! - Tool metadata for listing

use std::sync::Arc;
use tracing::warn;

use rmcp::model::{CallToolResult, Tool};

use super::definitions::{RegistrarGastoParams, RegistrarGastoTool};
use super::error::ToolError;
use crate::domains::expenses::ExpenseRecorder;

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - manages all available tools.
///
/// Every transport funnels its tool invocations through here so that the
/// dispatch semantics (argument validation, unknown-tool handling) are
/// identical regardless of how the request arrived.
pub struct ToolRegistry {
    recorder: Arc<ExpenseRecorder>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new(recorder: Arc<ExpenseRecorder>) -> Self {
        Self { recorder }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![RegistrarGastoTool::NAME]
    }

    /// Get all tools as Tool models (metadata).
    ///
    /// This is the single source of truth for all available tools.
    /// Stable across calls: the descriptor set never changes at runtime.
    pub fn get_all_tools() -> Vec<Tool> {
        vec![RegistrarGastoTool::to_tool()]
    }

    /// Dispatch a tool call to the appropriate handler.
    ///
    /// Unknown tool names are an explicit error, and malformed arguments are
    /// rejected before any tool logic runs.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<CallToolResult, ToolError> {
        match name {
            RegistrarGastoTool::NAME => {
                let params: RegistrarGastoParams = serde_json::from_value(arguments)
                    .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;
                RegistrarGastoTool::execute(params, &self.recorder).await
            }
            _ => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolError::not_found(name))
            }
        }
    }
}
