//! Tool Router - builds the rmcp ToolRouter from the tool definitions.
//!
//! The router serves the protocol transports (stdio/SSE). Each tool knows
//! how to create its own route; this module only wires them together.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use super::definitions::RegistrarGastoTool;
use crate::domains::expenses::ExpenseRecorder;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(recorder: Arc<ExpenseRecorder>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new().with_route(RegistrarGastoTool::create_route(recorder))
}
