//! Expense registration tool definition.
//!
//! The single tool this server exposes: records one expense row per call.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{CallToolResult, Content, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::super::error::ToolError;
use crate::domains::expenses::{ExpenseRecorder, NewExpense};

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the expense registration tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RegistrarGastoParams {
    /// Name of the product or service purchased.
    pub producto: String,

    /// Amount in Colombian pesos.
    pub valor_cop: f64,

    /// Optional note about the expense.
    #[serde(default)]
    pub descripcion: String,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Expense registration tool - records an expense in Colombian pesos.
pub struct RegistrarGastoTool;

impl RegistrarGastoTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "registrar_gasto";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Registra un gasto en pesos colombianos";

    /// Execute the tool logic.
    ///
    /// Validation failures come back as a typed error so transports can map
    /// them to their own invalid-argument surface. A persistence failure is
    /// not an error at this boundary: it becomes the uniform "❌ Error" text
    /// outcome, so every transport reports it the same way.
    #[instrument(skip_all, fields(producto = %params.producto))]
    pub async fn execute(
        params: RegistrarGastoParams,
        recorder: &ExpenseRecorder,
    ) -> Result<CallToolResult, ToolError> {
        info!("Registering expense: {}", params.producto);

        let expense = NewExpense::new(params.producto, params.valor_cop, params.descripcion)
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        let text = match recorder.record(&expense).await {
            Ok(message) => message,
            Err(e) => format!("❌ Error: {e}"),
        };

        Ok(CallToolResult {
            content: vec![Content::text(text)],
            structured_content: None,
            is_error: Some(false),
            meta: None,
        })
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<RegistrarGastoParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for the protocol transports (stdio/SSE).
    pub fn create_route<S>(recorder: Arc<ExpenseRecorder>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let recorder = recorder.clone();
            async move {
                let params: RegistrarGastoParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Self::execute(params, &recorder)
                    .await
                    .map_err(|e| McpError::invalid_params(e.to_string(), None))
            }
            .boxed()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::expenses::{ExpenseError, ExpenseSink};
    use std::sync::Mutex;

    struct MemorySink {
        rows: Mutex<Vec<NewExpense>>,
    }

    impl MemorySink {
        fn new() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl ExpenseSink for MemorySink {
        async fn insert(&self, expense: &NewExpense) -> Result<(), ExpenseError> {
            self.rows.lock().unwrap().push(expense.clone());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait::async_trait]
    impl ExpenseSink for FailingSink {
        async fn insert(&self, _expense: &NewExpense) -> Result<(), ExpenseError> {
            Err(ExpenseError::persistence("duplicate key value"))
        }
    }

    fn first_text(result: &CallToolResult) -> &str {
        match &result.content[0].raw {
            rmcp::model::RawContent::Text(t) => &t.text,
            _ => panic!("Expected text content"),
        }
    }

    #[tokio::test]
    async fn test_execute_success_message() {
        let recorder = ExpenseRecorder::new(Arc::new(MemorySink::new()));
        let params = RegistrarGastoParams {
            producto: "Café".to_string(),
            valor_cop: 15000.0,
            descripcion: String::new(),
        };

        let result = RegistrarGastoTool::execute(params, &recorder).await.unwrap();
        assert_eq!(result.content.len(), 1);
        assert_eq!(first_text(&result), "✅ Registrado: Café por $15,000 COP.");
    }

    #[tokio::test]
    async fn test_execute_persistence_failure_becomes_text() {
        let recorder = ExpenseRecorder::new(Arc::new(FailingSink));
        let params = RegistrarGastoParams {
            producto: "Café".to_string(),
            valor_cop: 1000.0,
            descripcion: String::new(),
        };

        let result = RegistrarGastoTool::execute(params, &recorder).await.unwrap();
        let text = first_text(&result);
        assert!(text.starts_with("❌ Error:"));
        assert!(text.contains("duplicate key value"));
    }

    #[tokio::test]
    async fn test_execute_rejects_empty_product() {
        let recorder = ExpenseRecorder::new(Arc::new(MemorySink::new()));
        let params = RegistrarGastoParams {
            producto: "  ".to_string(),
            valor_cop: 1000.0,
            descripcion: String::new(),
        };

        let err = RegistrarGastoTool::execute(params, &recorder).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[tokio::test]
    async fn test_execute_rejects_negative_amount() {
        let recorder = ExpenseRecorder::new(Arc::new(MemorySink::new()));
        let params = RegistrarGastoParams {
            producto: "Pan".to_string(),
            valor_cop: -5.0,
            descripcion: String::new(),
        };

        let err = RegistrarGastoTool::execute(params, &recorder).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn test_params_description_defaults_to_empty() {
        let params: RegistrarGastoParams =
            serde_json::from_value(serde_json::json!({ "producto": "Pan", "valor_cop": 5000 }))
                .unwrap();
        assert_eq!(params.descripcion, "");
    }

    #[test]
    fn test_params_missing_required_field_fails() {
        let result: Result<RegistrarGastoParams, _> =
            serde_json::from_value(serde_json::json!({ "valor_cop": 5000 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_required_fields() {
        let tool = RegistrarGastoTool::to_tool();
        let schema = serde_json::to_value(tool.input_schema.as_ref()).unwrap();

        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required.len(), 2);
        assert!(required.contains(&"producto"));
        assert!(required.contains(&"valor_cop"));

        assert_eq!(schema["properties"]["producto"]["type"], "string");
        assert_eq!(schema["properties"]["valor_cop"]["type"], "number");
        assert_eq!(schema["properties"]["descripcion"]["type"], "string");
    }
}
