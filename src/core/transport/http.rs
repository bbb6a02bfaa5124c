//! HTTP transport implementation.
//!
//! One axum application serves both HTTP-facing adapters:
//!
//! - the SSE streaming adapter for long-lived MCP clients (`GET /sse` opens
//!   the channel, `POST /messages` carries the client frames), and
//! - the single-shot adapter (`POST /chatgpt`) for plain HTTP clients.
//!
//! The single-shot adapter accepts either a flat JSON body or a
//! `{"params": {...}}`-wrapped one, always dispatches through the tool
//! registry, and answers with a `{status, message}` envelope: 200 on
//! success, 400 on any parse or dispatch failure.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rmcp::model::{CallToolResult, RawContent};
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;
use crate::domains::tools::definitions::RegistrarGastoTool;

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The MCP server instance.
    server: McpServer,
}

impl AppState {
    /// Create state around the given server.
    pub fn new(server: McpServer) -> Self {
        Self { server }
    }
}

/// Response envelope for the single-shot adapter.
#[derive(Debug, Serialize, Deserialize)]
pub struct GastoResponse {
    /// `"ok"` or `"error"`.
    pub status: String,

    /// Outcome text or failure description.
    pub message: String,
}

impl GastoResponse {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
        }
    }
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| TransportError::init(format!("invalid bind address: {e}")))?;

        let ct = CancellationToken::new();
        let (sse_server, sse_router) = SseServer::new(SseServerConfig {
            bind: addr,
            sse_path: self.config.sse_path.clone(),
            post_path: self.config.post_path.clone(),
            ct: ct.clone(),
            sse_keep_alive: None,
        });

        // Every new SSE connection gets its own handle onto the same server.
        let protocol_server = server.clone();
        sse_server.with_service(move || protocol_server.clone());

        let state = AppState::new(server);
        let mut app = sse_router.merge(rest_router(state));

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| TransportError::bind(addr.to_string(), e))?;

        info!("Ready - listening on {}", addr);
        info!("  → SSE stream:  GET  {}", self.config.sse_path);
        info!("  → SSE frames:  POST {}", self.config.post_path);
        info!("  → Single-shot: POST /chatgpt");
        info!("  → Health:      GET  /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        ct.cancel();
        Ok(())
    }
}

/// Build the router for the non-streaming routes.
pub fn rest_router(state: AppState) -> Router {
    Router::new()
        .route("/chatgpt", post(chatgpt_handler))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Handle a single-shot expense registration.
#[instrument(skip_all)]
async fn chatgpt_handler(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> (StatusCode, Json<GastoResponse>) {
    let Json(body) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            warn!("Rejected single-shot request: {}", rejection.body_text());
            return bad_request(rejection.body_text());
        }
    };

    // Accept either {"params": {...}} or the arguments at the top level.
    let arguments = match body.get("params") {
        Some(params) if params.is_object() => params.clone(),
        Some(_) => return bad_request("'params' must be a JSON object"),
        None if body.is_object() => body,
        None => return bad_request("request body must be a JSON object"),
    };

    info!("Single-shot expense registration");

    match state
        .server
        .call_tool(RegistrarGastoTool::NAME, arguments)
        .await
    {
        Ok(result) => match first_text(&result) {
            Some(text) => (StatusCode::OK, Json(GastoResponse::ok(text))),
            None => bad_request("tool produced no text content"),
        },
        Err(e) => {
            warn!("Single-shot dispatch failed: {}", e);
            bad_request(e.to_string())
        }
    }
}

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<GastoResponse>) {
    (StatusCode::BAD_REQUEST, Json(GastoResponse::error(message)))
}

/// First text content item of a tool result, if any.
fn first_text(result: &CallToolResult) -> Option<&str> {
    result.content.first().and_then(|c| match &c.raw {
        RawContent::Text(t) => Some(t.text.as_str()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{Config, SupabaseConfig};
    use crate::core::transport::TransportConfig;
    use crate::domains::expenses::{ExpenseError, ExpenseRecorder, ExpenseSink, NewExpense};
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    struct MemorySink {
        rows: Mutex<Vec<NewExpense>>,
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
            Err(ExpenseError::persistence("row level security violation"))
        }
    }

    fn test_router(sink: Arc<dyn ExpenseSink>) -> Router {
        let config = Config {
            server: Default::default(),
            supabase: SupabaseConfig {
                url: "https://example.supabase.co".to_string(),
                anon_key: "anon".to_string(),
                table: "gastos".to_string(),
                timeout_secs: 10,
            },
            logging: Default::default(),
            transport: TransportConfig::default(),
        };
        let recorder = Arc::new(ExpenseRecorder::new(sink));
        rest_router(AppState::new(McpServer::new(config, recorder)))
    }

    fn memory_sink() -> Arc<MemorySink> {
        Arc::new(MemorySink {
            rows: Mutex::new(Vec::new()),
        })
    }

    fn json_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chatgpt")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_envelope(response: axum::response::Response) -> GastoResponse {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_chatgpt_flat_body() {
        let sink = memory_sink();
        let app = test_router(sink.clone());

        let response = app
            .oneshot(json_request(r#"{"producto":"Pan","valor_cop":5000}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let envelope = response_envelope(response).await;
        assert_eq!(envelope.status, "ok");
        assert_eq!(envelope.message, "✅ Registrado: Pan por $5,000 COP.");
        assert_eq!(sink.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_chatgpt_params_wrapped_body() {
        let sink = memory_sink();
        let app = test_router(sink.clone());

        let body = r#"{"params":{"producto":"Café","valor_cop":15000,"descripcion":"tinto"}}"#;
        let response = app.oneshot(json_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let envelope = response_envelope(response).await;
        assert_eq!(envelope.status, "ok");
        assert_eq!(envelope.message, "✅ Registrado: Café por $15,000 COP.");

        let rows = sink.rows.lock().unwrap();
        assert_eq!(rows[0].descripcion, "tinto");
    }

    #[tokio::test]
    async fn test_chatgpt_missing_producto_is_400() {
        let app = test_router(memory_sink());

        let response = app
            .oneshot(json_request(r#"{"valor_cop":5000}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let envelope = response_envelope(response).await;
        assert_eq!(envelope.status, "error");
    }

    #[tokio::test]
    async fn test_chatgpt_malformed_json_is_400() {
        let app = test_router(memory_sink());

        let response = app.oneshot(json_request("{not json")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let envelope = response_envelope(response).await;
        assert_eq!(envelope.status, "error");
    }

    #[tokio::test]
    async fn test_chatgpt_persistence_failure_is_ok_with_error_text() {
        // Persistence failures are a text outcome, not a transport error.
        let app = test_router(Arc::new(FailingSink));

        let response = app
            .oneshot(json_request(r#"{"producto":"Pan","valor_cop":5000}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let envelope = response_envelope(response).await;
        assert_eq!(envelope.status, "ok");
        assert!(envelope.message.starts_with("❌ Error:"));
        assert!(envelope.message.contains("row level security violation"));
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_router(memory_sink());

        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
