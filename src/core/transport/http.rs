//! Streamable HTTP transport implementation.
//!
//! HTTP server with JSON-RPC over POST requests on a single MCP endpoint.
//! Each POST carries one JSON-RPC message and is answered with a JSON
//! response, so standard HTTP clients (curl, browsers, MCP SDK clients) can
//! talk to the server.
//!
//! Sessions: `initialize` allocates a session id returned in the
//! `Mcp-Session-Id` header. Later requests may echo it; an unknown or
//! expired id gets `404 Not Found`. Requests without the header are served
//! statelessly. The session table is bounded: idle sessions expire and the
//! least recently used one is evicted when the table is full.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument, warn};

use super::config::{HttpConfig, normalize_rpc_path, validate_rpc_path};
use super::{TransportError, TransportResult};
use crate::core::McpServer;
use crate::core::server::SERVER_INSTRUCTIONS;

/// Header carrying the MCP session id.
pub const SESSION_HEADER: HeaderName = HeaderName::from_static("mcp-session-id");

/// Protocol versions this transport can speak, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// Most sessions kept at once.
pub const MAX_SESSIONS: usize = 1024;

/// Sessions unused for this long are dropped.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Notifications carry no id and expect no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<serde_json::Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<serde_json::Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    /// Parse error: the body is not a JSON-RPC message.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::error(None, -32700, msg)
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<serde_json::Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<serde_json::Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg)
    }

    /// Internal error.
    pub fn internal_error(id: Option<serde_json::Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32603, msg)
    }
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The MCP server instance.
    server: McpServer,
    /// Path of the JSON-RPC endpoint.
    rpc_path: String,
    /// Live sessions keyed by session id.
    sessions: Arc<RwLock<HashMap<String, SessionState>>>,
    /// Most sessions kept at once.
    max_sessions: usize,
    /// Idle time after which a session expires.
    idle_timeout: Duration,
}

/// Session state for a client.
#[derive(Debug, Clone)]
struct SessionState {
    initialized: bool,
    protocol_version: String,
    last_seen: Instant,
}

impl AppState {
    /// Create state around a server with no sessions.
    pub fn new(server: McpServer, rpc_path: impl Into<String>) -> Self {
        Self {
            server,
            rpc_path: rpc_path.into(),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            max_sessions: MAX_SESSIONS,
            idle_timeout: SESSION_IDLE_TIMEOUT,
        }
    }

    /// Override the session table bounds.
    pub fn with_session_limits(mut self, max_sessions: usize, idle_timeout: Duration) -> Self {
        self.max_sessions = max_sessions.max(1);
        self.idle_timeout = idle_timeout;
        self
    }

    /// Number of live sessions, expired ones included until the next sweep.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Store a new session, making room for it first.
    async fn open_session(&self, id: String, protocol_version: &str) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let idle_timeout = self.idle_timeout;
        sessions.retain(|_, s| now.duration_since(s.last_seen) <= idle_timeout);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, s)| s.last_seen)
                .map(|(id, _)| id.clone());
            match oldest {
                Some(oldest) => {
                    debug!("Evicting least recently used session {}", oldest);
                    sessions.remove(&oldest);
                }
                None => break,
            }
        }

        sessions.insert(
            id,
            SessionState {
                initialized: false,
                protocol_version: protocol_version.to_string(),
                last_seen: now,
            },
        );
    }

    /// Mark a session as used. Returns false if it is unknown or expired.
    async fn touch_session(&self, id: &str) -> bool {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        match sessions.get_mut(id) {
            Some(s) if now.duration_since(s.last_seen) <= self.idle_timeout => {
                s.last_seen = now;
                true
            }
            Some(_) => {
                sessions.remove(id);
                info!("Session {} expired", id);
                false
            }
            None => false,
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
        self.config.address()
    }

    /// Build the axum router for this transport.
    ///
    /// Fails if the configured endpoint path cannot be mounted.
    pub fn router(&self, server: McpServer) -> TransportResult<Router> {
        let rpc_path = normalize_rpc_path(&self.config.rpc_path);
        validate_rpc_path(&rpc_path)?;
        Ok(self.router_with_state(AppState::new(server, rpc_path)))
    }

    fn router_with_state(&self, state: AppState) -> Router {
        let rpc_path = state.rpc_path.clone();

        let mut app = Router::new()
            .route(
                &rpc_path,
                post(handle_rpc).get(handle_stream).delete(handle_delete),
            )
            .route("/health", get(health_check));

        // Root info page, and the endpoint with the trailing slash some MCP clients send.
        if rpc_path != "/" {
            app = app.route("/", get(root_handler)).route(
                &format!("{rpc_path}/"),
                post(handle_rpc).get(handle_stream).delete(handle_delete),
            );
        }

        let mut app = app.with_state(state).layer(TraceLayer::new_for_http());

        // Add CORS if enabled
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers([SESSION_HEADER]);
            app = app.layer(cors);
        }

        app
    }

    /// Run the HTTP transport until Ctrl-C or SIGTERM.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = self.router(server)?;

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!(
            "Ready - listening on {} (streamable HTTP, CORS {})",
            addr, cors_status
        );
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → Health:   GET /health");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(TransportError::ServeError)?;

        info!("HTTP transport finished");
        Ok(())
    }
}

/// Resolve when the process is asked to stop.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "streamable HTTP",
        "endpoints": {
            "rpc": state.rpc_path,
            "health": "/health"
        },
        "protocol": "JSON-RPC 2.0",
        "documentation": format!("Send POST requests to {} with JSON-RPC messages", state.rpc_path)
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// The server never initiates messages, so there is no stream to open.
async fn handle_stream() -> impl IntoResponse {
    StatusCode::METHOD_NOT_ALLOWED
}

/// Terminate a session.
async fn handle_delete(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let Some(session_id) = session_id(&headers) else {
        return StatusCode::BAD_REQUEST;
    };

    match state.sessions.write().await.remove(&session_id) {
        Some(_) => {
            info!("Session {} terminated", session_id);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

/// Extract the session id header, if present and valid UTF-8.
fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(&SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method = tracing::field::Empty))]
async fn handle_rpc(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!("Unparsable JSON-RPC message: {}", e);
            let response = JsonRpcResponse::parse_error(format!("Parse error: {}", e));
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    tracing::Span::current().record("method", request.method.as_str());
    info!("Received JSON-RPC request: {}", request.method);

    let session = session_id(&headers);
    if let Some(id) = &session {
        if request.method != "initialize" && !state.touch_session(id).await {
            warn!("Unknown session: {}", id);
            return StatusCode::NOT_FOUND.into_response();
        }
    }

    if request.is_notification() {
        handle_notification(&state, session.as_deref(), &request).await;
        return StatusCode::ACCEPTED.into_response();
    }

    if request.method == "initialize" {
        return handle_initialize(&state, request).await;
    }

    let response = process_request(&state, request).await;
    (StatusCode::OK, Json(response)).into_response()
}

/// Process a JSON-RPC request and return the response.
async fn process_request(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    // Validate JSON-RPC version
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),

        // List available tools
        "tools/list" => handle_tools_list(state, request).await,

        // Call a tool
        "tools/call" => handle_tools_call(state, request).await,

        // Unknown method
        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

/// Pick the protocol version to answer `initialize` with.
fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|s| **s == v))
        .copied()
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
}

/// Handle initialize request: open a session and return capabilities.
async fn handle_initialize(state: &AppState, request: JsonRpcRequest) -> Response {
    info!("Processing initialize request");

    if request.jsonrpc != "2.0" {
        return (
            StatusCode::OK,
            Json(JsonRpcResponse::invalid_request(request.id)),
        )
            .into_response();
    }

    let requested = request
        .params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(|v| v.as_str());
    let protocol_version = negotiate_protocol_version(requested);

    let session_id = uuid::Uuid::new_v4().to_string();
    state.open_session(session_id.clone(), protocol_version).await;
    info!(
        "Session {} opened (protocol {})",
        session_id, protocol_version
    );

    let result = serde_json::json!({
        "protocolVersion": protocol_version,
        "capabilities": {
            "tools": {}
        },
        "serverInfo": {
            "name": state.server.name(),
            "version": state.server.version()
        },
        "instructions": SERVER_INSTRUCTIONS
    });

    let mut response =
        (StatusCode::OK, Json(JsonRpcResponse::success(request.id, result))).into_response();
    if let Ok(value) = HeaderValue::from_str(&session_id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

/// Handle tools/list request.
async fn handle_tools_list(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing tools/list request");

    let tools = state.server.list_tools();
    let result = serde_json::json!({
        "tools": tools
    });

    JsonRpcResponse::success(request.id, result)
}

/// Handle tools/call request.
async fn handle_tools_call(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Processing tools/call request");

    let params = match request.params {
        Some(p) => p,
        None => return JsonRpcResponse::invalid_params(request.id.clone(), "Missing params"),
    };

    let name = match params.get("name").and_then(|v| v.as_str()) {
        Some(n) => n.to_string(),
        None => return JsonRpcResponse::invalid_params(request.id.clone(), "Missing tool name"),
    };

    let arguments = params
        .get("arguments")
        .cloned()
        .unwrap_or(serde_json::json!({}));

    match state.server.call_tool(&name, arguments).await {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(e) if e.is_client_error() => JsonRpcResponse::invalid_params(request.id, e.to_string()),
        Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
    }
}

/// Handle notifications (no response body).
async fn handle_notification(state: &AppState, session: Option<&str>, request: &JsonRpcRequest) {
    match request.method.as_str() {
        "notifications/initialized" => {
            info!("Client sent initialized notification");
            if let Some(id) = session {
                if let Some(s) = state.sessions.write().await.get_mut(id) {
                    if !s.initialized {
                        s.initialized = true;
                        info!("Session {} ready (protocol {})", id, s.protocol_version);
                    }
                }
            }
        }
        _ => {
            info!("Received notification: {}", request.method);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use axum::body::Body;
    use http::Request;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_for(upstream: &str) -> Router {
        let mut config = Config::default();
        config.upstream.incidents_url = format!("{upstream}/en/incidents.json");
        HttpTransport::new(HttpConfig::default())
            .router(McpServer::new(config))
            .unwrap()
    }

    fn bounded_app(max_sessions: usize, idle_timeout: Duration) -> (Router, AppState) {
        let state = AppState::new(McpServer::new(Config::default()), "/mcp")
            .with_session_limits(max_sessions, idle_timeout);
        let app = HttpTransport::new(HttpConfig::default()).router_with_state(state.clone());
        (app, state)
    }

    fn ping(session: Option<&str>) -> Request<Body> {
        rpc(json!({ "jsonrpc": "2.0", "id": 9, "method": "ping" }), session)
    }

    fn rpc(body: Value, session: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .header("accept", "application/json, text/event-stream");
        if let Some(id) = session {
            builder = builder.header("mcp-session-id", id);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn initialize(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(rpc(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "method": "initialize",
                    "params": { "protocolVersion": "2025-03-26", "capabilities": {} }
                }),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get("mcp-session-id")
            .expect("session header")
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_negotiate_protocol_version() {
        assert_eq!(negotiate_protocol_version(Some("2024-11-05")), "2024-11-05");
        assert_eq!(negotiate_protocol_version(Some("1999-01-01")), "2025-06-18");
        assert_eq!(negotiate_protocol_version(None), "2025-06-18");
    }

    #[tokio::test]
    async fn test_initialize_returns_session_and_capabilities() {
        let app = app_for("http://127.0.0.1:1");
        let response = app
            .oneshot(rpc(
                json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize",
                        "params": { "protocolVersion": "2025-03-26" } }),
                None,
            ))
            .await
            .unwrap();

        assert!(response.headers().contains_key("mcp-session-id"));
        let body = json_body(response).await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["result"]["protocolVersion"], "2025-03-26");
        assert!(body["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_initialized_notification_is_accepted() {
        let app = app_for("http://127.0.0.1:1");
        let session = initialize(&app).await;

        let response = app
            .oneshot(rpc(
                json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }),
                Some(&session),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_tools_list_exposes_single_tool() {
        let app = app_for("http://127.0.0.1:1");
        let session = initialize(&app).await;

        let response = app
            .oneshot(rpc(
                json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" }),
                Some(&session),
            ))
            .await
            .unwrap();

        let body = json_body(response).await;
        let tools = body["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "get_security_incidents");
        assert!(!tools[0]["description"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tools_call_returns_upstream_json() {
        let upstream = MockServer::start().await;
        let feed = json!([
            { "year": 2025, "incident": [{ "type": "Web defacement", "number": 1 }] }
        ]);
        Mock::given(method("GET"))
            .and(path("/en/incidents.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&feed))
            .mount(&upstream)
            .await;

        let app = app_for(&upstream.uri());
        let session = initialize(&app).await;

        let response = app
            .oneshot(rpc(
                json!({ "jsonrpc": "2.0", "id": 3, "method": "tools/call",
                        "params": { "name": "get_security_incidents", "arguments": {} } }),
                Some(&session),
            ))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["result"]["isError"], false);
        let text = body["result"]["content"][0]["text"].as_str().unwrap();
        assert_eq!(serde_json::from_str::<Value>(text).unwrap(), feed);
    }

    #[tokio::test]
    async fn test_tools_call_upstream_failure_is_error_indicator() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&upstream)
            .await;

        let app = app_for(&upstream.uri());
        let response = app
            .oneshot(rpc(
                json!({ "jsonrpc": "2.0", "id": 4, "method": "tools/call",
                        "params": { "name": "get_security_incidents" } }),
                None,
            ))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert!(body["error"].is_null());
        let text = body["result"]["content"][0]["text"].as_str().unwrap();
        let payload: Value = serde_json::from_str(text).unwrap();
        assert!(!payload["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool() {
        let app = app_for("http://127.0.0.1:1");
        let response = app
            .oneshot(rpc(
                json!({ "jsonrpc": "2.0", "id": 5, "method": "tools/call",
                        "params": { "name": "nope" } }),
                None,
            ))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let app = app_for("http://127.0.0.1:1");
        let response = app
            .oneshot(rpc(
                json!({ "jsonrpc": "2.0", "id": 6, "method": "resources/list" }),
                None,
            ))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = app_for("http://127.0.0.1:1");
        let response = app
            .oneshot(rpc(
                json!({ "jsonrpc": "2.0", "id": 7, "method": "tools/list" }),
                Some("no-such-session"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_ends_session() {
        let app = app_for("http://127.0.0.1:1");
        let session = initialize(&app).await;

        let delete = |id: &str| {
            Request::builder()
                .method("DELETE")
                .uri("/mcp")
                .header("mcp-session-id", id)
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(delete(&session)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(delete(&session)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_trailing_slash_endpoint() {
        let app = app_for("http://127.0.0.1:1");
        let mut request = rpc(json!({ "jsonrpc": "2.0", "id": 8, "method": "ping" }), None);
        *request.uri_mut() = "/mcp/".parse().unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["result"], json!({}));
    }

    #[tokio::test]
    async fn test_get_on_endpoint_not_allowed() {
        let app = app_for("http://127.0.0.1:1");
        let response = app
            .oneshot(Request::builder().uri("/mcp").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = app_for("http://127.0.0.1:1");
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_session_table_is_bounded() {
        let (app, state) = bounded_app(4, SESSION_IDLE_TIMEOUT);

        for _ in 0..50 {
            initialize(&app).await;
        }

        assert_eq!(state.session_count().await, 4);
    }

    #[tokio::test]
    async fn test_least_recently_used_session_is_evicted() {
        let (app, _state) = bounded_app(2, SESSION_IDLE_TIMEOUT);
        let first = initialize(&app).await;
        let second = initialize(&app).await;

        // Using the first session makes the second one the oldest.
        let response = app.clone().oneshot(ping(Some(&first))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let third = initialize(&app).await;

        let response = app.clone().oneshot(ping(Some(&second))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        for id in [&first, &third] {
            let response = app.clone().oneshot(ping(Some(id))).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_idle_session_expires() {
        let (app, state) = bounded_app(MAX_SESSIONS, Duration::from_millis(20));
        let session = initialize(&app).await;

        tokio::time::sleep(Duration::from_millis(60)).await;

        let response = app.clone().oneshot(ping(Some(&session))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(state.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_requests_before_initialized_notification_are_served() {
        let app = app_for("http://127.0.0.1:1");
        let session = initialize(&app).await;

        let response = app.oneshot(ping(Some(&session))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let app = app_for("http://127.0.0.1:1");
        let request = Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_rpc_path_without_leading_slash_is_mounted() {
        let transport = HttpTransport::new(HttpConfig {
            rpc_path: "mcp".to_string(),
            ..HttpConfig::default()
        });
        let app = transport.router(McpServer::new(Config::default())).unwrap();

        let response = app.oneshot(ping(None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_rpc_path_on_health_route_is_rejected() {
        let transport = HttpTransport::new(HttpConfig {
            rpc_path: "/health".to_string(),
            ..HttpConfig::default()
        });
        let err = transport
            .router(McpServer::new(Config::default()))
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_bind_failure_is_reported() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let transport = HttpTransport::new(HttpConfig {
            port,
            ..HttpConfig::default()
        });
        let err = transport
            .run(McpServer::new(Config::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::BindError { .. }));
    }
}
