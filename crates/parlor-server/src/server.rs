//! HTTP server: router construction, the WebSocket upgrade endpoint, health
//! and metrics endpoints, and startup.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::rooms::RoomRegistry;
use crate::websocket::connection;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    /// Owner of all room state.
    pub registry: Arc<RoomRegistry>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Server start time, for health uptime reporting.
    pub started_at: Instant,
    /// Handle for rendering the `/metrics` endpoint.
    pub metrics: PrometheusHandle,
}

impl AppState {
    /// Fresh state around an empty registry.
    pub fn new(config: ServerConfig, metrics: PrometheusHandle) -> Self {
        Self {
            registry: Arc::new(RoomRegistry::new()),
            config: Arc::new(config),
            started_at: Instant::now(),
            metrics,
        }
    }
}

/// Body of the `/health` endpoint.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the server is able to respond.
    pub status: &'static str,
    /// Seconds since startup.
    pub uptime_secs: u64,
    /// Currently registered WebSocket connections.
    pub connections: usize,
    /// Currently active rooms.
    pub rooms: usize,
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ws/{room}/{username}", get(ws_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn ws_handler(
    State(state): State<AppState>,
    Path((room, username)): Path<(String, String)>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.max_message_size(state.config.max_message_bytes)
        .on_upgrade(move |socket| connection::handle_socket(socket, room, username, state))
}

async fn health_handler(State(state): State<AppState>) -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
        connections: state.registry.connection_count().await,
        rooms: state.registry.room_count().await,
    })
}

async fn metrics_handler(State(state): State<AppState>) -> String {
    crate::metrics::render(&state.metrics)
}

/// A running server.
pub struct ServerHandle {
    /// The address actually bound (resolves port `0` requests).
    pub addr: SocketAddr,
    /// The server's room registry, exposed for inspection in tests.
    pub registry: Arc<RoomRegistry>,
    server: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Stop accepting and serving connections.
    pub fn shutdown(&self) {
        self.server.abort();
    }
}

/// Bind and start serving in a background task.
pub async fn start(config: ServerConfig, metrics: PrometheusHandle) -> std::io::Result<ServerHandle> {
    let bind_addr = config.bind_addr();
    let state = AppState::new(config, metrics);
    let registry = Arc::clone(&state.registry);
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "listening");

    let server = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router).await {
            error!(error = %err, "server error");
        }
    });

    Ok(ServerHandle {
        addr,
        registry,
        server,
    })
}
