use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, extract::State, response::Html, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{self, SessionStore};
use crate::backend::PlacesBackend;
use crate::config::PlaceMapConfig;
use crate::page::Page;

const INDEX_HTML: &str = include_str!("../assets/index.html");
const SESSION_PLACEHOLDER: &str = "{{SESSION_ID}}";

/// Shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub backend: Arc<dyn PlacesBackend>,
    pub config: Arc<PlaceMapConfig>,
}

impl AppState {
    pub fn new(config: PlaceMapConfig, backend: Arc<dyn PlacesBackend>) -> Self {
        Self {
            sessions: SessionStore::new(config.web.max_sessions),
            backend,
            config: Arc::new(config),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .nest("/api", api::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Every page load mounts a fresh set of widgets
async fn index(State(state): State<AppState>) -> Html<String> {
    let id = state.sessions.mount(Page::new(&state.config)).await;
    Html(INDEX_HTML.replace(SESSION_PLACEHOLDER, &id.to_string()))
}

async fn health() -> &'static str {
    "ok"
}

pub async fn run(config: PlaceMapConfig, backend: Arc<dyn PlacesBackend>) -> Result<()> {
    let addr = format!("{}:{}", config.web.host, config.web.port);
    let port = config.web.port;
    let app = app(AppState::new(config, backend));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://localhost:{}", port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down web server");
}
