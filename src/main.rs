//! cloudlog demo service.
//!
//! A minimal HTTP service that relays log requests through request-scoped
//! loggers, so the trace header handling and stream routing can be seen
//! end to end on Cloud Run.

use std::sync::Arc;

use axum::{
    extract::FromRef,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use config::{Config as ConfigLoader, ConfigError, Environment};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use cloudlog::{LogConfig, Logger, RequestLogger, Severity};

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl ServerConfig {
    /// Load from `CLOUDLOG_SERVER__*`, honouring Cloud Run's `PORT`.
    fn load() -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(Environment::with_prefix("CLOUDLOG_SERVER").separator("__"))
            .set_override_option("port", std::env::var("PORT").ok())?
            .build()?
            .try_deserialize()
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    log_config: Arc<LogConfig>,
}

impl FromRef<AppState> for Arc<LogConfig> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.log_config)
    }
}

/// Body of `POST /log`.
#[derive(Debug, Deserialize)]
struct LogRequest {
    #[serde(default)]
    severity: Option<String>,
    message: String,
    #[serde(default)]
    payload: Option<Value>,
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn relay_log(logger: RequestLogger, Json(request): Json<LogRequest>) -> StatusCode {
    relay(&logger, &request)
}

/// Write `request` through `logger`, rejecting unknown severity names.
fn relay(logger: &Logger, request: &LogRequest) -> StatusCode {
    let severity = match request.severity.as_deref().map(str::parse::<Severity>) {
        None => Severity::DEFAULT,
        Some(Ok(severity)) => severity,
        Some(Err(e)) => {
            logger.warningf(format_args!("Rejected log request: {}", e));
            return StatusCode::BAD_REQUEST;
        }
    };

    match &request.payload {
        Some(payload) => logger.log_json(severity, &request.message, payload),
        None => logger.log(severity, &request.message),
    }
    StatusCode::NO_CONTENT
}

fn build_router(log_config: Arc<LogConfig>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/log", post(relay_log))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { log_config })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is expected in production
    let _ = dotenvy::dotenv();

    let log_config = LogConfig::load()?;
    cloudlog::init_tracing(&log_config)?;
    cloudlog::global::init(log_config.clone())?;

    let server = ServerConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load server configuration");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    tracing::info!(
        project_id = log_config.project_id().unwrap_or("-"),
        "Starting cloudlog demo v{}",
        env!("CARGO_PKG_VERSION")
    );

    let addr = format!("{}:{}", server.host, server.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, build_router(Arc::new(log_config))).await?;

    Ok(())
}
