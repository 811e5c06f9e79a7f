use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::{
    flagged::FlaggedVersions,
    logging::{LogHandle, LogLevel},
    scanner::WebServerScanner,
    transport::HttpTransport,
    types::ScanConfig,
};

#[derive(Clone)]
pub struct AppState {
    transport: Arc<dyn HttpTransport>,
    flagged_versions: Arc<FlaggedVersions>,
    log: Option<LogHandle>,
}

impl AppState {
    pub fn new(transport: Arc<dyn HttpTransport>, flagged_versions: FlaggedVersions) -> Self {
        Self {
            transport,
            flagged_versions: Arc::new(flagged_versions),
            log: None,
        }
    }

    /// Let requests change the global log level through their `log_level` field.
    pub fn with_log_handle(mut self, log: LogHandle) -> Self {
        self.log = Some(log);
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub ips: Vec<String>,
    #[serde(default = "default_true")]
    pub scan_software: bool,
    #[serde(default = "default_true")]
    pub scan_root: bool,
    #[serde(default = "default_true")]
    pub preserve_ips: bool,
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_true() -> bool {
    true
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/scan", post(post_scan))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the scan API on `bind` until `cancel` fires.
pub async fn spawn_server(bind: &str, state: AppState, cancel: CancellationToken) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("serving scan API on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;
    Ok(())
}

async fn post_scan(State(app): State<AppState>, Json(req): Json<ScanRequest>) -> impl IntoResponse {
    if let Some(log) = app.log.as_ref() {
        if let Err(e) = log.set_level(req.log_level) {
            warn!("{e:#}");
        }
    }

    let config = ScanConfig {
        addresses: req.ips,
        scan_software: req.scan_software,
        scan_root: req.scan_root,
        preserve_addresses: req.preserve_ips,
        flagged_versions: (*app.flagged_versions).clone(),
    };
    let scanner = WebServerScanner::new(config, app.transport.clone());

    match scanner.run().await {
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}
