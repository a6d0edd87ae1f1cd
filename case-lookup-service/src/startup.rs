//! Router assembly and server lifecycle.

use crate::config::LookupConfig;
use crate::handlers::{
    app::{health_check, index},
    case::get_case,
    metrics::metrics,
};
use crate::services::{GoogleSheetsClient, ServiceAccountAuth, SpreadsheetSource};
use crate::AppState;
use axum::{
    http::{header, HeaderValue, Method, Request},
    middleware::from_fn,
    routing::get,
    Router,
};
use reqwest::Client;
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// CORS policy: the configured frontend origins, credentialed, GET/POST/OPTIONS.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<HeaderValue>>();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ORIGIN,
            header::ACCEPT,
        ])
        .allow_credentials(true)
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security.allowed_origins);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/case/:year/:ack_number", get(get_case))
        .route_layer(from_fn(metrics_middleware))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

/// Build the shared HTTP client, credentials and Sheets client once for the process.
pub fn build_sheets_client(config: &LookupConfig) -> Result<Arc<dyn SpreadsheetSource>, AppError> {
    let http = Client::builder()
        .timeout(Duration::from_secs(config.sheets.request_timeout_secs))
        .build()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

    let auth = ServiceAccountAuth::new(&config.credentials, http.clone())
        .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

    let sheets = GoogleSheetsClient::new(&config.sheets, Arc::new(auth), http)
        .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

    tracing::info!(
        api_base_url = %config.sheets.api_base_url,
        timeout_secs = config.sheets.request_timeout_secs,
        "Initialized Google Sheets client"
    );

    Ok(Arc::new(sheets))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build with the real Google Sheets client.
    pub async fn build(config: LookupConfig) -> Result<Self, AppError> {
        let sheets = build_sheets_client(&config)?;
        Self::build_with_source(config, sheets).await
    }

    /// Build around any spreadsheet source (port 0 = random port for testing).
    pub async fn build_with_source(
        config: LookupConfig,
        sheets: Arc<dyn SpreadsheetSource>,
    ) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        let router = build_router(AppState::new(config, sheets));

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until `shutdown` resolves, letting in-flight requests finish.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(port = self.port, "Server is running");

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
