use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::services::ProviderRegistry;
use crate::state::{SharedState, build_shared_http_client};

mod chat;
mod downloader;
mod error;
pub mod events;
mod files;
mod media;
mod observability;
mod system;
mod types;
mod validation;

pub use error::ApiError;
pub use events::{HubEvent, MessagingHub};
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn hub(&self) -> &MessagingHub {
        &self.shared.hub
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Builds state around an explicit provider registry, ignoring the
/// configured upstreams.
pub async fn create_app_state_with_providers(
    config: Config,
    providers: ProviderRegistry,
) -> anyhow::Result<Arc<AppState>> {
    let http = build_shared_http_client(config.search.request_timeout_seconds)?;
    let shared = Arc::new(SharedState::with_providers(config, providers, http).await?);
    Ok(create_app_state(shared, None))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let api_router = Router::new()
        .route("/chat", post(chat::chat))
        .route("/files", get(files::get_file))
        .route("/media", get(media::list_media).post(media::media_action))
        .route("/downloader", post(downloader::analyze))
        .route("/health", get(system::health))
        .route("/metrics", get(observability::get_metrics))
        .merge(events::router())
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}
