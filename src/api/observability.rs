use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::api::{ApiError, AppState};

const SECURITY_HEADERS: [(&str, &str); 3] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
];

/// `GET /api/metrics` - Prometheus text exposition.
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    state
        .prometheus_handle
        .as_ref()
        .map(metrics_exporter_prometheus::PrometheusHandle::render)
        .ok_or_else(|| ApiError::NotFound("Metrics are disabled".to_string()))
}

struct RequestMeta {
    id: String,
    method: Method,
    path: String,
    /// Route template such as `/api/files`; keeps metric label cardinality bounded.
    route: Option<String>,
}

impl RequestMeta {
    fn from_request(req: &Request) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            route: req
                .extensions()
                .get::<MatchedPath>()
                .map(|mp| mp.as_str().to_string()),
        }
    }

    fn metrics_path(&self) -> &str {
        self.route.as_deref().unwrap_or(&self.path)
    }
}

fn outcome(status: StatusCode) -> &'static str {
    if status.is_server_error() {
        "error"
    } else if status.is_client_error() {
        "client_error"
    } else {
        "success"
    }
}

fn record_request(meta: &RequestMeta, status: StatusCode, elapsed: Duration) {
    let labels = [
        ("method", meta.method.to_string()),
        ("path", meta.metrics_path().to_string()),
        ("status", status.as_u16().to_string()),
    ];

    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels).record(elapsed.as_secs_f64());
}

/// Request span, access log line, metrics and an `x-request-id` response header.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let meta = RequestMeta::from_request(&req);
    let span = info_span!(
        "request",
        request_id = %meta.id,
        method = %meta.method,
        path = %meta.path,
        route = meta.route.as_deref(),
    );

    let start = Instant::now();
    let mut response = next.run(req).instrument(span.clone()).await;
    let elapsed = start.elapsed();
    let status = response.status();

    record_request(&meta, status, elapsed);

    span.in_scope(|| {
        info!(
            event = "http_request_finished",
            status_code = status.as_u16(),
            duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            outcome = outcome(status),
            "Request finished"
        );
    });

    if let Ok(value) = HeaderValue::from_str(&meta.id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

pub async fn security_headers_middleware(req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in SECURITY_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }

    response
}
