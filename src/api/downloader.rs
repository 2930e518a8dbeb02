use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;

use super::events::HubEvent;
use super::validation::validate_source_url;
use super::{ApiError, ApiResponse, AppState, DownloaderRequest};
use crate::models::{DownloadRequest, Platform};
use crate::services::DownloadAnalysis;

/// `POST /api/downloader` with `{"url", "platform", "quality"?}`
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<DownloaderRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<DownloadAnalysis>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::validation(e.body_text()))?;

    let source_url = validate_source_url(request.url.as_deref())?;
    let platform: Platform = request
        .platform
        .as_deref()
        .ok_or_else(|| ApiError::validation("Platform is required"))?
        .parse()
        .map_err(ApiError::validation)?;

    let analysis = state.shared.downloader.analyze(&DownloadRequest {
        source_url: source_url.to_string(),
        platform,
        requested_quality: request.quality,
    })?;

    state.hub().publish(HubEvent::DownloadAnalyzed {
        platform: analysis.platform,
        media_id: analysis.media_id.clone(),
    });

    Ok(Json(ApiResponse::success(analysis)))
}
