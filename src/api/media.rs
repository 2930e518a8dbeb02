use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;
use tracing::info;

use super::events::HubEvent;
use super::validation::{MediaAction, validate_media_action};
use super::{
    ApiError, ApiResponse, AppState, MediaActionDto, MediaActionRequest, MediaListDto,
};

/// `GET /api/media`
pub async fn list_media(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<MediaListDto>>, ApiError> {
    let files = state.shared.media.list().await?;
    Ok(Json(ApiResponse::success(files.into())))
}

/// `POST /api/media` with `{"action": "download" | "list"}`
pub async fn media_action(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MediaActionRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<MediaActionDto>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let action = validate_media_action(request.action.as_deref())?;

    let dto = match action {
        MediaAction::Download => {
            let files = state.shared.media.generate_batch().await?;
            info!(count = files.len(), "Sample media generated");

            state.hub().publish(HubEvent::MediaGenerated {
                files: files.iter().map(|f| f.name.clone()).collect(),
            });

            MediaActionDto {
                action: "download".to_string(),
                message: format!("Generated {} sample files", files.len()),
                list: files.into(),
            }
        }
        MediaAction::List => {
            let files = state.shared.media.list().await?;
            MediaActionDto {
                action: "list".to_string(),
                message: format!("{} files in library", files.len()),
                list: files.into(),
            }
        }
    };

    Ok(Json(ApiResponse::success(dto)))
}
