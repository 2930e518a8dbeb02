use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::events::HubEvent;
use super::validation::validate_filename;
use super::{ApiError, AppState, FileQuery};

/// `GET /api/files?filename=<name>`
///
/// Streams a stored file as an attachment. Missing files with a
/// synthesizable extension are generated, stored and then served.
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FileQuery>,
) -> Result<Response, ApiError> {
    let filename = validate_filename(query.filename.as_deref())?;

    let file = state.shared.media.fetch_or_synthesize(filename).await?;

    if file.synthesized {
        state.hub().publish(HubEvent::FileSynthesized {
            filename: filename.to_string(),
        });
    }

    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, file.bytes.len().to_string()),
        ],
        file.bytes,
    )
        .into_response())
}
