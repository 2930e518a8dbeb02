use serde::{Deserialize, Serialize};

use crate::models::StoredFileInfo;
use crate::services::ProviderSummary;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    #[serde(default)]
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MediaActionRequest {
    #[serde(default)]
    pub action: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MediaListDto {
    pub files: Vec<StoredFileInfo>,
    pub count: usize,
}

impl From<Vec<StoredFileInfo>> for MediaListDto {
    fn from(files: Vec<StoredFileInfo>) -> Self {
        Self {
            count: files.len(),
            files,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MediaActionDto {
    pub action: String,
    pub message: String,
    #[serde(flatten)]
    pub list: MediaListDto,
}

#[derive(Debug, Deserialize)]
pub struct DownloaderRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: String,
    pub version: String,
    pub uptime: u64,
    pub providers: ProviderSummary,
}
