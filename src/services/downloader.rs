//! Link analysis for the media downloader.
//!
//! Nothing is fetched from the platforms. A link is validated against the
//! platform's host allow-list, its identifier extracted, and a list of
//! download options fabricated. Each option points at `/api/files` with a
//! filename that the media service can synthesize on demand.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::models::{DownloadRequest, Platform};
use crate::parser::size::format_size;
use crate::parser::url::{extract_media_id, host_allowed};

#[derive(Debug, Error)]
pub enum DownloaderError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL host is not a {0} address")]
    UnsupportedHost(Platform),

    #[error("Could not find a {0} media identifier in the URL")]
    MissingIdentifier(Platform),
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadOption {
    pub quality: String,
    pub format: String,
    pub size_estimate: String,
    pub size_bytes: u64,
    pub filename: String,
    pub download_url: String,
    pub available: bool,
    pub popularity: u32,
    pub recommended: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadAnalysis {
    pub platform: Platform,
    pub media_id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub source_url: String,
    pub options: Vec<DownloadOption>,
    pub generated_at: DateTime<Utc>,
}

/// (quality, format, nominal size in bytes)
type OptionTemplate = (&'static str, &'static str, u64);

const MB: u64 = 1024 * 1024;

const YOUTUBE_OPTIONS: &[OptionTemplate] = &[
    ("1080p", "mp4", 85 * MB),
    ("720p", "mp4", 45 * MB),
    ("480p", "mp4", 25 * MB),
    ("360p", "mp4", 15 * MB),
    ("audio", "wav", 5 * MB),
];

const TIKTOK_OPTIONS: &[OptionTemplate] = &[
    ("1080p", "mp4", 20 * MB),
    ("720p", "mp4", 12 * MB),
    ("audio", "wav", 2 * MB),
];

const INSTAGRAM_OPTIONS: &[OptionTemplate] = &[
    ("1080p", "mp4", 18 * MB),
    ("720p", "mp4", 10 * MB),
    ("photo", "jpg", 2 * MB),
];

const fn templates(platform: Platform) -> &'static [OptionTemplate] {
    match platform {
        Platform::Youtube => YOUTUBE_OPTIONS,
        Platform::Tiktok => TIKTOK_OPTIONS,
        Platform::Instagram => INSTAGRAM_OPTIONS,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DownloaderService;

impl DownloaderService {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub fn analyze(&self, request: &DownloadRequest) -> Result<DownloadAnalysis, DownloaderError> {
        let platform = request.platform;
        let url = Url::parse(request.source_url.trim())
            .map_err(|e| DownloaderError::InvalidUrl(e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(DownloaderError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }

        if !host_allowed(platform, &url) {
            return Err(DownloaderError::UnsupportedHost(platform));
        }

        let media_id =
            extract_media_id(platform, &url).ok_or(DownloaderError::MissingIdentifier(platform))?;

        let options = build_options(platform, &media_id, request.requested_quality.as_deref());

        info!(
            platform = %platform,
            media_id = %media_id,
            options = options.len(),
            "Analyzed download link"
        );

        Ok(DownloadAnalysis {
            title: format!("{} media {media_id}", platform.display_name()),
            thumbnail_url: thumbnail_url(platform, &media_id),
            source_url: url.to_string(),
            platform,
            media_id,
            options,
            generated_at: Utc::now(),
        })
    }
}

fn thumbnail_url(platform: Platform, media_id: &str) -> String {
    match platform {
        Platform::Youtube => format!("https://i.ytimg.com/vi/{media_id}/hqdefault.jpg"),
        Platform::Tiktok | Platform::Instagram => {
            files_url(&format!("{}_{media_id}_thumb.jpg", platform.as_str()))
        }
    }
}

fn files_url(filename: &str) -> String {
    format!("/api/files?filename={}", urlencoding::encode(filename))
}

fn build_options(
    platform: Platform,
    media_id: &str,
    requested: Option<&str>,
) -> Vec<DownloadOption> {
    let mut rng = rand::rng();

    let mut options: Vec<DownloadOption> = templates(platform)
        .iter()
        .enumerate()
        .map(|(i, (quality, format, nominal))| {
            // nominal +/- 20%
            let size_bytes = nominal * rng.random_range(80_u64..=120) / 100;
            let filename = format!("{}_{media_id}_{quality}.{format}", platform.as_str());

            DownloadOption {
                quality: (*quality).to_string(),
                format: (*format).to_string(),
                size_estimate: format_size(size_bytes),
                size_bytes,
                download_url: files_url(&filename),
                filename,
                available: i == 0 || rng.random_bool(0.85),
                popularity: rng.random_range(100..=50_000),
                recommended: false,
            }
        })
        .collect();

    let requested = requested
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .and_then(|q| options.iter().position(|o| o.quality.eq_ignore_ascii_case(q)));

    let pick = requested.or_else(|| options.iter().position(|o| o.available));
    if let Some(i) = pick {
        options[i].recommended = true;
        options[i].available = true;
    }

    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str, platform: Platform, quality: Option<&str>) -> DownloadRequest {
        DownloadRequest {
            source_url: url.to_string(),
            platform,
            requested_quality: quality.map(ToString::to_string),
        }
    }

    #[test]
    fn test_youtube_analysis() {
        let analysis = DownloaderService::new()
            .analyze(&request(
                "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
                Platform::Youtube,
                None,
            ))
            .unwrap();

        assert_eq!(analysis.media_id, "dQw4w9WgXcQ");
        assert_eq!(analysis.options.len(), 5);
        assert_eq!(analysis.options[0].filename, "youtube_dQw4w9WgXcQ_1080p.mp4");
        assert_eq!(
            analysis.options[0].download_url,
            "/api/files?filename=youtube_dQw4w9WgXcQ_1080p.mp4"
        );
        assert!(analysis.options[0].available);
        assert!(analysis.options[0].recommended);
        assert_eq!(analysis.options.iter().filter(|o| o.recommended).count(), 1);
        assert!(analysis.thumbnail_url.contains("dQw4w9WgXcQ"));
    }

    #[test]
    fn test_requested_quality_is_recommended() {
        let analysis = DownloaderService::new()
            .analyze(&request(
                "https://www.instagram.com/p/Cx1yZ/",
                Platform::Instagram,
                Some("PHOTO"),
            ))
            .unwrap();

        let photo = analysis.options.iter().find(|o| o.quality == "photo").unwrap();
        assert!(photo.recommended);
        assert!(photo.available);
        assert_eq!(photo.format, "jpg");
        assert_eq!(analysis.options.iter().filter(|o| o.recommended).count(), 1);
    }

    #[test]
    fn test_size_estimates_stay_in_range() {
        let options = build_options(Platform::Tiktok, "x", None);
        let (_, _, nominal) = TIKTOK_OPTIONS[0];
        assert!(options[0].size_bytes >= nominal * 80 / 100);
        assert!(options[0].size_bytes <= nominal * 120 / 100);
        assert!(options[0].size_estimate.ends_with("MiB"));
    }

    #[test]
    fn test_rejects_wrong_host() {
        let err = DownloaderService::new()
            .analyze(&request(
                "https://www.youtube.com/watch?v=abc",
                Platform::Tiktok,
                None,
            ))
            .unwrap_err();
        assert!(matches!(err, DownloaderError::UnsupportedHost(Platform::Tiktok)));
    }

    #[test]
    fn test_rejects_bad_urls() {
        let service = DownloaderService::new();

        let err = service
            .analyze(&request("not a url", Platform::Youtube, None))
            .unwrap_err();
        assert!(matches!(err, DownloaderError::InvalidUrl(_)));

        let err = service
            .analyze(&request("ftp://youtube.com/watch?v=abc", Platform::Youtube, None))
            .unwrap_err();
        assert!(matches!(err, DownloaderError::InvalidUrl(_)));

        let err = service
            .analyze(&request("https://www.tiktok.com/@someone", Platform::Tiktok, None))
            .unwrap_err();
        assert!(matches!(err, DownloaderError::MissingIdentifier(Platform::Tiktok)));
    }
}
