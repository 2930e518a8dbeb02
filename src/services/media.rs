//! Sample media generation and on-demand synthesis over the file store.

use chrono::Utc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{MediaConfig, SampleSourceConfig};
use crate::models::StoredFileInfo;
use crate::parser::filename::parse_media_name;
use crate::services::fallback::FallbackChain;
use crate::store::{FileStore, StoreError, content_type};
use crate::synth::{Mp4Params, SynthHints, SynthKind, synthesize};

/// Kinds produced by one sample batch, in generation order.
pub const BATCH_KINDS: [SynthKind; 3] = [SynthKind::Jpeg, SynthKind::Wav, SynthKind::Mp4];

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub synthesized: bool,
}

#[derive(Clone)]
pub struct MediaService {
    store: FileStore,
    http: reqwest::Client,
    sample_sources: Vec<SampleSourceConfig>,
    request_timeout: Option<Duration>,
}

impl MediaService {
    #[must_use]
    pub fn new(store: FileStore, http: reqwest::Client, config: &MediaConfig) -> Self {
        Self {
            store,
            http,
            sample_sources: config.sample_sources.clone(),
            request_timeout: (config.request_timeout_seconds > 0)
                .then(|| Duration::from_secs(config.request_timeout_seconds)),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &FileStore {
        &self.store
    }

    /// Stores one image, one audio and one video sample under fresh names.
    pub async fn generate_batch(&self) -> Result<Vec<StoredFileInfo>, MediaError> {
        let mut stored = Vec::with_capacity(BATCH_KINDS.len());

        for kind in BATCH_KINDS {
            let bytes = self.sample_bytes(kind).await;
            let name = self.fresh_sample_name(kind).await?;
            stored.push(self.store.write(&name, &bytes).await?);
        }

        info!(count = stored.len(), "Generated sample batch");
        Ok(stored)
    }

    /// Remote sample sources for `kind` in configured order, then local synthesis.
    async fn sample_bytes(&self, kind: SynthKind) -> Vec<u8> {
        let mut chain = FallbackChain::new("samples");

        for source in self
            .sample_sources
            .iter()
            .filter(|s| SynthKind::from_extension(&s.extension) == Some(kind))
        {
            let url = source.url.as_str();
            chain = chain.then(url, move || self.fetch_remote(url));
        }

        let hints = SynthHints {
            creation_time: now_mp4_time(),
            ..SynthHints::default()
        };

        chain
            .then("synth", move || async move { Ok(synthesize_counted(kind, &hints)) })
            .run_or_else(|| synthesize_counted(kind, &hints))
            .await
    }

    async fn fetch_remote(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let mut request = self.http.get(url);
        if let Some(timeout) = self.request_timeout {
            request = request.timeout(timeout);
        }

        let bytes = request.send().await?.error_for_status()?.bytes().await?;
        debug!(url = %url, size = bytes.len(), "Fetched remote sample");
        Ok(bytes.to_vec())
    }

    async fn fresh_sample_name(&self, kind: SynthKind) -> Result<String, MediaError> {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let base = format!("sample_{}_{stamp}", kind.label());

        let mut name = format!("{base}.{}", kind.extension());
        let mut n = 1;
        while self.store.exists(&name).await? {
            name = format!("{base}_{n}.{}", kind.extension());
            n += 1;
        }
        Ok(name)
    }

    /// Synthesizes one sample of `kind` locally and stores it under a fresh name.
    pub async fn synthesize_sample(&self, kind: SynthKind) -> Result<StoredFileInfo, MediaError> {
        let hints = SynthHints {
            creation_time: now_mp4_time(),
            ..SynthHints::default()
        };
        let bytes = synthesize_counted(kind, &hints);
        let name = self.fresh_sample_name(kind).await?;
        Ok(self.store.write(&name, &bytes).await?)
    }

    /// Reads a stored file, synthesizing and persisting it first when it is
    /// absent but has a synthesizable extension.
    pub async fn fetch_or_synthesize(&self, filename: &str) -> Result<FetchedFile, MediaError> {
        match self.store.read(filename).await {
            Ok(bytes) => Ok(FetchedFile {
                bytes,
                content_type: content_type(filename),
                synthesized: false,
            }),
            Err(StoreError::NotFound(_)) => {
                let kind = SynthKind::from_filename(filename)
                    .ok_or_else(|| MediaError::NotFound(filename.to_string()))?;

                let hints = SynthHints::from_filename(filename, now_mp4_time());
                let bytes = synthesize_counted(kind, &hints);
                self.store.write(filename, &bytes).await?;

                let platform = parse_media_name(filename)
                    .and_then(|name| name.platform)
                    .map_or("local", |p| p.as_str());
                info!(file = %filename, kind = kind.label(), platform, "Synthesized missing file");
                Ok(FetchedFile {
                    bytes,
                    content_type: content_type(filename),
                    synthesized: true,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn list(&self) -> Result<Vec<StoredFileInfo>, MediaError> {
        Ok(self.store.list().await?)
    }
}

fn now_mp4_time() -> u32 {
    Mp4Params::mp4_time(Utc::now().timestamp())
}

fn synthesize_counted(kind: SynthKind, hints: &SynthHints) -> Vec<u8> {
    metrics::counter!("synthesized_files_total", "kind" => kind.label()).increment(1);
    synthesize(kind, hints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;

    fn temp_service() -> MediaService {
        let dir = std::env::temp_dir().join(format!("cks-media-{}", uuid::Uuid::new_v4()));
        MediaService::new(
            FileStore::new(dir, "media_db.json"),
            reqwest::Client::new(),
            &MediaConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_generate_batch_stores_three_kinds() {
        let service = temp_service();
        let stored = service.generate_batch().await.unwrap();

        let kinds: Vec<MediaKind> = stored.iter().map(|f| f.media_type).collect();
        assert_eq!(kinds, vec![MediaKind::Image, MediaKind::Audio, MediaKind::Video]);
        assert!(stored.iter().all(|f| f.name.starts_with("sample_")));

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 3);
    }

    #[tokio::test]
    async fn test_batches_never_overwrite() {
        let service = temp_service();
        service.generate_batch().await.unwrap();
        service.generate_batch().await.unwrap();

        assert_eq!(service.list().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_fetch_synthesizes_then_reads_back() {
        let service = temp_service();

        let first = service.fetch_or_synthesize("youtube_abc_audio.wav").await.unwrap();
        assert!(first.synthesized);
        assert_eq!(first.content_type, "audio/wav");
        assert_eq!(&first.bytes[0..4], b"RIFF");

        let second = service.fetch_or_synthesize("youtube_abc_audio.wav").await.unwrap();
        assert!(!second.synthesized);
        assert_eq!(second.bytes, first.bytes);
    }

    #[tokio::test]
    async fn test_synthesize_sample() {
        let service = temp_service();
        let info = service.synthesize_sample(SynthKind::Mp4).await.unwrap();

        assert!(info.name.starts_with("sample_video_"));
        assert!(info.name.ends_with(".mp4"));
        assert_eq!(info.content_type, "video/mp4");
    }

    #[tokio::test]
    async fn test_fetch_unsynthesizable_is_not_found() {
        let service = temp_service();
        let err = service.fetch_or_synthesize("missing.txt").await.unwrap_err();
        assert!(matches!(err, MediaError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_fetch_rejects_traversal() {
        let service = temp_service();
        let err = service.fetch_or_synthesize("../etc/passwd").await.unwrap_err();
        assert!(matches!(err, MediaError::Store(StoreError::InvalidName(_))));
    }
}
