use std::sync::Arc;

use crate::api::MessagingHub;
use crate::config::Config;
use crate::services::{ChatService, DownloaderService, MediaService, ProviderRegistry};
use crate::store::FileStore;

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused by every provider and the sample fetcher for connection pooling.
pub fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("cks-ai/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub providers: ProviderRegistry,

    pub hub: MessagingHub,

    pub chat: Arc<ChatService>,

    pub media: Arc<MediaService>,

    pub downloader: DownloaderService,
}

impl SharedState {
    /// Builds the provider registry from `config`.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let timeout = config
            .search
            .request_timeout_seconds
            .max(config.ai.request_timeout_seconds);
        let http = build_shared_http_client(timeout)?;
        let providers = ProviderRegistry::from_config(&config, &http);
        Self::with_providers(config, providers, http).await
    }

    /// Uses an explicit registry instead of the configured one.
    pub async fn with_providers(
        config: Config,
        providers: ProviderRegistry,
        http: reqwest::Client,
    ) -> anyhow::Result<Self> {
        let store = FileStore::new(&config.storage.media_dir, &config.storage.database_file);
        store.ensure_exists().await.map_err(|e| {
            anyhow::anyhow!(
                "Failed to create media directory {}: {e}",
                config.storage.media_dir
            )
        })?;

        let hub = MessagingHub::new(config.general.event_bus_buffer_size);
        let chat = Arc::new(ChatService::new(providers.clone(), &config.chat));
        let media = Arc::new(MediaService::new(store, http, &config.media));

        Ok(Self {
            config: Arc::new(config),
            providers,
            hub,
            chat,
            media,
            downloader: DownloaderService::new(),
        })
    }
}
