use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub storage: StorageConfig,

    pub search: SearchConfig,

    pub ai: AiConfig,

    pub chat: ChatConfig,

    pub media: MediaConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Messaging hub buffer size (default: 100)
    pub event_bus_buffer_size: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 2,
            event_bus_buffer_size: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub media_dir: String,

    /// Bookkeeping file kept alongside media and hidden from listings.
    pub database_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            media_dir: "./media".to_string(),
            database_file: "media_db.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Serper (Google search) API key. Registers the provider when set.
    pub api_key: Option<String>,

    pub api_url: String,

    /// Keyless DuckDuckGo instant answers, tried after the keyed provider.
    pub duckduckgo_enabled: bool,

    pub duckduckgo_url: String,

    /// Request timeout in seconds (default: 15)
    pub request_timeout_seconds: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://google.serper.dev/search".to_string(),
            duckduckgo_enabled: false,
            duckduckgo_url: "https://api.duckduckgo.com/".to_string(),
            request_timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub enabled: bool,

    /// OpenAI-compatible base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,

    pub api_key: Option<String>,

    pub model: String,

    pub temperature: f32,

    pub max_tokens: u32,

    /// Request timeout in seconds (default: 60)
    pub request_timeout_seconds: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 1024,
            request_timeout_seconds: 60,
        }
    }
}

impl AiConfig {
    /// Local endpoints (LM Studio, Ollama) run without a key.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        if !self.enabled || self.base_url.trim().is_empty() {
            return false;
        }

        let has_key = self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty());
        has_key || is_local_url(&self.base_url)
    }
}

fn is_local_url(raw: &str) -> bool {
    url::Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Number of search results fed to the answer (default: 5)
    pub max_results: usize,

    /// Number of snippets turned into "Main Points" bullets (default: 3)
    pub main_points: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            main_points: 3,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Remote sample files tried before local synthesis.
    pub sample_sources: Vec<SampleSourceConfig>,

    /// Request timeout in seconds for sample sources (default: 0 = use search timeout)
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleSourceConfig {
    /// Extension used for the stored copy, e.g. "jpg"
    pub extension: String,

    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });

        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Applies environment overrides. `lookup` is injected so tests need not
    /// touch the process environment.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("CKS_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(dir) = get("CKS_STORAGE_DIR") {
            self.storage.media_dir = dir;
        }
        if let Some(key) = get("SERPER_API_KEY").or_else(|| get("SEARCH_API_KEY")) {
            self.search.api_key = Some(key);
        }
        if let Some(flag) = get("AI_ENABLED") {
            self.ai.enabled = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(key) = get("AI_API_KEY").or_else(|| get("OPENAI_API_KEY")) {
            self.ai.api_key = Some(key);
        }
        if let Some(url) = get("AI_BASE_URL") {
            self.ai.base_url = url;
        }
        if let Some(model) = get("AI_MODEL") {
            self.ai.model = model;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("cks-ai").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".cks-ai").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.media_dir.trim().is_empty() {
            anyhow::bail!("storage.media_dir cannot be empty");
        }

        if self.storage.database_file.contains(['/', '\\']) {
            anyhow::bail!("storage.database_file must be a bare filename");
        }

        if self.chat.max_results == 0 {
            anyhow::bail!("chat.max_results must be > 0");
        }

        for source in &self.media.sample_sources {
            url::Url::parse(&source.url)
                .with_context(|| format!("Invalid sample source URL: {}", source.url))?;
        }

        Ok(())
    }
}
