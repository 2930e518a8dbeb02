pub mod chat;
pub use chat::{ChatReply, ChatService};

pub mod downloader;
pub use downloader::{DownloadAnalysis, DownloadOption, DownloaderError, DownloaderService};

pub mod fallback;
pub use fallback::{FallbackChain, Outcome};

pub mod formatter;
pub use formatter::QueryIntent;

pub mod media;
pub use media::{FetchedFile, MediaError, MediaService};

pub mod providers;
pub use providers::{CompletionProvider, ProviderRegistry, ProviderSummary, SearchProvider};
