pub mod chat;
pub mod download;
pub mod media;
pub mod search;

pub use chat::{ChatRole, ChatTurn};
pub use download::{DownloadRequest, Platform};
pub use media::{MediaKind, StoredFileInfo};
pub use search::SearchResult;
