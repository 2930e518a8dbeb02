use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Tiktok,
    Instagram,
}

impl Platform {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Tiktok => "tiktok",
            Self::Instagram => "instagram",
        }
    }

    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Youtube => "YouTube",
            Self::Tiktok => "TikTok",
            Self::Instagram => "Instagram",
        }
    }

    /// Hostnames accepted for links on this platform.
    #[must_use]
    pub const fn allowed_hosts(&self) -> &'static [&'static str] {
        match self {
            Self::Youtube => &[
                "youtube.com",
                "www.youtube.com",
                "m.youtube.com",
                "music.youtube.com",
                "youtu.be",
            ],
            Self::Tiktok => &[
                "tiktok.com",
                "www.tiktok.com",
                "m.tiktok.com",
                "vm.tiktok.com",
                "vt.tiktok.com",
            ],
            Self::Instagram => &["instagram.com", "www.instagram.com", "m.instagram.com"],
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "youtube" | "yt" => Ok(Self::Youtube),
            "tiktok" => Ok(Self::Tiktok),
            "instagram" | "ig" => Ok(Self::Instagram),
            other => Err(format!("Unsupported platform: {other}")),
        }
    }
}

/// A single downloader request. Lives for one request/response cycle only.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub source_url: String,
    pub platform: Platform,
    pub requested_quality: Option<String>,
}
