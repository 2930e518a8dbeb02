use crate::models::Platform;
use regex::Regex;
use std::sync::OnceLock;

/// What can be recovered from a stored media filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaName {
    pub platform: Option<Platform>,
    pub media_id: Option<String>,
    pub quality: Option<String>,
    pub height: Option<u32>,
    pub extension: String,
}

#[must_use]
pub fn parse_media_name(filename: &str) -> Option<MediaName> {
    parse_platform_name(filename).or_else(|| parse_fallback(filename))
}

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

/// `youtube_dQw4w9WgXcQ_720p.mp4`
fn parse_platform_name(filename: &str) -> Option<MediaName> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^(?P<platform>youtube|tiktok|instagram)_(?P<id>[A-Za-z0-9_-]+)_(?P<quality>[A-Za-z0-9]+)\.(?P<ext>[A-Za-z0-9]+)$",
    );

    let caps = re.captures(filename)?;
    let quality = caps.name("quality")?.as_str().to_string();

    Some(MediaName {
        platform: caps.name("platform")?.as_str().parse().ok(),
        media_id: Some(caps.name("id")?.as_str().to_string()),
        height: parse_resolution(&quality),
        quality: Some(quality),
        extension: caps.name("ext")?.as_str().to_ascii_lowercase(),
    })
}

fn parse_fallback(filename: &str) -> Option<MediaName> {
    let (_, ext) = filename.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }

    Some(MediaName {
        platform: None,
        media_id: None,
        quality: None,
        height: parse_resolution(filename),
        extension: ext.to_ascii_lowercase(),
    })
}

/// Reads a `<height>p` tag (`720p`, `1080P`) within the supported range.
#[must_use]
pub fn parse_resolution(s: &str) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(&RE, r"(?i)(?:^|[^0-9])(\d{3,4})p(?:$|[^a-z0-9])");

    re.captures(s)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|h| (144..=2160).contains(h))
}
