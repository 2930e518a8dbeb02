//! Identifier extraction from social media links.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

use crate::models::Platform;

/// Lowercased host with any trailing dot removed.
#[must_use]
pub fn normalized_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.trim_end_matches('.').to_ascii_lowercase())
}

#[must_use]
pub fn host_allowed(platform: Platform, url: &Url) -> bool {
    normalized_host(url).is_some_and(|host| platform.allowed_hosts().contains(&host.as_str()))
}

/// Pulls the platform's media identifier out of a link, reduced to
/// `[A-Za-z0-9_-]`.
#[must_use]
pub fn extract_media_id(platform: Platform, url: &Url) -> Option<String> {
    let raw = match platform {
        Platform::Youtube => youtube_id(url),
        Platform::Tiktok => tiktok_id(url),
        Platform::Instagram => instagram_id(url),
    }?;

    let id = sanitize_id(&raw);
    if id.is_empty() { None } else { Some(id) }
}

fn segments(url: &Url) -> Vec<&str> {
    url.path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default()
}

fn youtube_id(url: &Url) -> Option<String> {
    if normalized_host(url).as_deref() == Some("youtu.be") {
        return segments(url).first().map(ToString::to_string);
    }

    if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        return Some(v.into_owned());
    }

    let segs = segments(url);
    match segs.as_slice() {
        ["shorts" | "embed" | "live" | "v", id, ..] => Some((*id).to_string()),
        _ => None,
    }
}

fn tiktok_id(url: &Url) -> Option<String> {
    let segs = segments(url);

    if let Some(pos) = segs.iter().position(|s| *s == "video" || *s == "photo") {
        return segs.get(pos + 1).map(ToString::to_string);
    }

    // vm.tiktok.com/<code>/ short links carry only the code.
    let host = normalized_host(url)?;
    if host.starts_with("vm.") || host.starts_with("vt.") {
        return segs.last().map(ToString::to_string);
    }

    None
}

fn instagram_id(url: &Url) -> Option<String> {
    let segs = segments(url);
    let pos = segs
        .iter()
        .position(|s| matches!(*s, "p" | "reel" | "reels" | "tv"))?;
    segs.get(pos + 1).map(ToString::to_string)
}

fn sanitize_id(raw: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]").expect("Invalid regex"));
    let cleaned = re.replace_all(raw, "");
    cleaned.chars().take(64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(platform: Platform, raw: &str) -> Option<String> {
        extract_media_id(platform, &Url::parse(raw).unwrap())
    }

    #[test]
    fn test_youtube_ids() {
        let p = Platform::Youtube;
        assert_eq!(
            id(p, "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(id(p, "https://youtu.be/dQw4w9WgXcQ?si=x").as_deref(), Some("dQw4w9WgXcQ"));
        assert_eq!(id(p, "https://youtube.com/shorts/abc123_-Z").as_deref(), Some("abc123_-Z"));
        assert_eq!(id(p, "https://www.youtube.com/embed/xyz").as_deref(), Some("xyz"));
        assert_eq!(id(p, "https://www.youtube.com/feed/trending"), None);
    }

    #[test]
    fn test_tiktok_ids() {
        let p = Platform::Tiktok;
        assert_eq!(
            id(p, "https://www.tiktok.com/@user/video/7234567890123456789").as_deref(),
            Some("7234567890123456789")
        );
        assert_eq!(id(p, "https://vm.tiktok.com/ZMabc123/").as_deref(), Some("ZMabc123"));
        assert_eq!(id(p, "https://www.tiktok.com/@user"), None);
    }

    #[test]
    fn test_instagram_ids() {
        let p = Platform::Instagram;
        assert_eq!(id(p, "https://www.instagram.com/p/Cx1_yZ/").as_deref(), Some("Cx1_yZ"));
        assert_eq!(id(p, "https://instagram.com/reel/Abc-9").as_deref(), Some("Abc-9"));
        assert_eq!(id(p, "https://www.instagram.com/someone/"), None);
    }

    #[test]
    fn test_ids_are_sanitized() {
        assert_eq!(
            id(Platform::Youtube, "https://www.youtube.com/watch?v=../../etc").as_deref(),
            Some("etc")
        );
        assert_eq!(id(Platform::Youtube, "https://www.youtube.com/watch?v=%2F%2E"), None);
    }

    #[test]
    fn test_host_allowed() {
        let url = Url::parse("https://WWW.YouTube.com/watch?v=a").unwrap();
        assert!(host_allowed(Platform::Youtube, &url));
        assert!(!host_allowed(Platform::Tiktok, &url));

        let evil = Url::parse("https://youtube.com.evil.example/watch?v=a").unwrap();
        assert!(!host_allowed(Platform::Youtube, &evil));
    }
}
