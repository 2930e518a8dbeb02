use super::ApiError;
use crate::constants::limits::{MAX_MESSAGE_CHARS, MAX_URL_CHARS};
use crate::store::validate_filename as validate_store_filename;

/// Media actions accepted by `POST /api/media`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaAction {
    Download,
    List,
}

pub fn validate_message(message: Option<&str>) -> Result<&str, ApiError> {
    let trimmed = message.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Message is required"));
    }

    if trimmed.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ApiError::validation(format!(
            "Message must be {} characters or less",
            MAX_MESSAGE_CHARS
        )));
    }

    Ok(trimmed)
}

pub fn validate_filename(filename: Option<&str>) -> Result<&str, ApiError> {
    let filename = filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::validation("Filename parameter is required"))?;

    Ok(validate_store_filename(filename)?)
}

pub fn validate_media_action(action: Option<&str>) -> Result<MediaAction, ApiError> {
    match action.map(|a| a.trim().to_ascii_lowercase()).as_deref() {
        Some("download") => Ok(MediaAction::Download),
        Some("list") => Ok(MediaAction::List),
        Some(other) => Err(ApiError::validation(format!("Invalid action: {}", other))),
        None => Err(ApiError::validation("Action is required")),
    }
}

pub fn validate_source_url(url: Option<&str>) -> Result<&str, ApiError> {
    let trimmed = url.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ApiError::validation("URL is required"));
    }

    if trimmed.len() > MAX_URL_CHARS {
        return Err(ApiError::validation(format!(
            "URL must be {} characters or less",
            MAX_URL_CHARS
        )));
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_message() {
        assert_eq!(validate_message(Some("  hi  ")).unwrap(), "hi");
        assert!(validate_message(Some("   ")).is_err());
        assert!(validate_message(None).is_err());
        assert!(validate_message(Some("a".repeat(MAX_MESSAGE_CHARS + 1).as_str())).is_err());
    }

    #[test]
    fn test_validate_filename() {
        assert_eq!(validate_filename(Some("a.wav")).unwrap(), "a.wav");
        assert!(validate_filename(None).is_err());
        assert!(validate_filename(Some("")).is_err());
        assert!(validate_filename(Some("../etc/passwd")).is_err());
        assert!(validate_filename(Some(".env")).is_err());
    }

    #[test]
    fn test_validate_media_action() {
        assert_eq!(validate_media_action(Some("Download")).unwrap(), MediaAction::Download);
        assert_eq!(validate_media_action(Some("list")).unwrap(), MediaAction::List);
        assert!(validate_media_action(Some("delete")).is_err());
        assert!(validate_media_action(None).is_err());
    }

    #[test]
    fn test_validate_source_url() {
        assert!(validate_source_url(Some(" https://youtu.be/x ")).is_ok());
        assert!(validate_source_url(Some("")).is_err());
        assert!(validate_source_url(Some("a".repeat(MAX_URL_CHARS + 1).as_str())).is_err());
    }
}
