//! Media URL helpers.

/// Extension used when the URL carries none.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Extract the file extension for a media URL, falling back to [`DEFAULT_EXTENSION`].
pub fn extension_for_url(url: &str) -> String {
    extract_extension_from_url(url).unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Extract extension from URL path.
fn extract_extension_from_url(url: &str) -> Option<String> {
    // Remove query string and fragment
    let path = url.split(['?', '#']).next()?;

    // Get the last segment
    let filename = path.rsplit('/').next()?;
    if !filename.contains('.') {
        return None;
    }

    // Get extension
    let ext = filename.rsplit('.').next()?;

    // Validate it looks like an extension (1-10 chars, alphanumeric)
    if !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext.to_lowercase())
    } else {
        None
    }
}
