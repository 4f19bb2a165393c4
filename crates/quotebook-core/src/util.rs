//! Small text and time helpers shared by the store, config and remote code.

/// Longest server error body quoted back in a sync error.
pub const ERROR_EXCERPT_CHARS: usize = 180;

/// Trim user or server supplied text, treating blank input as absent.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_string())
    }
}

/// Whether `value` is an `http://` or `https://` URL with something after the scheme.
pub fn is_http_url(value: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .filter_map(|scheme| value.strip_prefix(scheme))
        .any(|rest| !rest.trim().is_empty())
}

/// One-line excerpt of a response body for error messages.
///
/// Runs of whitespace (HTML pages, pretty-printed JSON) collapse to a single
/// space and the result is capped at [`ERROR_EXCERPT_CHARS`].
pub fn error_excerpt(body: &str) -> String {
    body.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(ERROR_EXCERPT_CHARS)
        .collect()
}

/// Wall-clock time as Unix milliseconds, the unit of `updatedAt`.
pub fn unix_timestamp_millis_now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
