//! Quote export helpers.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::Quote;

/// Render quotes as a pretty-printed JSON array.
pub fn render_json_export(quotes: &[Quote]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(quotes)
}

/// Build the download file name for an export taken at `at`.
///
/// The ISO-8601 timestamp has `:` and `.` replaced by `-`, e.g.
/// `quotes-2024-01-02T03-04-05-678Z.json`.
#[must_use]
pub fn suggested_export_file_name(at: DateTime<Utc>) -> String {
    let timestamp = at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("quotes-{timestamp}.json")
}

/// Same as [`suggested_export_file_name`] for a Unix millisecond timestamp.
#[must_use]
pub fn suggested_export_file_name_millis(timestamp_ms: i64) -> String {
    let at = DateTime::from_timestamp_millis(timestamp_ms).unwrap_or_default();
    suggested_export_file_name(at)
}
