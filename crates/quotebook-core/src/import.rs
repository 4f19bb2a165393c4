//! Parsing of quote import files.

use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::Quote;

/// Records accepted from an import payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportBatch {
    /// Records with non-empty text, in file order
    pub quotes: Vec<Quote>,
    /// Number of elements skipped
    pub dropped: usize,
}

/// Parse an import file containing a JSON array of quote records.
///
/// Elements that are not objects or lack a non-empty string `text` are
/// dropped. Accepted elements keep every field they carried, whatever its type.
pub fn parse_import_payload(payload: &str) -> Result<ImportBatch> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|error| Error::ImportFormat(format!("invalid JSON: {error}")))?;

    let Value::Array(elements) = value else {
        return Err(Error::ImportFormat(
            "File must contain an array of quotes".to_string(),
        ));
    };

    let mut batch = ImportBatch::default();
    for element in elements {
        match into_quote(element) {
            Some(quote) => batch.quotes.push(quote),
            None => batch.dropped += 1,
        }
    }

    if batch.dropped > 0 {
        tracing::debug!("Skipped {} import records without text", batch.dropped);
    }
    Ok(batch)
}

fn into_quote(element: Value) -> Option<Quote> {
    let Value::Object(fields) = element else {
        return None;
    };
    Quote::from_fields(fields).filter(|quote| !quote.is_blank())
}
