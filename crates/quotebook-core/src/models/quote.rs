//! Quote model

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Author label shown when a quote carries no author.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Identifier of a quote.
///
/// Locally created quotes get integer ids; remote records may use either
/// integers or strings, so both are accepted and kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuoteId {
    Int(i64),
    Text(String),
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl FromStr for QuoteId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(s.parse::<i64>()
            .map_or_else(|_| Self::Text(s.to_string()), Self::Int))
    }
}

impl From<i64> for QuoteId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for QuoteId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A quote in the collection.
///
/// Optional fields are omitted from JSON when absent so a stored snapshot
/// round-trips with the same field presence. Only `text` is required when
/// reading a record: unrecognized fields, and known fields whose value is null
/// or of an unexpected type, are kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Identifier; absent until one is assigned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<QuoteId>,
    /// Quote text
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Last update timestamp (Unix ms)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<'de> Deserialize<'de> for Quote {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_fields(fields)
            .ok_or_else(|| de::Error::custom("quote record needs a string `text` field"))
    }
}

impl Quote {
    /// Build a quote from a raw JSON object.
    ///
    /// Returns `None` unless `text` is a string. Every other field is kept:
    /// well-typed known fields populate the typed view, the rest stay in
    /// `extra` under their original key.
    pub fn from_fields(mut fields: Map<String, Value>) -> Option<Self> {
        let text = match fields.remove("text") {
            Some(Value::String(text)) => text,
            _ => return None,
        };

        Some(Self {
            id: take_typed(&mut fields, "id"),
            text,
            author: take_typed(&mut fields, "author"),
            category: take_typed(&mut fields, "category"),
            updated_at: take_typed(&mut fields, "updatedAt"),
            extra: fields,
        })
    }

    /// Create a quote with only text set.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            author: None,
            category: None,
            updated_at: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<QuoteId>) -> Self {
        self.id = Some(id.into());
        self.extra.remove("id");
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self.extra.remove("author");
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self.extra.remove("category");
        self
    }

    #[must_use]
    pub fn with_updated_at(mut self, updated_at: i64) -> Self {
        self.updated_at = Some(updated_at);
        self.extra.remove("updatedAt");
        self
    }

    /// Author for display, falling back to "Unknown".
    #[must_use]
    pub fn display_author(&self) -> &str {
        self.author
            .as_deref()
            .map(str::trim)
            .filter(|author| !author.is_empty())
            .unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Timestamp used for merge comparison; missing counts as 0.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.updated_at.unwrap_or(0)
    }

    /// Check if quote text is empty (whitespace-only counts as empty)
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Category when present and non-blank.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
    }
}

/// Move `key` out of `fields` when it holds a non-null value of type `T`.
fn take_typed<T: DeserializeOwned>(fields: &mut Map<String, Value>, key: &str) -> Option<T> {
    let value = fields.get(key).filter(|value| !value.is_null())?;
    let typed = serde_json::from_value(value.clone()).ok()?;
    fields.remove(key);
    Some(typed)
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" — {}", self.text, self.display_author())
    }
}
