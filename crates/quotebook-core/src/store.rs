//! The quote collection and its durable snapshot.

use std::sync::Arc;

use serde_json::Value;

use crate::clock::{Clock, SystemClock};
use crate::defaults::default_quotes;
use crate::error::{Error, Result};
use crate::models::{Quote, QuoteId};
use crate::storage::{SnapshotStorage, QUOTES_KEY};
use crate::util::normalize_text_option;

/// Owns the ordered quote collection and mirrors it to storage.
///
/// Every mutation except [`QuoteStore::replace_or_insert`] persists the full
/// collection before returning. Callers that mutate the store are responsible
/// for refreshing any [`crate::categories::CategoryIndex`] built from it.
pub struct QuoteStore<S> {
    storage: S,
    clock: Arc<dyn Clock>,
    quotes: Vec<Quote>,
}

impl<S: SnapshotStorage> QuoteStore<S> {
    /// Load the stored snapshot using the wall clock for new quotes.
    pub fn load(storage: S) -> Self {
        Self::load_with_clock(storage, Arc::new(SystemClock))
    }

    /// Load the stored snapshot, falling back to the built-in quotes.
    ///
    /// A missing, unreadable, or corrupt snapshot never fails the load.
    pub fn load_with_clock(storage: S, clock: Arc<dyn Clock>) -> Self {
        let quotes = match read_snapshot(&storage) {
            Ok(Some(quotes)) => quotes,
            Ok(None) => {
                tracing::debug!("No stored quotes; using defaults");
                default_quotes()
            }
            Err(error) => {
                tracing::warn!("Failed to load stored quotes, using defaults: {error}");
                default_quotes()
            }
        };

        Self {
            storage,
            clock,
            quotes,
        }
    }

    /// All quotes in insertion order.
    pub fn get_all(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// First quote carrying `id`.
    pub fn find(&self, id: &QuoteId) -> Option<&Quote> {
        self.quotes
            .iter()
            .find(|quote| quote.id.as_ref() == Some(id))
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Create a quote from user input, append it, and persist.
    ///
    /// The id is derived from the current timestamp and bumped until unused.
    pub fn add(
        &mut self,
        text: &str,
        author: Option<&str>,
        category: Option<&str>,
    ) -> Result<Quote> {
        let text = normalize_text_option(Some(text.to_string()))
            .ok_or_else(|| Error::Validation("Quote text cannot be empty".to_string()))?;

        let now = self.clock.now_millis();
        let mut quote = Quote::new(text)
            .with_id(self.fresh_id(now))
            .with_updated_at(now);
        quote.author = normalize_text_option(author.map(str::to_string));
        quote.category = normalize_text_option(category.map(str::to_string));

        self.quotes.push(quote.clone());
        if let Err(error) = self.persist() {
            self.quotes.pop();
            return Err(error);
        }

        tracing::debug!(id = ?quote.id, "Added quote");
        Ok(quote)
    }

    /// Append imported records verbatim, skipping those without text.
    ///
    /// Ids are not checked for collisions. Returns the number appended.
    pub fn bulk_append(&mut self, candidates: impl IntoIterator<Item = Quote>) -> Result<usize> {
        let before = self.quotes.len();
        self.quotes
            .extend(candidates.into_iter().filter(|quote| !quote.is_blank()));
        let appended = self.quotes.len() - before;

        if appended > 0 {
            if let Err(error) = self.persist() {
                self.quotes.truncate(before);
                return Err(error);
            }
        }
        Ok(appended)
    }

    /// Overwrite the quote with the same id in place, or append it.
    ///
    /// Does not persist; merge callers persist once per batch. Returns `true`
    /// when an existing quote was overwritten.
    pub fn replace_or_insert(&mut self, quote: Quote) -> bool {
        let position = quote.id.as_ref().and_then(|id| {
            self.quotes
                .iter()
                .position(|candidate| candidate.id.as_ref() == Some(id))
        });

        if let Some(index) = position {
            self.quotes[index] = quote;
            true
        } else {
            self.quotes.push(quote);
            false
        }
    }

    /// Put back a collection taken with `get_all().to_vec()`.
    ///
    /// Used to undo unpersisted merge writes after a failed [`QuoteStore::persist`].
    pub(crate) fn restore(&mut self, quotes: Vec<Quote>) {
        self.quotes = quotes;
    }

    /// Write the full collection as one snapshot.
    pub fn persist(&self) -> Result<()> {
        let serialized = serde_json::to_string(&self.quotes)?;
        self.storage.write(QUOTES_KEY, &serialized)
    }

    fn fresh_id(&self, now: i64) -> QuoteId {
        let mut candidate = now;
        while self.find(&QuoteId::Int(candidate)).is_some() {
            candidate += 1;
        }
        QuoteId::Int(candidate)
    }
}

fn read_snapshot(storage: &impl SnapshotStorage) -> Result<Option<Vec<Quote>>> {
    let Some(raw) = storage.read(QUOTES_KEY)? else {
        return Ok(None);
    };

    let records: Vec<Value> =
        serde_json::from_str(&raw).map_err(|error| Error::PersistenceDecode(error.to_string()))?;
    let total = records.len();
    let quotes = records
        .into_iter()
        .filter_map(|record| match record {
            Value::Object(fields) => Quote::from_fields(fields),
            _ => None,
        })
        .filter(|quote| !quote.is_blank())
        .collect::<Vec<_>>();
    if quotes.len() < total {
        tracing::warn!("Dropped {} stored quotes without text", total - quotes.len());
    }
    Ok(Some(quotes))
}
