//! Quote book service: store, category index, and presenter events together.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tokio::sync::broadcast;

use crate::categories::{CategoryFilter, CategoryIndex};
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::events::{EventBus, QuoteEvent, CONFLICT_NOTICE_DURATION};
use crate::export::render_json_export;
use crate::import::parse_import_payload;
use crate::models::Quote;
use crate::storage::SnapshotStorage;
use crate::store::QuoteStore;
use crate::sync::{merge_remote_quotes, MergeReport};

/// Result of asking for a random quote.
#[derive(Debug, Clone, PartialEq)]
pub enum QuotePick {
    Found(Quote),
    /// Nothing matched the filter (or the collection is empty)
    NoQuotesFound(CategoryFilter),
}

impl QuotePick {
    /// Text a presenter shows when nothing was found.
    pub fn empty_message(filter: &CategoryFilter) -> String {
        match filter {
            CategoryFilter::All => "No quotes available. Please add one!".to_string(),
            CategoryFilter::Category(name) => format!("No quotes found in category '{name}'."),
        }
    }
}

/// Outcome of a file import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub dropped: usize,
}

/// The quote collection plus everything derived from it.
///
/// Every mutation goes through here so the category index is refreshed and
/// presenters are notified exactly once per change.
pub struct QuoteBook<S> {
    store: QuoteStore<S>,
    index: CategoryIndex<S>,
    events: EventBus,
}

impl<S: SnapshotStorage + Clone> QuoteBook<S> {
    /// Load the quote book from `storage` using the wall clock.
    pub fn open(storage: S) -> Self {
        Self::open_with_clock(storage, Arc::new(SystemClock))
    }

    pub fn open_with_clock(storage: S, clock: Arc<dyn Clock>) -> Self {
        let store = QuoteStore::load_with_clock(storage.clone(), clock);
        let index = CategoryIndex::load(storage, store.get_all());
        Self {
            store,
            index,
            events: EventBus::new(),
        }
    }
}

impl<S: SnapshotStorage> QuoteBook<S> {
    pub const fn store(&self) -> &QuoteStore<S> {
        &self.store
    }

    pub fn quotes(&self) -> &[Quote] {
        self.store.get_all()
    }

    pub fn categories(&self) -> &[String] {
        self.index.categories()
    }

    pub const fn selected_filter(&self) -> &CategoryFilter {
        self.index.selected()
    }

    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QuoteEvent> {
        self.events.subscribe()
    }

    /// Quotes matching `filter`, in collection order.
    pub fn quotes_in(&self, filter: &CategoryFilter) -> Vec<&Quote> {
        self.index.filter(self.store.get_all(), filter)
    }

    pub fn random_quote(&self, filter: &CategoryFilter) -> QuotePick {
        self.random_quote_with(filter, &mut rand::thread_rng())
    }

    pub fn random_quote_with<R: Rng + ?Sized>(
        &self,
        filter: &CategoryFilter,
        rng: &mut R,
    ) -> QuotePick {
        self.quotes_in(filter)
            .choose(rng)
            .map_or_else(
                || QuotePick::NoQuotesFound(filter.clone()),
                |quote| QuotePick::Found((*quote).clone()),
            )
    }

    /// Pick a random quote under the remembered filter and announce it.
    pub fn show_random_quote(&self) -> QuotePick {
        let pick = self.random_quote(self.index.selected());
        if let QuotePick::Found(quote) = &pick {
            self.events.publish(QuoteEvent::QuoteChanged(quote.clone()));
        }
        pick
    }

    /// Add a quote from user input.
    pub fn add_quote(
        &mut self,
        text: &str,
        author: Option<&str>,
        category: Option<&str>,
    ) -> Result<Quote> {
        let quote = self.store.add(text, author, category)?;
        self.refresh_categories();
        self.events.publish(QuoteEvent::QuoteChanged(quote.clone()));
        Ok(quote)
    }

    /// Import a JSON array of quotes, appending the acceptable ones.
    pub fn import_json(&mut self, payload: &str) -> Result<ImportSummary> {
        let batch = parse_import_payload(payload)?;
        let offered = batch.quotes.len();
        let imported = self.store.bulk_append(batch.quotes)?;
        let summary = ImportSummary {
            imported,
            dropped: batch.dropped + (offered - imported),
        };

        self.refresh_categories();
        tracing::info!(
            "Imported {} quotes ({} dropped)",
            summary.imported,
            summary.dropped
        );
        self.events
            .publish(QuoteEvent::Notice("Quotes imported successfully!".to_string()));
        Ok(summary)
    }

    /// Render the full collection for download.
    pub fn export_json(&self) -> Result<String> {
        if self.store.is_empty() {
            return Err(Error::Validation("No quotes to export".to_string()));
        }
        Ok(render_json_export(self.store.get_all())?)
    }

    /// Remember `filter` as the default view.
    pub fn select_filter(&mut self, filter: CategoryFilter) -> Result<()> {
        self.index.set_selected(filter)
    }

    /// Merge one batch of remote quotes, persisting and refreshing once.
    ///
    /// When the snapshot cannot be written the in-memory collection is put
    /// back as it was, so a failed merge leaves no trace.
    pub fn apply_remote(&mut self, remote: Vec<Quote>) -> Result<MergeReport> {
        let resolved_at = self.store.clock().now_millis();
        let before = self.store.get_all().to_vec();
        let report = merge_remote_quotes(&mut self.store, remote, resolved_at);

        if report.changed() {
            if let Err(error) = self.store.persist() {
                self.store.restore(before);
                return Err(error);
            }
            self.refresh_categories();
        }

        tracing::info!(
            "Merged remote quotes: {} added, {} overwritten, {} unchanged",
            report.added,
            report.overwritten,
            report.skipped
        );

        if report.has_conflicts() {
            self.events.publish(QuoteEvent::Conflict {
                message: format!(
                    "{} quote(s) were updated from the server.",
                    report.overwritten
                ),
                dismiss_after: CONFLICT_NOTICE_DURATION,
            });
        }
        Ok(report)
    }

    fn refresh_categories(&mut self) {
        if self.index.refresh(self.store.get_all()) {
            self.events.publish(QuoteEvent::CategoriesChanged(
                self.index.categories().to_vec(),
            ));
        }
    }
}
