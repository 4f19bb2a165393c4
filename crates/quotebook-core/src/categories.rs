//! Category faceting and the remembered category filter.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::models::Quote;
use crate::storage::{SnapshotStorage, SELECTED_CATEGORY_KEY};

/// Stored value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Which quotes a view shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    /// Parse a stored or user-supplied selection; blank and `"all"` mean no filter.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Category(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Category(name) => name,
        }
    }

    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Category(name) => quote.category_name() == Some(name.as_str()),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distinct non-empty categories in first-seen order.
pub fn distinct_categories(quotes: &[Quote]) -> Vec<String> {
    let mut seen = HashSet::new();
    quotes
        .iter()
        .filter_map(Quote::category_name)
        .filter(|category| seen.insert(*category))
        .map(str::to_string)
        .collect()
}

/// Quotes matching `selection`, in collection order.
pub fn filter_quotes<'a>(quotes: &'a [Quote], selection: &CategoryFilter) -> Vec<&'a Quote> {
    quotes
        .iter()
        .filter(|quote| selection.matches(quote))
        .collect()
}

/// Derived view of the categories present in a quote collection.
///
/// Only the selected filter is persisted; the category list is rebuilt from
/// the collection by [`CategoryIndex::refresh`].
pub struct CategoryIndex<S> {
    storage: S,
    categories: Vec<String>,
    selected: CategoryFilter,
}

impl<S: SnapshotStorage> CategoryIndex<S> {
    /// Build the index and restore the remembered filter.
    ///
    /// An unreadable preference falls back to showing all quotes.
    pub fn load(storage: S, quotes: &[Quote]) -> Self {
        let selected = match storage.read(SELECTED_CATEGORY_KEY) {
            Ok(value) => value
                .as_deref()
                .map(CategoryFilter::parse)
                .unwrap_or_default(),
            Err(error) => {
                tracing::warn!("Failed to read selected category: {error}");
                CategoryFilter::All
            }
        };

        Self {
            storage,
            categories: distinct_categories(quotes),
            selected,
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Recompute categories; returns `true` when the list changed.
    pub fn refresh(&mut self, quotes: &[Quote]) -> bool {
        let categories = distinct_categories(quotes);
        if categories == self.categories {
            return false;
        }
        self.categories = categories;
        true
    }

    pub const fn selected(&self) -> &CategoryFilter {
        &self.selected
    }

    /// Remember `selection` across reloads.
    pub fn set_selected(&mut self, selection: CategoryFilter) -> Result<()> {
        self.storage
            .write(SELECTED_CATEGORY_KEY, selection.as_str())?;
        self.selected = selection;
        Ok(())
    }

    /// Quotes matching `selection`.
    pub fn filter<'a>(&self, quotes: &'a [Quote], selection: &CategoryFilter) -> Vec<&'a Quote> {
        filter_quotes(quotes, selection)
    }
}
