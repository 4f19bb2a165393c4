//! Data models for Quotebook

mod quote;
mod sync_conflict;

pub use quote::{Quote, QuoteId, UNKNOWN_AUTHOR};
pub use sync_conflict::{SyncConflict, LAST_WRITER_WINS};
