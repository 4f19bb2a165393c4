//! Service layer shared by every Quotebook front end.

mod quote_book;

pub use quote_book::{ImportSummary, QuoteBook, QuotePick};
