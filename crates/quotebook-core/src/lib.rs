//! quotebook-core - Core library for Quotebook
//!
//! Holds the quote collection and its persistence, the category index, JSON
//! import/export, and last-writer-wins reconciliation with a remote source.
//! The CLI is a thin layer over [`services::QuoteBook`] and [`sync::SyncEngine`].

pub mod categories;
pub mod clock;
pub mod config;
pub mod db;
mod defaults;
pub mod error;
pub mod events;
pub mod export;
pub mod import;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod store;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Quote, QuoteId, SyncConflict};
