//! Reconciliation of the local quote book with a remote source.
//!
//! A [`SyncEngine`] fetches remote records, maps them into quotes, and merges
//! them into a [`crate::services::QuoteBook`] using last-writer-wins. Remote
//! failures are logged and contained; they never surface as user errors.

mod engine;
mod merge;
mod remote;

pub use engine::{SyncEngine, SyncHandle, SyncOutcome};
pub use merge::{merge_remote_quotes, MergeReport};
pub use remote::{
    decode_records, HttpRemoteSource, RemoteRecord, RemoteSource, DEFAULT_REMOTE_URL,
    SERVER_CATEGORY,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid sync configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),
    #[error("Remote push failed: {0}")]
    RemotePush(String),
    #[error("Failed to store merged quotes: {0}")]
    Store(#[from] crate::Error),
}

pub type SyncResult<T> = Result<T, SyncError>;
