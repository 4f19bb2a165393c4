use std::io;

use quotebook_core::sync::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] quotebook_core::Error),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No quote text provided")]
    EmptyQuoteText,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Remote sync is disabled. Run `quotebook config init --enable-remote` to turn it back on."
    )]
    RemoteDisabled,
}
