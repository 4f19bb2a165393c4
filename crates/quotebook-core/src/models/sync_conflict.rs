//! Sync conflict model

use serde::{Deserialize, Serialize};

use super::QuoteId;

/// Strategy name recorded for timestamp-based conflict resolution.
pub const LAST_WRITER_WINS: &str = "lww";

/// A local quote overwritten by a strictly newer remote version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConflict {
    /// Quote involved in the conflict
    pub quote_id: QuoteId,
    /// Local timestamp before the overwrite
    pub local_updated_at: i64,
    /// Incoming timestamp that won
    pub incoming_updated_at: i64,
    /// Resolution timestamp (unix ms)
    pub resolved_at: i64,
    /// Resolution strategy name
    pub strategy: String,
}
