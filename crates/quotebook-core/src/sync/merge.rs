//! Last-writer-wins merge of remote quotes into the local store.

use crate::models::{Quote, SyncConflict, LAST_WRITER_WINS};
use crate::storage::SnapshotStorage;
use crate::store::QuoteStore;

/// What one merge pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Remote quotes appended as new
    pub added: usize,
    /// Local quotes overwritten by strictly newer remote ones
    pub overwritten: usize,
    /// Remote quotes discarded because they were not newer
    pub skipped: usize,
    /// One entry per overwrite
    pub conflicts: Vec<SyncConflict>,
}

impl MergeReport {
    /// Whether any local quote was overwritten.
    pub const fn has_conflicts(&self) -> bool {
        self.overwritten > 0
    }

    /// Whether the store changed at all.
    pub const fn changed(&self) -> bool {
        self.added > 0 || self.overwritten > 0
    }
}

/// Apply `remote` to `store` in received order.
///
/// Unknown ids (and quotes without an id) are appended. A known id is
/// overwritten only when the remote timestamp is strictly greater; ties keep
/// the local value. The store is not persisted here.
pub fn merge_remote_quotes<S: SnapshotStorage>(
    store: &mut QuoteStore<S>,
    remote: Vec<Quote>,
    resolved_at: i64,
) -> MergeReport {
    let mut report = MergeReport::default();

    for incoming in remote {
        let local_updated_at = incoming
            .id
            .as_ref()
            .and_then(|id| store.find(id))
            .map(Quote::timestamp);

        match local_updated_at {
            None => {
                store.replace_or_insert(incoming);
                report.added += 1;
            }
            Some(local_updated_at) if incoming.timestamp() > local_updated_at => {
                let Some(quote_id) = incoming.id.clone() else {
                    continue;
                };
                report.conflicts.push(SyncConflict {
                    quote_id,
                    local_updated_at,
                    incoming_updated_at: incoming.timestamp(),
                    resolved_at,
                    strategy: LAST_WRITER_WINS.to_string(),
                });
                store.replace_or_insert(incoming);
                report.overwritten += 1;
            }
            Some(_) => report.skipped += 1,
        }
    }

    report
}
