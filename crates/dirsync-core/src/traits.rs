//! Repository capability traits.
//!
//! The source and target sides expose distinct capabilities so that no
//! implementation carries methods it cannot honor: a relational source can
//! only enumerate, a directory target can only look up and apply.

use async_trait::async_trait;

use crate::error::SyncResult;
use crate::user::UserRecord;

/// Capability of the authoritative source system.
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// Fetch the complete current snapshot of source users.
    ///
    /// The snapshot is all-or-nothing: implementations must fail the whole
    /// call rather than silently return a partial set.
    async fn fetch_all_users(&self) -> SyncResult<Vec<UserRecord>>;
}

/// Capability of the reconciliation target system.
#[async_trait]
pub trait TargetRepository: Send + Sync {
    /// Look up one target record by its identity value.
    ///
    /// Returns `Ok(None)` when no record matches; errors are reserved for
    /// transport failures.
    async fn find_user(&self, identifier: &str) -> SyncResult<Option<UserRecord>>;

    /// Apply the mapped fields of `user` to the matching target record.
    ///
    /// A record that has vanished since lookup is a logged no-op. Commit
    /// failures are returned as errors.
    async fn apply_update(&self, user: &UserRecord) -> SyncResult<()>;
}
