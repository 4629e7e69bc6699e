//! Reconciliation engine.
//!
//! One cycle walks the full source snapshot, resolves each record in the
//! target by its identity value, diffs the mapped fields, and applies
//! updates (or only reports them under dry-run).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use dirsync_core::{
    FieldMappings, SourceRepository, SyncResult, TargetRepository, UserField, UserRecord,
};

/// Decision for a single source record against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordDecision {
    /// No matching record in the target system.
    NoTarget,
    /// All mapped fields already match.
    UpToDate,
    /// At least one mapped field differs.
    NeedsUpdate,
}

impl fmt::Display for RecordDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordDecision::NoTarget => write!(f, "no_target"),
            RecordDecision::UpToDate => write!(f, "up_to_date"),
            RecordDecision::NeedsUpdate => write!(f, "needs_update"),
        }
    }
}

/// Counters for one reconciliation cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleStats {
    /// Records in the source snapshot.
    pub source_total: usize,
    /// Records skipped for lacking an identity value.
    pub skipped_no_identity: usize,
    /// Records with no matching target entry.
    pub missing_in_target: usize,
    /// Records already in sync.
    pub up_to_date: usize,
    /// Records updated in the target.
    pub updated: usize,
    /// Records that would have been updated (dry-run only).
    pub would_update: usize,
}

impl CycleStats {
    /// Create counters for a snapshot of the given size.
    #[must_use]
    pub fn new(source_total: usize) -> Self {
        Self {
            source_total,
            ..Self::default()
        }
    }
}

impl fmt::Display for CycleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} source records: {} updated, {} would update, {} up-to-date, {} missing in target, {} skipped",
            self.source_total,
            self.updated,
            self.would_update,
            self.up_to_date,
            self.missing_in_target,
            self.skipped_no_identity
        )
    }
}

/// Orchestrates per-record synchronization from source to target.
pub struct SyncEngine {
    source: Arc<dyn SourceRepository>,
    target: Arc<dyn TargetRepository>,
    mappings: FieldMappings,
    identity_field: UserField,
}

impl SyncEngine {
    /// Create a new engine.
    ///
    /// The mapping table and identity field are owned by configuration and
    /// never mutated here.
    pub fn new(
        source: Arc<dyn SourceRepository>,
        target: Arc<dyn TargetRepository>,
        mappings: FieldMappings,
        identity_field: UserField,
    ) -> Self {
        Self {
            source,
            target,
            mappings,
            identity_field,
        }
    }

    /// Run one reconciliation cycle.
    ///
    /// Under dry-run no target mutation happens; decisions are logged and
    /// counted only. Any failure is logged here and returned to the caller,
    /// never swallowed.
    pub async fn run(&self, dry_run: bool) -> SyncResult<CycleStats> {
        match self.run_cycle(dry_run).await {
            Ok(stats) => {
                info!(dry_run, %stats, "reconciliation cycle complete");
                Ok(stats)
            }
            Err(e) => {
                error!(error = %e, "error during user synchronization");
                Err(e)
            }
        }
    }

    async fn run_cycle(&self, dry_run: bool) -> SyncResult<CycleStats> {
        let users = self.source.fetch_all_users().await?;
        info!(count = users.len(), "retrieved users from source");

        let mut stats = CycleStats::new(users.len());

        for user in &users {
            let Some(identifier) = user.identity(self.identity_field) else {
                warn!(
                    identity_field = %self.identity_field,
                    "source record has no identity value, skipping"
                );
                stats.skipped_no_identity += 1;
                continue;
            };

            let target_user = self.target.find_user(&identifier).await?;

            match self.decide(user, target_user.as_ref()) {
                RecordDecision::NoTarget => {
                    warn!(identifier = %identifier, "user not found in target system");
                    stats.missing_in_target += 1;
                }
                RecordDecision::UpToDate => {
                    info!(identifier = %identifier, "user is up-to-date, no update required");
                    stats.up_to_date += 1;
                }
                RecordDecision::NeedsUpdate => {
                    info!(identifier = %identifier, "user needs update");
                    if dry_run {
                        stats.would_update += 1;
                    } else {
                        self.target.apply_update(user).await?;
                        stats.updated += 1;
                    }
                }
            }
        }

        Ok(stats)
    }

    /// Classify one source record against its (possibly absent) target.
    #[must_use]
    pub fn decide(&self, source: &UserRecord, target: Option<&UserRecord>) -> RecordDecision {
        match target {
            None => RecordDecision::NoTarget,
            Some(target) if self.needs_update(source, target) => RecordDecision::NeedsUpdate,
            Some(_) => RecordDecision::UpToDate,
        }
    }

    /// Check whether any mapped field differs between source and target.
    ///
    /// Comparison is normalized: an absent field and a blank string are the
    /// same value.
    #[must_use]
    pub fn needs_update(&self, source: &UserRecord, target: &UserRecord) -> bool {
        self.mappings
            .iter()
            .any(|m| source.get_normalized(m.field) != target.get_normalized(m.field))
    }
}
