//! # dirsync engine
//!
//! Reconciliation orchestration for dirsync.
//!
//! ```text
//! ┌────────────┐     ┌──────────────┐     ┌──────────────────┐
//! │ SyncWorker │────►│  SyncEngine  │────►│ SourceRepository │
//! │ (interval/ │     │ (fetch, diff,│     ├──────────────────┤
//! │  run-once) │     │  apply)      │────►│ TargetRepository │
//! └────────────┘     └──────────────┘     └──────────────────┘
//! ```
//!
//! - [`SyncEngine`] runs one cycle: full source snapshot, per-record target
//!   lookup by identity, mapped-field diff, conditional apply (dry-run
//!   reports only)
//! - [`SyncWorker`] drives cycles once or on a fixed interval with
//!   per-cycle failure isolation and cooperative cancellation

pub mod engine;
pub mod worker;

pub use engine::{CycleStats, RecordDecision, SyncEngine};
pub use worker::{SyncWorker, WorkerConfig};
