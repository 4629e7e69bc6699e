//! End-to-end reconciliation scenarios over mock repositories.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use dirsync_core::{
    FieldMappings, SourceRepository, SyncError, SyncResult, TargetRepository, UserField, UserRecord,
};
use dirsync_engine::{SyncEngine, SyncWorker, WorkerConfig};

/// Source mock: serves a fixed snapshot, optionally failing the first N
/// calls, optionally cancelling a token once enough calls have been seen.
#[derive(Default)]
struct MockSource {
    users: Vec<UserRecord>,
    fail_times: usize,
    calls: AtomicUsize,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl MockSource {
    fn with_users(users: Vec<UserRecord>) -> Self {
        Self {
            users,
            ..Self::default()
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceRepository for MockSource {
    async fn fetch_all_users(&self) -> SyncResult<Vec<UserRecord>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some((after, token)) = &self.cancel_after {
            if call >= *after {
                token.cancel();
            }
        }

        if call <= self.fail_times {
            return Err(SyncError::source_fetch("database unreachable"));
        }

        Ok(self.users.clone())
    }
}

/// Target mock: an in-memory directory keyed by account name. Applies merge
/// every field except the account name, which real directories keep under
/// protection.
struct MockDirectory {
    users: Mutex<HashMap<String, UserRecord>>,
    applied: Mutex<Vec<UserRecord>>,
}

impl MockDirectory {
    fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        let users = users
            .into_iter()
            .filter_map(|u| u.sam_account_name.clone().map(|id| (id, u)))
            .collect();
        Self {
            users: Mutex::new(users),
            applied: Mutex::new(Vec::new()),
        }
    }

    fn empty() -> Self {
        Self::with_users([])
    }

    fn applied_count(&self) -> usize {
        self.applied.lock().unwrap().len()
    }

    fn stored(&self, identifier: &str) -> Option<UserRecord> {
        self.users.lock().unwrap().get(identifier).cloned()
    }
}

#[async_trait]
impl TargetRepository for MockDirectory {
    async fn find_user(&self, identifier: &str) -> SyncResult<Option<UserRecord>> {
        Ok(self.users.lock().unwrap().get(identifier).cloned())
    }

    async fn apply_update(&self, user: &UserRecord) -> SyncResult<()> {
        self.applied.lock().unwrap().push(user.clone());

        let Some(identifier) = user.identity(UserField::SamAccountName) else {
            return Err(SyncError::invalid_record("missing account name"));
        };

        let mut store = self.users.lock().unwrap();
        if let Some(existing) = store.get_mut(&identifier) {
            for field in UserField::all() {
                if *field != UserField::SamAccountName {
                    existing.set(*field, user.get(*field));
                }
            }
        }
        Ok(())
    }
}

/// Target mock whose lookups always fail at the transport layer.
struct UnreachableDirectory;

#[async_trait]
impl TargetRepository for UnreachableDirectory {
    async fn find_user(&self, identifier: &str) -> SyncResult<Option<UserRecord>> {
        Err(SyncError::target_lookup(identifier, "connection refused"))
    }

    async fn apply_update(&self, _user: &UserRecord) -> SyncResult<()> {
        Err(SyncError::commit("?", "connection refused"))
    }
}

fn user(account: &str, email: &str) -> UserRecord {
    UserRecord {
        sam_account_name: Some(account.to_string()),
        email: Some(email.to_string()),
        ..UserRecord::default()
    }
}

fn mail_mapping() -> FieldMappings {
    FieldMappings::new([("mail", "email")]).unwrap()
}

fn engine(source: Arc<MockSource>, target: Arc<dyn TargetRepository>) -> SyncEngine {
    SyncEngine::new(source, target, mail_mapping(), UserField::SamAccountName)
}

#[tokio::test]
async fn sync_updates_user_when_attributes_differ() {
    let source = Arc::new(MockSource::with_users(vec![user("jdoe", "new@x.com")]));
    let target = Arc::new(MockDirectory::with_users([user("jdoe", "old@x.com")]));
    let engine = engine(source, target.clone());

    let stats = engine.run(false).await.unwrap();

    assert_eq!(stats.updated, 1);
    assert_eq!(target.applied_count(), 1);
    let stored = target.stored("jdoe").unwrap();
    assert_eq!(stored.email.as_deref(), Some("new@x.com"));
    assert_eq!(stored.sam_account_name.as_deref(), Some("jdoe"));
}

#[tokio::test]
async fn sync_does_not_update_matching_user() {
    let source = Arc::new(MockSource::with_users(vec![user("jdoe", "same@x.com")]));
    let target = Arc::new(MockDirectory::with_users([user("jdoe", "same@x.com")]));
    let engine = engine(source, target.clone());

    let stats = engine.run(false).await.unwrap();

    assert_eq!(stats.up_to_date, 1);
    assert_eq!(stats.updated, 0);
    assert_eq!(target.applied_count(), 0);
}

#[tokio::test]
async fn sync_skips_user_missing_in_target() {
    let source = Arc::new(MockSource::with_users(vec![user("jdoe", "new@x.com")]));
    let target = Arc::new(MockDirectory::empty());
    let engine = engine(source, target.clone());

    let stats = engine.run(false).await.unwrap();

    assert_eq!(stats.missing_in_target, 1);
    assert_eq!(target.applied_count(), 0);
}

#[tokio::test]
async fn dry_run_reports_without_mutating() {
    let source = Arc::new(MockSource::with_users(vec![user("jdoe", "new@x.com")]));
    let target = Arc::new(MockDirectory::with_users([user("jdoe", "old@x.com")]));
    let engine = engine(source, target.clone());

    let stats = engine.run(true).await.unwrap();

    assert_eq!(stats.would_update, 1);
    assert_eq!(stats.updated, 0);
    assert_eq!(target.applied_count(), 0);
    assert_eq!(
        target.stored("jdoe").unwrap().email.as_deref(),
        Some("old@x.com")
    );
}

#[tokio::test]
async fn record_without_identity_is_skipped() {
    let nameless = UserRecord {
        email: Some("ghost@x.com".to_string()),
        ..UserRecord::default()
    };
    let source = Arc::new(MockSource::with_users(vec![nameless]));
    let target = Arc::new(MockDirectory::empty());
    let engine = engine(source, target.clone());

    let stats = engine.run(false).await.unwrap();

    assert_eq!(stats.skipped_no_identity, 1);
    assert_eq!(stats.missing_in_target, 0);
    assert_eq!(target.applied_count(), 0);
}

#[tokio::test]
async fn source_failure_propagates() {
    let source = Arc::new(MockSource {
        fail_times: 1,
        ..MockSource::default()
    });
    let target = Arc::new(MockDirectory::empty());
    let engine = engine(source, target);

    let err = engine.run(false).await.unwrap_err();
    assert!(matches!(err, SyncError::SourceFetch { .. }));
}

#[tokio::test]
async fn target_lookup_failure_propagates() {
    let source = Arc::new(MockSource::with_users(vec![user("jdoe", "new@x.com")]));
    let engine = engine(source, Arc::new(UnreachableDirectory));

    let err = engine.run(false).await.unwrap_err();
    assert!(matches!(err, SyncError::TargetLookup { .. }));
}

#[tokio::test]
async fn run_once_signals_shutdown_after_one_cycle() {
    let source = Arc::new(MockSource::with_users(vec![]));
    let target = Arc::new(MockDirectory::empty());
    let engine = Arc::new(engine(source.clone(), target));

    let worker = SyncWorker::new(
        engine,
        WorkerConfig {
            run_once: true,
            ..WorkerConfig::default()
        },
    );
    let shutdown = worker.shutdown_signal();

    worker.run(CancellationToken::new()).await.unwrap();

    assert_eq!(source.call_count(), 1);
    assert!(shutdown.is_cancelled());
}

#[tokio::test]
async fn run_once_signals_shutdown_even_when_cycle_fails() {
    let source = Arc::new(MockSource {
        fail_times: usize::MAX,
        ..MockSource::default()
    });
    let target = Arc::new(MockDirectory::empty());
    let engine = Arc::new(engine(source.clone(), target));

    let worker = SyncWorker::new(
        engine,
        WorkerConfig {
            run_once: true,
            ..WorkerConfig::default()
        },
    );
    let shutdown = worker.shutdown_signal();

    // The failed cycle is logged, not escalated to the host
    worker.run(CancellationToken::new()).await.unwrap();

    assert_eq!(source.call_count(), 1);
    assert!(shutdown.is_cancelled());
}

#[tokio::test(start_paused = true)]
async fn continuous_mode_survives_failing_cycle() {
    let cancel = CancellationToken::new();
    let source = Arc::new(MockSource {
        // First cycle fails; the loop must carry on to the second
        fail_times: 1,
        cancel_after: Some((2, cancel.clone())),
        ..MockSource::default()
    });
    let target = Arc::new(MockDirectory::empty());
    let engine = Arc::new(engine(source.clone(), target));

    let worker = SyncWorker::new(
        engine,
        WorkerConfig {
            sync_interval: Duration::from_millis(50),
            ..WorkerConfig::default()
        },
    );

    worker.run(cancel).await.unwrap();

    assert_eq!(source.call_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_the_wait() {
    let cancel = CancellationToken::new();
    let source = Arc::new(MockSource::with_users(vec![]));
    let target = Arc::new(MockDirectory::empty());
    let engine = Arc::new(engine(source.clone(), target));

    let worker = Arc::new(SyncWorker::new(
        engine,
        WorkerConfig {
            // Far longer than the test runs; only cancellation can end the wait
            sync_interval: Duration::from_secs(300),
            ..WorkerConfig::default()
        },
    ));

    let handle = tokio::spawn({
        let worker = worker.clone();
        let cancel = cancel.clone();
        async move { worker.run(cancel).await }
    });

    tokio::time::sleep(Duration::from_millis(10)).await;
    cancel.cancel();

    handle.await.unwrap().unwrap();
    assert_eq!(source.call_count(), 1);
}
