//! Idempotency gate - admit/commit around the dispatch
//!
//! The gate owns the cursor: all mutation goes through `commit`, which
//! flushes to the durable store before returning. Handlers for the same
//! order key must not interleave their admit/dispatch/commit sequences,
//! so the gate also hands out per-key locks; the pipeline holds the lock
//! across the whole sequence.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use super::cursor::Cursor;
use super::intent::NotificationIntent;
use super::store::CursorStore;
use crate::error::PersistenceFailure;

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// Expected rejection, not an error: the intent was already satisfied.
    AlreadyProcessed,
}

const LOCK_MAP_CLEANUP_THRESHOLD: usize = 1024;

pub struct IdempotencyGate {
    cursor: StdMutex<Cursor>,
    store: CursorStore,
    key_locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl IdempotencyGate {
    /// Build a gate over a store, loading the persisted cursor.
    pub fn new(store: CursorStore) -> Self {
        let cursor = store.load();
        Self {
            cursor: StdMutex::new(cursor),
            store,
            key_locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Acquire the per-key lock. The caller holds the guard across
    /// classify, admit, dispatch and commit for that key.
    pub async fn key_lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.key_locks.lock().unwrap_or_else(|p| p.into_inner());
            if locks.len() > LOCK_MAP_CLEANUP_THRESHOLD {
                // Drop locks nobody is waiting on; an entry is recreated
                // on the next event for that key.
                locks.retain(|_, l| Arc::strong_count(l) > 1);
            }
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Snapshot of the cursor for classification. Valid for dedup
    /// decisions only while the caller holds the key lock.
    pub fn snapshot(&self) -> Cursor {
        self.cursor
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Check whether an intent still needs to be satisfied.
    pub fn admit(&self, intent: &NotificationIntent) -> Admission {
        let cursor = self.cursor.lock().unwrap_or_else(|p| p.into_inner());
        if cursor.contains(intent) {
            debug!(key = %intent.order_key, kind = %intent.kind_label(), "rejecting, already processed");
            Admission::AlreadyProcessed
        } else {
            Admission::Admitted
        }
    }

    /// Record a satisfied intent and flush synchronously.
    ///
    /// Call only after the dispatcher reported delivery. If the flush
    /// fails, the in-memory mark is rolled back and the error returned:
    /// the event stays eligible for reprocessing, and success is never
    /// fabricated.
    pub fn commit(&self, intent: &NotificationIntent) -> Result<(), PersistenceFailure> {
        let mut cursor = self.cursor.lock().unwrap_or_else(|p| p.into_inner());
        let before = cursor.clone();
        cursor.mark(intent);

        if let Err(e) = self.store.save(&cursor) {
            *cursor = before;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::intent::IntentKind;
    use crate::order::OrderStatus;
    use std::fs;
    use tempfile::tempdir;

    fn intent(key: &str, to: OrderStatus) -> NotificationIntent {
        NotificationIntent {
            order_key: key.to_string(),
            audience_phone: "9876543210".to_string(),
            kind: IntentKind::StatusChanged {
                from: Some(OrderStatus::New),
                to,
            },
            rendered_items: String::new(),
            record_timestamp: 100,
        }
    }

    #[test]
    fn test_admit_then_commit_then_reject() {
        let dir = tempdir().unwrap();
        let gate = IdempotencyGate::new(CursorStore::new(dir.path().join("cursor.json")));
        let i = intent("K1", OrderStatus::Confirmed);

        assert_eq!(gate.admit(&i), Admission::Admitted);
        gate.commit(&i).unwrap();
        assert_eq!(gate.admit(&i), Admission::AlreadyProcessed);
    }

    #[test]
    fn test_commit_flushes_to_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cursor.json");
        let gate = IdempotencyGate::new(CursorStore::new(&path));

        gate.commit(&intent("K1", OrderStatus::Confirmed)).unwrap();

        // A fresh gate over the same file sees the mark.
        let fresh = IdempotencyGate::new(CursorStore::new(&path));
        assert_eq!(
            fresh.admit(&intent("K1", OrderStatus::Confirmed)),
            Admission::AlreadyProcessed
        );
        assert_eq!(
            fresh.admit(&intent("K1", OrderStatus::Cooking)),
            Admission::Admitted
        );
    }

    #[test]
    fn test_failed_flush_rolls_back() {
        let dir = tempdir().unwrap();
        // A file where the parent directory should be makes every save fail.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();
        let gate = IdempotencyGate::new(CursorStore::new(blocker.join("cursor.json")));
        let i = intent("K1", OrderStatus::Confirmed);

        assert!(gate.commit(&i).is_err());
        // The mark must not stick: the event stays eligible.
        assert_eq!(gate.admit(&i), Admission::Admitted);
    }

    #[tokio::test]
    async fn test_key_lock_serializes_same_key() {
        let dir = tempdir().unwrap();
        let gate = Arc::new(IdempotencyGate::new(CursorStore::new(
            dir.path().join("cursor.json"),
        )));

        let guard = gate.key_lock("K1").await;
        let gate2 = Arc::clone(&gate);
        let contender = tokio::spawn(async move {
            let _g = gate2.key_lock("K1").await;
        });

        // The contender cannot finish while we hold the lock.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_key_lock_independent_keys_do_not_block() {
        let dir = tempdir().unwrap();
        let gate = IdempotencyGate::new(CursorStore::new(dir.path().join("cursor.json")));

        let _g1 = gate.key_lock("K1").await;
        // Must not deadlock.
        let _g2 = gate.key_lock("K2").await;
    }
}
