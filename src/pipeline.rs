//! Pipeline - wires the feed through classifier, gate and dispatcher
//!
//! One task per event, but admit/dispatch/commit for a given order key
//! runs under that key's lock, so two in-flight events for the same
//! order can never both pass admission. Every failure is contained
//! here; the loop itself only ends when the feed closes.

use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::feed::FeedReceiver;
use crate::notification::{
    classify, Admission, DispatchOutcome, IdempotencyGate, NotificationDispatcher,
};
use crate::order::ChangeEvent;

pub struct Pipeline {
    gate: Arc<IdempotencyGate>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl Pipeline {
    pub fn new(gate: Arc<IdempotencyGate>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { gate, dispatcher }
    }

    /// Consume the feed until it closes, then drain in-flight handlers.
    pub async fn run(&self, mut feed: FeedReceiver) -> Result<()> {
        info!("listening for new orders and status updates");

        let mut handlers = JoinSet::new();
        while let Some(event) = feed.recv().await {
            let gate = Arc::clone(&self.gate);
            let dispatcher = Arc::clone(&self.dispatcher);
            handlers.spawn(async move {
                handle_event(&gate, &dispatcher, event).await;
            });
        }

        while let Some(joined) = handlers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "event handler panicked");
            }
        }
        Ok(())
    }
}

/// Process one change event end to end.
///
/// The key lock spans classification through commit: the admission check
/// and the commit see the same cursor for this key, closing the gap
/// where two handlers both observe "not yet processed".
pub async fn handle_event(
    gate: &Arc<IdempotencyGate>,
    dispatcher: &NotificationDispatcher,
    event: ChangeEvent,
) {
    let _key_guard = gate.key_lock(&event.key).await;

    let snapshot = gate.snapshot();
    let Some(intent) = classify(&event, &snapshot) else {
        return;
    };

    match gate.admit(&intent) {
        Admission::AlreadyProcessed => {
            debug!(key = %intent.order_key, kind = %intent.kind_label(), "already processed");
            return;
        }
        Admission::Admitted => {}
    }

    match dispatcher.dispatch(&intent).await {
        DispatchOutcome::Delivered => {
            // The flush is file I/O under a file lock; keep it off the
            // runtime threads.
            let committing = Arc::clone(gate);
            let committed = intent.clone();
            match tokio::task::spawn_blocking(move || committing.commit(&committed)).await {
                Ok(Ok(())) => {
                    info!(key = %intent.order_key, kind = %intent.kind_label(), "notification sent");
                }
                Ok(Err(e)) => {
                    // Delivered but not recorded: restart or redelivery may
                    // duplicate this one notification. Preferable to
                    // pretending it was committed.
                    error!(key = %intent.order_key, error = %e, "commit failed after delivery");
                }
                Err(e) => {
                    error!(key = %intent.order_key, error = %e, "commit task failed");
                }
            }
        }
        DispatchOutcome::Skipped(reason) => {
            info!(key = %intent.order_key, reason = %reason, "dispatch skipped, cursor unchanged");
        }
        DispatchOutcome::Failed(e) => {
            warn!(key = %intent.order_key, error = %e, "dispatch failed, awaiting feed redelivery");
        }
    }
}
