//! De-duplication cursor - the single source of truth for "already notified"
//!
//! The cursor is a per-key processed set plus the legacy scalar watermark
//! kept by the first revision of this service. Marks are only ever added,
//! never removed; the watermark is carried as loaded and never raised by
//! new work. The file format stays readable by (and from) the old
//! watermark-only `lastProcessedTimestamp.json`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::notification::intent::{IntentKind, NotificationIntent};
use crate::order::OrderStatus;

/// Processed marks for one order key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyMarks {
    /// The creation notification went out.
    #[serde(default)]
    pub created: bool,
    /// Statuses for which a transition notification went out.
    #[serde(default)]
    pub statuses: Vec<OrderStatus>,
}

/// Durable de-duplication state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    /// Legacy watermark: creation events at or before this timestamp were
    /// handled by the watermark-only revision. Read-only after load; the
    /// feed gives no timestamp ordering, so raising it on new commits
    /// would silently drop a late-delivered creation with an earlier
    /// timestamp. Field name matches the old cursor file.
    #[serde(rename = "timestamp", default)]
    pub watermark: i64,
    #[serde(default)]
    pub processed: HashMap<String, KeyMarks>,
}

impl Cursor {
    /// Whether the creation notification for `key` already went out.
    pub fn is_created(&self, key: &str) -> bool {
        self.processed.get(key).map_or(false, |m| m.created)
    }

    /// Whether a transition into `status` was already notified for `key`.
    pub fn has_status(&self, key: &str, status: &OrderStatus) -> bool {
        self.processed
            .get(key)
            .map_or(false, |m| m.statuses.contains(status))
    }

    /// Whether this exact intent was already satisfied.
    pub fn contains(&self, intent: &NotificationIntent) -> bool {
        match &intent.kind {
            IntentKind::OrderCreated { .. } => self.is_created(&intent.order_key),
            IntentKind::StatusChanged { to, .. } => self.has_status(&intent.order_key, to),
        }
    }

    /// Record a satisfied intent. The watermark is never touched:
    /// suppressing by timestamp is the historical bug of the
    /// watermark-only design, and the per-key set covers everything the
    /// watermark used to.
    pub fn mark(&mut self, intent: &NotificationIntent) {
        let marks = self.processed.entry(intent.order_key.clone()).or_default();
        match &intent.kind {
            IntentKind::OrderCreated { .. } => {
                marks.created = true;
            }
            IntentKind::StatusChanged { to, .. } => {
                if !marks.statuses.contains(to) {
                    marks.statuses.push(to.clone());
                }
            }
        }
    }
}
