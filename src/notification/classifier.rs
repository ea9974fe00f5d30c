//! Event classifier - maps change events to notification intents
//!
//! Pure decision logic: given one change event and a cursor snapshot,
//! emit at most one intent. The no-op suppression on `Modified` events
//! is the property the whole service hangs on - a status write-back by
//! this very service re-triggers the feed, and without the
//! `previous_status != status` guard that echo would notify again.

use tracing::debug;

use super::cursor::Cursor;
use super::formatter;
use super::intent::{IntentKind, NotificationIntent};
use crate::order::{ChangeEvent, ChangeKind};

/// Classify one change event against a cursor snapshot.
///
/// Returns `None` for anything that must not notify: already-processed
/// creations, no-op updates, statuses outside the notifiable set, and
/// records without an audience.
pub fn classify(event: &ChangeEvent, cursor: &Cursor) -> Option<NotificationIntent> {
    let record = &event.record;

    if record.customer_phone.trim().is_empty() {
        debug!(key = %event.key, "no audience phone, skipping");
        return None;
    }

    match event.kind {
        ChangeKind::Added => {
            if cursor.is_created(&event.key) {
                debug!(key = %event.key, "creation already notified");
                return None;
            }
            // Legacy watermark guard: orders from before the last
            // watermark-only run were handled by it.
            if record.timestamp <= cursor.watermark {
                debug!(key = %event.key, timestamp = record.timestamp, watermark = cursor.watermark, "at or below watermark");
                return None;
            }

            Some(NotificationIntent {
                order_key: event.key.clone(),
                audience_phone: record.customer_phone.clone(),
                kind: IntentKind::OrderCreated {
                    customer_name: record.customer_name.clone(),
                    order_date: record.order_date.clone(),
                    order_time: record.order_time.clone(),
                    status: record.status.clone(),
                },
                rendered_items: formatter::render_items(&record.items),
                record_timestamp: record.timestamp,
            })
        }
        ChangeKind::Modified => {
            if !record.status.is_notifiable() {
                return None;
            }
            // No-op suppression: unrelated field edits (including our own
            // previous_status write-back) must not re-notify.
            if record.previous_status.as_ref() == Some(&record.status) {
                debug!(key = %event.key, status = %record.status, "status unchanged, suppressing");
                return None;
            }
            if cursor.has_status(&event.key, &record.status) {
                debug!(key = %event.key, status = %record.status, "transition already notified");
                return None;
            }

            Some(NotificationIntent {
                order_key: event.key.clone(),
                audience_phone: record.customer_phone.clone(),
                kind: IntentKind::StatusChanged {
                    from: record.previous_status.clone(),
                    to: record.status.clone(),
                },
                rendered_items: String::new(),
                record_timestamp: record.timestamp,
            })
        }
    }
}
