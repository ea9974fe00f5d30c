//! Notification intents - the decision that a message should go out
//!
//! An intent is pure derived data with no identity beyond
//! `(order_key, kind discriminant)`; the idempotency gate dedups on
//! exactly that pair.

use serde::{Deserialize, Serialize};

use crate::order::OrderStatus;

/// What kind of notification an intent asks for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntentKind {
    /// A new order landed; send the itemized summary.
    OrderCreated {
        customer_name: String,
        order_date: String,
        order_time: String,
        status: OrderStatus,
    },
    /// The order moved into a notifiable status.
    StatusChanged {
        from: Option<OrderStatus>,
        to: OrderStatus,
    },
}

/// A single outbound notification, prior to dedup and dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationIntent {
    pub order_key: String,
    /// Local phone digits; the dispatcher resolves the channel address.
    pub audience_phone: String,
    pub kind: IntentKind,
    /// Pre-rendered item lines for the order summary.
    pub rendered_items: String,
    /// Creation time of the source record, carried for logging.
    pub record_timestamp: i64,
}

impl NotificationIntent {
    /// Stable label for the dedup identity of this intent.
    pub fn kind_label(&self) -> String {
        match &self.kind {
            IntentKind::OrderCreated { .. } => "created".to_string(),
            IntentKind::StatusChanged { to, .. } => format!("status:{to}"),
        }
    }
}
