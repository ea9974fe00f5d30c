//! order-notify - WhatsApp notifications for food order lifecycle events
//!
//! Watches a change feed over an order collection and sends a templated
//! message for each meaningful transition, exactly once per
//! `(order, transition)` across restarts (at-least-once under failure).

pub mod config;
pub mod error;
pub mod feed;
pub mod notification;
pub mod order;
pub mod pipeline;

pub use config::AppConfig;
pub use error::{DispatchError, PersistenceFailure};
pub use feed::{FeedReceiver, JsonlFeed};
pub use notification::{
    classify, Admission, ConsoleChannel, Cursor, CursorStore, DispatchOutcome, HttpGatewayChannel,
    HttpGatewayConfig, IdempotencyGate, IntentKind, MessageChannel, NotificationDispatcher,
    NotificationIntent, SendOutcome,
};
pub use order::{ChangeEvent, ChangeKind, OrderItem, OrderRecord, OrderStatus};
pub use pipeline::Pipeline;
