//! Idempotent event-notification core
//!
//! Data flow: change feed -> classifier -> idempotency gate -> dispatcher
//! -> message channel, with the delivered outcome committed back into the
//! gate's durable cursor. The classifier decides *whether* a change is
//! notification-worthy, the gate decides *whether it still needs doing*,
//! and the dispatcher is the only part that touches the outside world.

pub mod channel;
pub mod channels;
pub mod classifier;
pub mod cursor;
pub mod dispatcher;
pub mod formatter;
pub mod gate;
pub mod intent;
pub mod store;

pub use channel::{MessageChannel, SendOutcome};
pub use channels::{ConsoleChannel, HttpGatewayChannel, HttpGatewayConfig};
pub use classifier::classify;
pub use cursor::{Cursor, KeyMarks};
pub use dispatcher::{DispatchOutcome, NotificationDispatcher};
pub use gate::{Admission, IdempotencyGate};
pub use intent::{IntentKind, NotificationIntent};
pub use store::CursorStore;
