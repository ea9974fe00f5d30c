//! Message channel trait - the seam to the outbound transport
//!
//! The core never speaks WhatsApp (or anything else) directly; it hands
//! an address and rendered text to whatever implements this trait.
//! Sends are blocking; the dispatcher wraps them in `spawn_blocking`
//! with a timeout. Batching or rate limiting, if ever needed, belongs
//! behind this seam.

use anyhow::Result;

/// What the channel reports back for one send.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The channel accepted the message for delivery.
    Sent,
    /// The channel chose not to send (dry-run). Not a delivery: the
    /// caller must not commit the cursor for it.
    Skipped(String),
    /// The channel tried and failed.
    Failed(String),
}

/// Outbound transport collaborator.
pub trait MessageChannel: Send + Sync {
    /// Channel name for logs.
    fn name(&self) -> &str;

    /// Deliver `text` to `address` (channel-specific addressing).
    fn send(&self, address: &str, text: &str) -> Result<SendOutcome>;
}
