//! Console channel - prints messages instead of sending them
//!
//! Used for local development and as the dry-run transport.

use anyhow::Result;

use crate::notification::channel::{MessageChannel, SendOutcome};

pub struct ConsoleChannel {
    dry_run: bool,
}

impl ConsoleChannel {
    /// Messages print and count as sent.
    pub fn new() -> Self {
        Self { dry_run: false }
    }

    /// Messages print but report `Skipped`, so nothing is committed.
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }
}

impl Default for ConsoleChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageChannel for ConsoleChannel {
    fn name(&self) -> &str {
        "console"
    }

    fn send(&self, address: &str, text: &str) -> Result<SendOutcome> {
        if self.dry_run {
            println!("[DRY-RUN] would send to {address}:\n{text}\n");
            return Ok(SendOutcome::Skipped("dry-run".to_string()));
        }
        println!("-> {address}\n{text}\n");
        Ok(SendOutcome::Sent)
    }
}
