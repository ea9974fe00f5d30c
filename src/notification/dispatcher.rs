//! Notification dispatcher - render, address, send, interpret
//!
//! Each intent dispatches independently and immediately; there is no
//! batching or rate limiting here, only the `MessageChannel` seam where
//! either could be added. Nothing in this module is fatal to the
//! process: every failure comes back as a `DispatchOutcome`.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::channel::{MessageChannel, SendOutcome};
use super::formatter;
use super::intent::NotificationIntent;
use crate::error::DispatchError;

/// What happened to one dispatch attempt.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    Delivered,
    /// The channel declined to send (dry-run). No commit.
    Skipped(String),
    Failed(DispatchError),
}

const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// Plain local number: digits only, compiled once.
fn phone_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{6,15}$").expect("valid phone pattern"))
}

pub struct NotificationDispatcher {
    channel: Arc<dyn MessageChannel>,
    country_code: String,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(channel: Arc<dyn MessageChannel>, country_code: impl Into<String>) -> Self {
        Self {
            channel,
            country_code: country_code.into(),
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    /// Resolve a local phone number into the channel addressing scheme,
    /// `<countrycode><localnumber>@c.us`.
    pub fn resolve_address(&self, phone: &str) -> Result<String, DispatchError> {
        let digits = phone.trim();
        if !phone_pattern().is_match(digits) {
            return Err(DispatchError::InvalidAddress(format!(
                "phone {phone:?} is not a plain local number"
            )));
        }
        Ok(format!("{}{}@c.us", self.country_code, digits))
    }

    /// Render and send one intent through the channel, bounded by the
    /// send timeout. A timed-out or failed send leaves the cursor
    /// untouched upstream, so feed redelivery retries it naturally.
    pub async fn dispatch(&self, intent: &NotificationIntent) -> DispatchOutcome {
        let address = match self.resolve_address(&intent.audience_phone) {
            Ok(address) => address,
            Err(e) => {
                warn!(key = %intent.order_key, error = %e, "cannot address notification");
                return DispatchOutcome::Failed(e);
            }
        };

        let Some(text) = formatter::render(intent) else {
            warn!(key = %intent.order_key, kind = %intent.kind_label(), "no template for intent");
            return DispatchOutcome::Failed(DispatchError::Transport(
                "no message template for intent".to_string(),
            ));
        };

        let channel = Arc::clone(&self.channel);
        let send = tokio::task::spawn_blocking(move || channel.send(&address, &text));

        let result = match timeout(self.send_timeout, send).await {
            Err(_) => return DispatchOutcome::Failed(DispatchError::Timeout(self.send_timeout)),
            Ok(Err(join_err)) => {
                return DispatchOutcome::Failed(DispatchError::Transport(join_err.to_string()))
            }
            Ok(Ok(result)) => result,
        };

        match result {
            Ok(SendOutcome::Sent) => {
                debug!(key = %intent.order_key, channel = self.channel.name(), ts = intent.record_timestamp, "delivered");
                DispatchOutcome::Delivered
            }
            Ok(SendOutcome::Skipped(reason)) => DispatchOutcome::Skipped(reason),
            Ok(SendOutcome::Failed(cause)) => {
                warn!(key = %intent.order_key, channel = self.channel.name(), cause = %cause, "send failed");
                DispatchOutcome::Failed(DispatchError::Transport(cause))
            }
            Err(e) => {
                warn!(key = %intent.order_key, channel = self.channel.name(), error = %e, "channel error");
                DispatchOutcome::Failed(DispatchError::Transport(e.to_string()))
            }
        }
    }
}
