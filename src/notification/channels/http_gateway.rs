//! HTTP gateway channel - POSTs messages to a WhatsApp gateway service
//!
//! The gateway owns the actual WhatsApp session (pairing, QR codes, the
//! browser automation); this channel only speaks its small HTTP API:
//! `POST {url}` with `{"to": address, "message": text}`.

use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use tracing::debug;

use crate::notification::channel::{MessageChannel, SendOutcome};

#[derive(Debug, Clone)]
pub struct HttpGatewayConfig {
    /// Full URL of the gateway send endpoint.
    pub url: String,
    /// Optional bearer token.
    pub token: Option<String>,
    /// Per-request timeout at the HTTP client level. The dispatcher
    /// applies its own outer timeout as well.
    pub request_timeout: Duration,
}

pub struct HttpGatewayChannel {
    config: HttpGatewayConfig,
    client: reqwest::blocking::Client,
}

impl HttpGatewayChannel {
    pub fn new(config: HttpGatewayConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { config, client })
    }
}

impl MessageChannel for HttpGatewayChannel {
    fn name(&self) -> &str {
        "http-gateway"
    }

    fn send(&self, address: &str, text: &str) -> Result<SendOutcome> {
        let body = json!({ "to": address, "message": text });

        let mut request = self.client.post(&self.config.url).json(&body);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = match request.send() {
            Ok(response) => response,
            Err(e) => return Ok(SendOutcome::Failed(e.to_string())),
        };

        let status = response.status();
        if status.is_success() {
            debug!(address = %address, "gateway accepted message");
            Ok(SendOutcome::Sent)
        } else {
            let detail = response.text().unwrap_or_default();
            Ok(SendOutcome::Failed(format!(
                "gateway returned {status}: {detail}"
            )))
        }
    }
}
