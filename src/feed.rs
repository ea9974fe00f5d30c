//! Change feed plumbing - events arrive over an mpsc channel
//!
//! The realtime database client is an external collaborator; whatever it
//! is, it pushes `ChangeEvent`s into an mpsc sender. The JSONL replayer
//! here is the concrete producer this binary ships with: one event per
//! line, useful both for piping an exported feed through the pipeline
//! and for reproducing at-least-once redelivery (just repeat lines).

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::order::{ChangeEvent, ChangeKind, OrderRecord};

/// Receiving half of a change feed.
pub type FeedReceiver = mpsc::Receiver<ChangeEvent>;

#[derive(Deserialize)]
struct RawEvent {
    kind: ChangeKind,
    key: String,
    record: Value,
}

/// Parse one feed line; malformed lines are dropped with a log line.
pub fn parse_line(line: &str) -> Option<ChangeEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let raw: RawEvent = match serde_json::from_str(trimmed) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "dropping malformed feed line");
            return None;
        }
    };

    let record = OrderRecord::from_value(raw.record)?;
    Some(ChangeEvent {
        kind: raw.kind,
        key: raw.key,
        record,
    })
}

/// Replays a JSONL file of change events into a feed channel.
pub struct JsonlFeed {
    path: PathBuf,
}

impl JsonlFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Spawn the reader task and hand back the receiving end. The
    /// channel closes when the file is exhausted.
    pub async fn spawn(self) -> Result<FeedReceiver> {
        let file = File::open(&self.path)
            .await
            .with_context(|| format!("opening feed file {}", self.path.display()))?;
        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            let mut lines = BufReader::new(file).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if let Some(event) = parse_line(&line) {
                            debug!(key = %event.key, kind = ?event.kind, "feed event");
                            if tx.send(event).await.is_err() {
                                break;
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        warn!(error = %e, "feed read error, stopping");
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }
}
