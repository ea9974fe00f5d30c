//! Failure taxonomy for the notification path
//!
//! Every failure is contained at the handler boundary; none of these
//! abort the process. `AlreadyProcessed` is an expected admission
//! outcome, not an error, and lives with the gate instead.

use std::time::Duration;
use thiserror::Error;

/// Why a dispatch attempt failed.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The customer phone cannot be resolved into a channel address.
    /// Permanent: retrying the same record will not help.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The message channel reported an error. Transient; the natural
    /// redelivery of the change feed retries it.
    #[error("transport error: {0}")]
    Transport(String),

    /// The send did not resolve within the configured bound.
    #[error("send timed out after {0:?}")]
    Timeout(Duration),
}

/// The cursor store could not persist a commit. The commit is aborted
/// and the event stays eligible for reprocessing.
#[derive(Debug, Clone, Error)]
#[error("cursor persistence failed: {0}")]
pub struct PersistenceFailure(pub String);
