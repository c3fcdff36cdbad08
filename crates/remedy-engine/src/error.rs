//! # Engine Errors
//!
//! Routing failures at the manager boundary. A remediation that ends in
//! `FINAL_FAILURE` is a notification, not an error.

use thiserror::Error;

use remedy_core::RequestId;

/// An onset the engine refuses to start a transaction for. The `Display`
/// text is the notification message.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnsetRejection {
    /// The event carries no request id.
    #[error("No requestID")]
    NoRequestId,
    /// The event carries no target type.
    #[error("No targetType")]
    NoTargetType,
    /// The event's target attribute name is missing or empty.
    #[error("No target field")]
    NoTarget,
}

/// Manager-level failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The onset is malformed.
    #[error("rejected onset: {0}")]
    Rejected(#[from] OnsetRejection),

    /// No control loop with this name is installed.
    #[error("no control loop named {0}")]
    UnknownControlLoop(String),

    /// A transaction for this request id is already live.
    #[error("duplicate onset for request {0}")]
    DuplicateOnset(RequestId),

    /// No live transaction for this request id.
    #[error("no transaction for request {0}")]
    UnknownRequest(RequestId),

    /// The live-transaction limit is reached.
    #[error("transaction limit of {0} reached")]
    TooManyTransactions(usize),
}
