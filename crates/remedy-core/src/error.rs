//! # Error Types
//!
//! Parse errors for the core vocabulary. Business outcomes (a failed
//! remediation, a validation warning) are values elsewhere in the
//! workspace, never errors.

use thiserror::Error;

/// Top-level error type for the core vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemedyError {
    /// The name is not one of the six `PolicyResult` values.
    #[error("unknown policy result: {0}")]
    UnknownPolicyResult(String),

    /// The name is not one of the six `FinalResult` sentinels.
    #[error("unknown final result: {0}")]
    UnknownFinalResult(String),

    /// The name is not one of VM, VNF or PNF.
    #[error("unknown target type: {0}")]
    UnknownTargetType(String),

    /// The request id is not a UUID.
    #[error("invalid request id {value:?}: {reason}")]
    InvalidRequestId {
        /// The rejected input.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },
}
