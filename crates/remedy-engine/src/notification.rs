//! # Control-Loop Notifications
//!
//! What the engine tells the outside world: an operation started, an
//! operation finished, the loop ended. Each notification carries a
//! plain-text message and the relevant slice of operation history.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use remedy_core::{FinalResult, PolicyId, PolicyResult, RequestId};
use remedy_operation::OperationRecord;

/// Notification type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// A request was sent.
    Operation,
    /// An operation resolved `SUCCESS`.
    OperationSuccess,
    /// An operation resolved anything else.
    OperationFailure,
    /// The loop ended in `FINAL_SUCCESS`.
    FinalSuccess,
    /// The loop ended in any failure sentinel.
    FinalFailure,
    /// The loop has no policies.
    FinalOpenloop,
}

impl NotificationKind {
    /// Upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operation => "OPERATION",
            Self::OperationSuccess => "OPERATION_SUCCESS",
            Self::OperationFailure => "OPERATION_FAILURE",
            Self::FinalSuccess => "FINAL_SUCCESS",
            Self::FinalFailure => "FINAL_FAILURE",
            Self::FinalOpenloop => "FINAL_OPENLOOP",
        }
    }

    /// Kind reported when an operation resolves with `result`.
    pub fn for_result(result: PolicyResult) -> Self {
        match result {
            PolicyResult::Success => Self::OperationSuccess,
            _ => Self::OperationFailure,
        }
    }

    /// Kind reported when the loop ends in `result`.
    pub fn for_final(result: FinalResult) -> Self {
        match result {
            FinalResult::FinalSuccess => Self::FinalSuccess,
            FinalResult::FinalOpenloop => Self::FinalOpenloop,
            _ => Self::FinalFailure,
        }
    }

    /// Whether this kind ends the loop.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::FinalSuccess | Self::FinalFailure | Self::FinalOpenloop
        )
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Type.
    pub kind: NotificationKind,
    /// Control-loop instance.
    pub request_id: RequestId,
    /// Control-loop name.
    pub closed_loop_control_name: String,
    /// Policy the notification is about, for operation notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<PolicyId>,
    /// Plain-text message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Operation history.
    #[serde(default)]
    pub history: Vec<OperationRecord>,
    /// Emission time.
    pub timestamp: DateTime<Utc>,
}

/// One-line rendering of a history entry, used as the message of
/// operation notifications.
pub fn summarize(record: &OperationRecord) -> String {
    format!(
        "actor={},operation={},target={},subRequestId={}",
        record.actor, record.operation, record.target, record.sub_request_id
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_kinds_collapse_failures() {
        assert_eq!(
            NotificationKind::for_final(FinalResult::FinalFailureGuard),
            NotificationKind::FinalFailure
        );
        assert_eq!(
            NotificationKind::for_final(FinalResult::FinalOpenloop),
            NotificationKind::FinalOpenloop
        );
        assert!(NotificationKind::FinalSuccess.is_final());
        assert!(!NotificationKind::OperationFailure.is_final());
    }

    #[test]
    fn serializes_upper_case() {
        let json = serde_json::to_string(&NotificationKind::OperationSuccess).unwrap();
        assert_eq!(json, "\"OPERATION_SUCCESS\"");
    }

    #[test]
    fn summary_line() {
        let rec = OperationRecord {
            actor: "APPC-LCM".into(),
            operation: "Restart".into(),
            target: "vm-1".into(),
            sub_request_id: "2".into(),
            start: Utc::now(),
            end: None,
            outcome: None,
            message: None,
        };
        assert_eq!(
            summarize(&rec),
            "actor=APPC-LCM,operation=Restart,target=vm-1,subRequestId=2"
        );
    }
}
