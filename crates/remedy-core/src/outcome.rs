//! # Outcome Taxonomy
//!
//! The fixed vocabulary shared by the policy graph and the operation
//! state machine.
//!
//! - [`PolicyResult`]: outcome of one operation attempt.
//! - [`FinalResult`]: terminal sentinel that ends a control loop.
//! - [`OutcomeEdge`]: the four routable outcome edges of a policy.
//! - [`EdgeTarget`]: what an edge points at: another policy or a sentinel.
//!
//! ## Routing
//!
//! ```text
//! SUCCESS            ──▶ (no edge; the loop ends in FINAL_SUCCESS)
//! FAILURE            ──▶ failure          (default FINAL_FAILURE)
//! FAILURE_EXCEPTION  ──▶ failure          (no dedicated edge)
//! FAILURE_RETRIES    ──▶ failure_retries  (default FINAL_FAILURE_RETRIES)
//! FAILURE_TIMEOUT    ──▶ failure_timeout  (default FINAL_FAILURE_TIMEOUT)
//! FAILURE_GUARD      ──▶ failure_guard    (default FINAL_FAILURE_GUARD)
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RemedyError;
use crate::identity::PolicyId;

// ─── PolicyResult ────────────────────────────────────────────────────

/// Outcome of one operation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PolicyResult {
    /// The remote action completed favorably.
    Success,
    /// The remote actor reported an authoritative failure.
    Failure,
    /// The retry budget of the policy is exhausted.
    FailureRetries,
    /// The operation did not resolve within its timeout budget.
    FailureTimeout,
    /// Operation-internal failure or an ambiguous aggregate outcome.
    /// Never chosen by a remote actor explicitly.
    FailureException,
    /// The guard denied the action.
    FailureGuard,
}

impl PolicyResult {
    /// All six results in declaration order.
    pub const ALL: [PolicyResult; 6] = [
        Self::Success,
        Self::Failure,
        Self::FailureRetries,
        Self::FailureTimeout,
        Self::FailureException,
        Self::FailureGuard,
    ];

    /// Canonical upper-case name (e.g. `"FAILURE_TIMEOUT"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::FailureRetries => "FAILURE_RETRIES",
            Self::FailureTimeout => "FAILURE_TIMEOUT",
            Self::FailureException => "FAILURE_EXCEPTION",
            Self::FailureGuard => "FAILURE_GUARD",
        }
    }

    /// The outcome edge consulted when an attempt ends with this result.
    ///
    /// `None` for `Success`: success has no edge.
    pub fn edge(&self) -> Option<OutcomeEdge> {
        match self {
            Self::Success => None,
            Self::Failure | Self::FailureException => Some(OutcomeEdge::Failure),
            Self::FailureRetries => Some(OutcomeEdge::FailureRetries),
            Self::FailureTimeout => Some(OutcomeEdge::FailureTimeout),
            Self::FailureGuard => Some(OutcomeEdge::FailureGuard),
        }
    }
}

impl fmt::Display for PolicyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyResult {
    type Err = RemedyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RemedyError::UnknownPolicyResult(s.to_string()))
    }
}

// ─── FinalResult ─────────────────────────────────────────────────────

/// Terminal sentinel that ends a control loop. Sentinels are not policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalResult {
    /// The chain ended successfully.
    FinalSuccess,
    /// The chain ended on an explicit failure.
    FinalFailure,
    /// The chain ended after exhausting retries.
    FinalFailureRetries,
    /// The chain ended on a timeout.
    FinalFailureTimeout,
    /// The chain ended on a guard denial.
    FinalFailureGuard,
    /// No policies configured; the loop only observes.
    FinalOpenloop,
}

impl FinalResult {
    /// All six sentinels in declaration order.
    pub const ALL: [FinalResult; 6] = [
        Self::FinalSuccess,
        Self::FinalFailure,
        Self::FinalFailureRetries,
        Self::FinalFailureTimeout,
        Self::FinalFailureGuard,
        Self::FinalOpenloop,
    ];

    /// Canonical upper-case name (e.g. `"FINAL_OPENLOOP"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FinalSuccess => "FINAL_SUCCESS",
            Self::FinalFailure => "FINAL_FAILURE",
            Self::FinalFailureRetries => "FINAL_FAILURE_RETRIES",
            Self::FinalFailureTimeout => "FINAL_FAILURE_TIMEOUT",
            Self::FinalFailureGuard => "FINAL_FAILURE_GUARD",
            Self::FinalOpenloop => "FINAL_OPENLOOP",
        }
    }

    /// Look up a sentinel by its canonical name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(name))
    }

    /// Whether this sentinel reports a failed control loop.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::FinalSuccess | Self::FinalOpenloop)
    }
}

impl fmt::Display for FinalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FinalResult {
    type Err = RemedyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| RemedyError::UnknownFinalResult(s.to_string()))
    }
}

// ─── OutcomeEdge ─────────────────────────────────────────────────────

/// One of the four routable outcome edges carried by every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeEdge {
    /// Followed on `FAILURE` and `FAILURE_EXCEPTION`.
    Failure,
    /// Followed on `FAILURE_RETRIES`.
    FailureRetries,
    /// Followed on `FAILURE_TIMEOUT`.
    FailureTimeout,
    /// Followed on `FAILURE_GUARD`.
    FailureGuard,
}

impl OutcomeEdge {
    /// All four edges in traversal order.
    pub const ALL: [OutcomeEdge; 4] = [
        Self::Failure,
        Self::FailureRetries,
        Self::FailureTimeout,
        Self::FailureGuard,
    ];

    /// The sentinel this edge holds when it routes nowhere.
    pub fn sentinel(&self) -> FinalResult {
        match self {
            Self::Failure => FinalResult::FinalFailure,
            Self::FailureRetries => FinalResult::FinalFailureRetries,
            Self::FailureTimeout => FinalResult::FinalFailureTimeout,
            Self::FailureGuard => FinalResult::FinalFailureGuard,
        }
    }

    /// Field name as it appears in a policy document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Failure => "failure",
            Self::FailureRetries => "failure_retries",
            Self::FailureTimeout => "failure_timeout",
            Self::FailureGuard => "failure_guard",
        }
    }
}

impl fmt::Display for OutcomeEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── EdgeTarget ──────────────────────────────────────────────────────

/// What an outcome edge (or a control loop's trigger) points at.
///
/// Serialized as a bare string: the sentinel name when terminal, the policy
/// id otherwise. A policy id that happens to spell a sentinel name is
/// therefore not representable in a document; generated ids are UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EdgeTarget {
    /// Continue with another policy of the same graph.
    Policy(PolicyId),
    /// End the control loop.
    Terminal(FinalResult),
}

impl EdgeTarget {
    /// The policy id, if this target is a policy.
    pub fn policy_id(&self) -> Option<&PolicyId> {
        match self {
            Self::Policy(id) => Some(id),
            Self::Terminal(_) => None,
        }
    }

    /// The sentinel, if this target is terminal.
    pub fn final_result(&self) -> Option<FinalResult> {
        match self {
            Self::Policy(_) => None,
            Self::Terminal(r) => Some(*r),
        }
    }

    /// Whether this target references the given policy.
    pub fn references(&self, id: &PolicyId) -> bool {
        self.policy_id() == Some(id)
    }
}

impl From<FinalResult> for EdgeTarget {
    fn from(r: FinalResult) -> Self {
        Self::Terminal(r)
    }
}

impl From<PolicyId> for EdgeTarget {
    fn from(id: PolicyId) -> Self {
        Self::Policy(id)
    }
}

impl From<String> for EdgeTarget {
    fn from(s: String) -> Self {
        match FinalResult::from_name(&s) {
            Some(r) => Self::Terminal(r),
            None => Self::Policy(PolicyId::new(s)),
        }
    }
}

impl From<EdgeTarget> for String {
    fn from(t: EdgeTarget) -> Self {
        t.to_string()
    }
}

impl fmt::Display for EdgeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Policy(id) => f.write_str(id.as_str()),
            Self::Terminal(r) => f.write_str(r.as_str()),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_has_no_edge() {
        assert_eq!(PolicyResult::Success.edge(), None);
    }

    #[test]
    fn exception_routes_through_failure_edge() {
        assert_eq!(PolicyResult::FailureException.edge(), Some(OutcomeEdge::Failure));
        assert_eq!(PolicyResult::Failure.edge(), Some(OutcomeEdge::Failure));
    }

    #[test]
    fn each_edge_has_matching_sentinel() {
        assert_eq!(OutcomeEdge::Failure.sentinel(), FinalResult::FinalFailure);
        assert_eq!(OutcomeEdge::FailureRetries.sentinel(), FinalResult::FinalFailureRetries);
        assert_eq!(OutcomeEdge::FailureTimeout.sentinel(), FinalResult::FinalFailureTimeout);
        assert_eq!(OutcomeEdge::FailureGuard.sentinel(), FinalResult::FinalFailureGuard);
    }

    #[test]
    fn final_result_names() {
        assert_eq!(FinalResult::FinalOpenloop.as_str(), "FINAL_OPENLOOP");
        assert_eq!(FinalResult::from_name("final_failure_guard"), Some(FinalResult::FinalFailureGuard));
        assert_eq!(FinalResult::from_name("FINAL_FAILURE_EXCEPTION"), None);
    }

    #[test]
    fn final_result_failure_classification() {
        assert!(!FinalResult::FinalSuccess.is_failure());
        assert!(!FinalResult::FinalOpenloop.is_failure());
        assert!(FinalResult::FinalFailureTimeout.is_failure());
    }

    #[test]
    fn final_result_serde_matches_name() {
        for r in FinalResult::ALL {
            let json = serde_json::to_string(&r).unwrap();
            assert_eq!(json, format!("\"{}\"", r.as_str()));
        }
    }

    #[test]
    fn policy_result_parse() {
        assert_eq!("failure_timeout".parse::<PolicyResult>().unwrap(), PolicyResult::FailureTimeout);
        assert!("SOMETIMES".parse::<PolicyResult>().is_err());
    }

    #[test]
    fn edge_target_from_sentinel_string() {
        let t = EdgeTarget::from("FINAL_FAILURE_RETRIES".to_string());
        assert_eq!(t, EdgeTarget::Terminal(FinalResult::FinalFailureRetries));
    }

    #[test]
    fn edge_target_from_policy_string() {
        let t = EdgeTarget::from("6f1b0e5c-policy".to_string());
        assert_eq!(t.policy_id().map(|p| p.as_str()), Some("6f1b0e5c-policy"));
        assert!(t.final_result().is_none());
    }

    #[test]
    fn edge_target_serializes_as_bare_string() {
        let t = EdgeTarget::Terminal(FinalResult::FinalFailure);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"FINAL_FAILURE\"");
        let p = EdgeTarget::Policy(PolicyId::new("abc"));
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"abc\"");
        let back: EdgeTarget = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn references_only_matching_policy() {
        let id = PolicyId::new("p1");
        assert!(EdgeTarget::Policy(id.clone()).references(&id));
        assert!(!EdgeTarget::Policy(PolicyId::new("p2")).references(&id));
        assert!(!EdgeTarget::Terminal(FinalResult::FinalFailure).references(&id));
    }
}
