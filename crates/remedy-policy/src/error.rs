//! # Builder and Graph Errors
//!
//! Programmer errors detected at call time. Validation findings (null
//! actor, unreachable policy, budget overrun) are not errors; they are
//! [`Message`](crate::validate::Message)s in a report.

use thiserror::Error;

use remedy_core::{EdgeTarget, OutcomeEdge, PolicyId, PolicyResult};

use crate::validate::Message;

/// A builder call referenced something that does not exist, or passed an
/// argument that can never be valid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuilderError {
    /// No policy with this id exists in the control loop.
    #[error("Unknown policy {0}")]
    UnknownPolicy(PolicyId),

    /// The result has no outcome edge (only `SUCCESS`).
    #[error("no edge for {0}")]
    NoEdgeForResult(PolicyResult),

    /// A service reference without UUID and name.
    #[error("Invalid service - need either a serviceUUID or serviceName")]
    InvalidService,

    /// A resource reference without UUID and name.
    #[error("Invalid resource - need either resourceUUID or resourceName")]
    InvalidResource,

    /// A PNF descriptor without name and type.
    #[error("Invalid PNF - need either pnfName or pnfType")]
    InvalidPnf,

    /// The service to remove is not in the control loop.
    #[error("Unknown service {0}")]
    UnknownService(String),

    /// The resource to remove is not in the control loop.
    #[error("Unknown resource {0}")]
    UnknownResource(String),

    /// Removal requested from an empty service list.
    #[error("No existing services to remove")]
    NoServices,

    /// Removal requested from an empty resource list.
    #[error("No existing resources to remove")]
    NoResources,

    /// A loaded document has an edge pointing at a policy it does not contain.
    #[error("policy {policy} edge {edge} references unknown policy {target}")]
    DanglingEdge {
        /// Policy carrying the edge.
        policy: PolicyId,
        /// The edge.
        edge: OutcomeEdge,
        /// The missing target.
        target: EdgeTarget,
    },

    /// A loaded document's trigger names a policy it does not contain, or
    /// names a sentinel other than `FINAL_OPENLOOP`.
    #[error("trigger_policy {0} is neither a known policy nor FINAL_OPENLOOP")]
    UnknownTrigger(EdgeTarget),

    /// A loaded document contains the same policy id twice.
    #[error("duplicate policy id {0}")]
    DuplicatePolicy(PolicyId),
}

/// The control loop could not be frozen into an executable graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Validation reported at least one ERROR or EXCEPTION.
    #[error("control loop {name} failed validation with {} error(s)", errors.len())]
    Invalid {
        /// Control loop name.
        name: String,
        /// The blocking messages.
        errors: Vec<Message>,
    },
}
