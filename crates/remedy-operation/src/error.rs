//! # Operation Errors
//!
//! Failures that are not business outcomes: constructing an operation for a
//! policy no actor can run, calling `start` twice, a broken inventory
//! collaborator, malformed configuration.
//!
//! A remote failure, a timeout or a failed precondition is never an `Err`;
//! those are [`PolicyResult`](remedy_core::PolicyResult)s or
//! [`PreconditionFailure`](crate::PreconditionFailure)s.

use thiserror::Error;

/// Operation construction or lifecycle misuse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    /// The policy names no recipe.
    #[error("policy {0} has no recipe")]
    MissingRecipe(String),

    /// The policy names no target.
    #[error("policy {0} has no target")]
    MissingTarget(String),

    /// The actor does not implement the recipe for this target.
    #[error("actor {actor} does not support recipe {recipe}")]
    UnsupportedRecipe {
        /// Actor name.
        actor: String,
        /// Recipe as authored.
        recipe: String,
    },

    /// The triggering event carries no request id.
    #[error("triggering event has no request id")]
    MissingRequestId,

    /// `start` was called on an operation that already left `CREATED`.
    #[error("operation already started (state {0})")]
    AlreadyStarted(&'static str),

    /// The request could not be built from the event and policy.
    #[error("{0}")]
    Request(String),
}

/// The inventory collaborator failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// Inventory has no record of the VNF.
    #[error("unknown VNF {0}")]
    UnknownVnf(String),

    /// The VNF exists but has no VM instances.
    #[error("VNF {0} has no VM instances")]
    EmptyVnf(String),

    /// The lookup itself failed.
    #[error("inventory unavailable: {0}")]
    Unavailable(String),
}

/// Malformed configuration value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held a value that does not parse.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable name.
        var: String,
        /// Raw value.
        value: String,
    },
}
