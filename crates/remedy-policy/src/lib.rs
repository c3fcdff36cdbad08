//! # remedy-policy: Policy Graph Builder & Validator
//!
//! Assembles operational policies into a directed, outcome-labeled graph
//! and validates its structural and timing consistency.
//!
//! ## Architecture
//!
//! - **Document** (`policy.rs`): `Policy`, `ControlLoop` and the
//!   `ControlLoopPolicy` document that holds both. Plain serde types.
//!
//! - **Catalog** (`catalog.rs`): which recipes each actor accepts, per
//!   target type. Pluggable through the `ActorCatalog` trait.
//!
//! - **Builder** (`builder.rs`): the mutation API. Every mutation keeps
//!   the graph closed: an outcome edge references an existing policy or a
//!   `FinalResult` sentinel, never a removed policy.
//!
//! - **Validation** (`validate.rs`): per-policy field checks,
//!   reachability, timeout budget and open-loop consistency, accumulated
//!   into one `Results` report.
//!
//! - **Graph** (`graph.rs`): the immutable, thread-shareable graph the
//!   orchestrator walks once validation has passed.
//!
//! ## Crate Policy
//!
//! - Depends only on `remedy-core` internally.
//! - Validation findings are values (`Message`s); only programmer errors
//!   such as an unknown policy id are `Err`.

pub mod builder;
pub mod catalog;
pub mod error;
pub mod graph;
pub mod policy;
pub mod validate;

pub use builder::ControlLoopPolicyBuilder;
pub use catalog::{ActorCatalog, StandardActorCatalog};
pub use error::{BuilderError, GraphError};
pub use graph::ControlLoopGraph;
pub use policy::{
    ControlLoop, ControlLoopPolicy, NewPolicy, OperationsAccumulateParams, Pnf, Policy, Resource,
    Service,
};
pub use validate::{calculate_timeout, validate, Message, MessageLevel, Results};
