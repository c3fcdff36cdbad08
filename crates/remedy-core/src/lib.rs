//! # remedy-core: Foundational Types for Closed-Loop Remediation
//!
//! Every other crate in the workspace depends on `remedy-core`; it depends
//! on nothing internal.
//!
//! ## Contents
//!
//! - **Outcome taxonomy** (`outcome.rs`): the per-attempt [`PolicyResult`],
//!   the per-graph terminal [`FinalResult`] sentinels, the four routable
//!   [`OutcomeEdge`]s and the tagged [`EdgeTarget`] an edge points at.
//!
//! - **Targets** (`target.rs`): the VM / VNF / PNF remediation scope.
//!
//! - **Identity** (`identity.rs`): `PolicyId` and `RequestId` newtypes.
//!
//! - **Events** (`event.rs`): the onset / abatement event that starts and
//!   may short-circuit a control loop.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `remedy-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Edge targets are never compared as strings: a policy id and a sentinel
//!   are distinct variants of [`EdgeTarget`].

pub mod error;
pub mod event;
pub mod identity;
pub mod outcome;
pub mod target;

// Re-export primary types for ergonomic imports.
pub use error::RemedyError;
pub use event::{ControlLoopEvent, EventStatus};
pub use identity::{PolicyId, RequestId};
pub use outcome::{EdgeTarget, FinalResult, OutcomeEdge, PolicyResult};
pub use target::{Target, TargetType};
