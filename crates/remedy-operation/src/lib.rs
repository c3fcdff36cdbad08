//! # remedy-operation: Operation Result Aggregation
//!
//! Executes one policy's remote action against one triggering event and
//! resolves exactly one outcome.
//!
//! ## Architecture
//!
//! - **Operation** (`operation.rs`): the `CREATED → AWAITING_VALIDATION →
//!   SENT → RESOLVED` state machine with a write-once, mutex-guarded result.
//!
//! - **Classification** (`classify.rs`): per-actor reduction of a response
//!   status to a `ResponseClass`.
//!
//! - **Tally** (`tally.rs`): latest class per sub-target and the pure
//!   resolution function over a snapshot.
//!
//! - **Preconditions** (`preconditions.rs`): inventory-map checks run
//!   before send, with the exact notification texts.
//!
//! - **Actors** (`actor/`): the `Actor` trait and the APPC-LCM actor.
//!
//! - **Inventory** (`inventory.rs`): the VNF membership collaborator.
//!
//! ## Crate Policy
//!
//! - The operation owns no timers. Timeout is a synchronous call made by
//!   whoever owns the clock.
//! - Remote failures, timeouts and aborts are values, never `Err`.

pub mod actor;
pub mod classify;
pub mod config;
pub mod error;
pub mod inventory;
pub mod message;
pub mod operation;
pub mod preconditions;
pub mod tally;

pub use actor::{Actor, AppcLcmActor, RequestContext};
pub use classify::{
    AppcLcmClassifier, AppcLcmHealthCheckClassifier, AppcLcmResponseCode, Classification,
    ResponseClass, ResponseClassifier,
};
pub use config::OperationConfig;
pub use error::{ConfigError, InventoryError, OperationError};
pub use inventory::{InventoryResolver, StaticInventory};
pub use message::{ActorResponse, GuardDecision, IncomingMessage, OutboundRequest, SubTarget};
pub use operation::{
    Dispatch, Operation, OperationOutcome, OperationRecord, OperationSpec, OperationState,
};
pub use preconditions::PreconditionFailure;
pub use tally::{resolve, Tally};
