//! # remedy-engine: Control-Loop Orchestration
//!
//! Drives control loops end to end: an onset starts a transaction that
//! walks a validated [`ControlLoopGraph`](remedy_policy::ControlLoopGraph),
//! executes one [`Operation`](remedy_operation::Operation) at a time and
//! ends in a [`FinalResult`](remedy_core::FinalResult).
//!
//! ## Architecture
//!
//! - **Transaction** (`transaction.rs`): one control-loop instance. Routes
//!   operation results along outcome edges, handles retries and timeouts,
//!   keeps the operation history. Pure state; every transition returns a
//!   `Step` describing its effects.
//!
//! - **Manager** (`manager.rs`): installed graphs by name and live
//!   transactions by request id behind `parking_lot` locks.
//!
//! - **Registry** (`registry.rs`): actor name → executable actor. Also
//!   the recipe catalog used to validate loops before installation.
//!
//! - **Notifications** (`notification.rs`): `OPERATION`, `OPERATION_SUCCESS`,
//!   `OPERATION_FAILURE` and the three `FINAL_*` kinds.
//!
//! - **Timers** (`timer.rs`): tokio tasks that call back into the manager.
//!
//! ## Crate Policy
//!
//! - No transport. Requests leave and responses arrive through the
//!   caller.
//! - The manager never holds a lock across an `.await`.

pub mod config;
pub mod error;
pub mod manager;
pub mod notification;
pub mod registry;
pub mod timer;
pub mod transaction;

pub use config::EngineConfig;
pub use error::{EngineError, OnsetRejection};
pub use manager::ControlLoopManager;
pub use notification::{Notification, NotificationKind};
pub use registry::ActorRegistry;
pub use timer::{arm_control_loop_timeout, arm_operation_timeout, arm_step_timers};
pub use transaction::{
    validate_onset, ControlLoopTransaction, OperationTimer, Step, TransactionContext,
};
