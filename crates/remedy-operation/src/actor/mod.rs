//! # Remote Actors
//!
//! An [`Actor`] knows one controller family: which recipes it runs, how to
//! build a request for one sub-target, and how to classify the responses.
//! The operation state machine is actor-agnostic.

pub mod appc_lcm;

pub use appc_lcm::AppcLcmActor;

use remedy_core::{ControlLoopEvent, RequestId, TargetType};
use remedy_policy::Policy;

use crate::classify::ResponseClassifier;
use crate::config::OperationConfig;
use crate::error::OperationError;
use crate::message::{OutboundRequest, SubTarget};

/// Everything an actor needs to build one request.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Control-loop instance.
    pub request_id: RequestId,
    /// Attempt number, starting at 1.
    pub attempt: u32,
    /// Policy being executed.
    pub policy: &'a Policy,
    /// Triggering onset event.
    pub event: &'a ControlLoopEvent,
    /// Attribute keys and header defaults.
    pub config: &'a OperationConfig,
}

/// One remote controller family.
pub trait Actor: Send + Sync {
    /// Actor name as authored in policies, e.g. `APPC-LCM`.
    fn name(&self) -> &str;

    /// Recipes this actor runs, in canonical casing.
    fn recipes(&self) -> Vec<String>;

    /// Whether the actor runs `recipe` against `target`.
    fn supports(&self, recipe: &str, target: Option<TargetType>) -> bool;

    /// Classifier for responses to `recipe`.
    fn classifier(&self, recipe: &str) -> &dyn ResponseClassifier;

    /// Build the request addressed to one sub-target.
    fn build_request(
        &self,
        ctx: &RequestContext<'_>,
        sub_target: &SubTarget,
    ) -> Result<OutboundRequest, OperationError>;
}
