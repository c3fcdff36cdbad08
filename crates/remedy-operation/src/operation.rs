//! # Operation: Result Aggregation State Machine
//!
//! One execution attempt of a policy's remote action for one triggering
//! event. Resolves exactly one outcome, tolerating any number of
//! asynchronous partial responses.
//!
//! ## States
//!
//! ```text
//! CREATED ──start()──▶ AWAITING_VALIDATION ──▶ SENT ──▶ RESOLVED
//!    │                        │                           ▲
//!    │                        └── precondition failure ───┤
//!    └── guard deny / abatement / timeout ────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Every method takes `&self`. The transport's delivery threads call
//! [`Operation::incoming_message`] while a timer calls
//! [`Operation::timeout`]; one `parking_lot::Mutex` serializes the tally
//! update, the resolution check and the write of the result, so exactly one
//! caller resolves the operation. Later writes are ignored.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use remedy_core::{ControlLoopEvent, PolicyId, PolicyResult, RequestId, TargetType};
use remedy_policy::Policy;

use crate::actor::{Actor, RequestContext};
use crate::classify::ResponseClass;
use crate::config::OperationConfig;
use crate::error::OperationError;
use crate::inventory::InventoryResolver;
use crate::message::{ActorResponse, GuardDecision, IncomingMessage, OutboundRequest, SubTarget};
use crate::preconditions::{self, PreconditionFailure};
use crate::tally::{self, Tally};

pub(crate) const GUARD_DENIED: &str = "Denied by Guard";
pub(crate) const TIMED_OUT: &str = "Operation timed out";

// ─── State ───────────────────────────────────────────────────────────

/// Lifecycle state of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationState {
    /// Built; no request sent.
    Created,
    /// Checking preconditions.
    AwaitingValidation,
    /// Requests emitted; the tally is pending.
    Sent,
    /// Terminal.
    Resolved,
}

impl OperationState {
    /// Upper-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::AwaitingValidation => "AWAITING_VALIDATION",
            Self::Sent => "SENT",
            Self::Resolved => "RESOLVED",
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a resolved operation ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OperationOutcome {
    /// A result was reached.
    Completed(PolicyResult),
    /// A precondition failed before send; carries the notification text.
    Aborted(String),
}

impl OperationOutcome {
    /// The result the orchestrator routes on. An abort counts as
    /// `FAILURE_EXCEPTION`.
    pub fn policy_result(&self) -> PolicyResult {
        match self {
            Self::Completed(r) => *r,
            Self::Aborted(_) => PolicyResult::FailureException,
        }
    }
}

/// What `start` produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Hand these requests to the transport.
    Send(Vec<OutboundRequest>),
    /// A precondition failed; nothing is sent.
    Aborted(PreconditionFailure),
    /// The operation resolved before any request went out.
    Resolved(OperationOutcome),
}

/// Summary of a finished attempt, appended to the control-loop history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
    /// Actor name.
    pub actor: String,
    /// Recipe.
    pub operation: String,
    /// Target value from the event, or the target type.
    pub target: String,
    /// Attempt number as sent in the request header.
    pub sub_request_id: String,
    /// When the operation was created.
    pub start: DateTime<Utc>,
    /// When it resolved, if it has.
    pub end: Option<DateTime<Utc>>,
    /// Outcome name, if resolved.
    pub outcome: Option<String>,
    /// Notification text.
    pub message: Option<String>,
}

/// Construction parameters.
#[derive(Debug, Clone)]
pub struct OperationSpec {
    /// Triggering onset event.
    pub event: ControlLoopEvent,
    /// Policy to execute.
    pub policy: Policy,
    /// Attempt number, starting at 1.
    pub attempt: u32,
    /// Position of this operation within its control loop, starting at 1.
    /// Distinct for every operation of one request id, retries included.
    pub sequence: u32,
}

// ─── Operation ───────────────────────────────────────────────────────

#[derive(Debug)]
struct Inner {
    state: OperationState,
    tally: Tally,
    outcome: Option<OperationOutcome>,
    message: Option<String>,
    ended_at: Option<DateTime<Utc>>,
}

impl Inner {
    fn resolve(&mut self, outcome: OperationOutcome, message: Option<String>) {
        self.state = OperationState::Resolved;
        self.outcome = Some(outcome);
        if message.is_some() {
            self.message = message;
        }
        self.ended_at = Some(Utc::now());
    }
}

/// One in-flight remote action.
pub struct Operation {
    request_id: RequestId,
    attempt: u32,
    sequence: u32,
    policy: Policy,
    recipe: String,
    target_type: TargetType,
    event: ControlLoopEvent,
    actor: Arc<dyn Actor>,
    config: OperationConfig,
    sub_targets: Result<Vec<SubTarget>, PreconditionFailure>,
    created_at: DateTime<Utc>,
    inner: Mutex<Inner>,
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("request_id", &self.request_id)
            .field("policy_id", &self.policy.id)
            .field("attempt", &self.attempt)
            .field("sequence", &self.sequence)
            .field("actor", &self.actor.name())
            .field("recipe", &self.recipe)
            .field("inner", &*self.inner.lock())
            .finish()
    }
}

impl Operation {
    /// Build an operation and resolve its sub-targets.
    ///
    /// A VM target has one sub-target addressed by the event's vnf-id and
    /// vserver-id. A VNF target fans out to every VM the inventory reports
    /// for the event's vnf-id; an inventory failure is kept and reported as
    /// a precondition failure by [`Operation::start`].
    pub fn new(
        spec: OperationSpec,
        actor: Arc<dyn Actor>,
        inventory: &dyn InventoryResolver,
        config: OperationConfig,
    ) -> Result<Self, OperationError> {
        let OperationSpec {
            event,
            policy,
            attempt,
            sequence,
        } = spec;
        let request_id = event.request_id.ok_or(OperationError::MissingRequestId)?;
        let recipe = policy
            .recipe
            .clone()
            .ok_or_else(|| OperationError::MissingRecipe(policy.id.to_string()))?;
        let target_type = policy
            .target
            .as_ref()
            .map(|t| t.target_type)
            .ok_or_else(|| OperationError::MissingTarget(policy.id.to_string()))?;
        if !actor.supports(&recipe, Some(target_type)) {
            return Err(OperationError::UnsupportedRecipe {
                actor: actor.name().to_string(),
                recipe,
            });
        }

        let sub_targets =
            resolve_sub_targets(&event, target_type, request_id, sequence, inventory, &config);
        let expected = sub_targets
            .as_ref()
            .map(|s| Tally::expecting(s.iter().map(|t| t.correlation_id.clone())))
            .unwrap_or_default();

        tracing::debug!(
            request_id = %request_id,
            policy_id = %policy.id,
            attempt,
            sequence,
            actor = actor.name(),
            recipe = %recipe,
            sub_targets = expected.len(),
            "operation created"
        );

        Ok(Self {
            request_id,
            attempt,
            sequence,
            policy,
            recipe,
            target_type,
            event,
            actor,
            config,
            sub_targets,
            created_at: Utc::now(),
            inner: Mutex::new(Inner {
                state: OperationState::Created,
                tally: expected,
                outcome: None,
                message: None,
                ended_at: None,
            }),
        })
    }

    // ─── Accessors ───────────────────────────────────────────────────

    /// Control-loop instance.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Attempt number.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Position within the control loop.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// The policy being executed.
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Id of the policy being executed.
    pub fn policy_id(&self) -> &PolicyId {
        &self.policy.id
    }

    /// Resolved sub-targets; empty when resolution failed.
    pub fn sub_targets(&self) -> &[SubTarget] {
        self.sub_targets.as_deref().unwrap_or(&[])
    }

    /// Current state.
    pub fn state(&self) -> OperationState {
        self.inner.lock().state
    }

    /// The result, once resolved with one. `None` while pending and after
    /// a precondition abort.
    pub fn result(&self) -> Option<PolicyResult> {
        match &self.inner.lock().outcome {
            Some(OperationOutcome::Completed(r)) => Some(*r),
            _ => None,
        }
    }

    /// How the operation ended, once resolved.
    pub fn outcome(&self) -> Option<OperationOutcome> {
        self.inner.lock().outcome.clone()
    }

    /// Notification text associated with the outcome.
    pub fn message(&self) -> Option<String> {
        self.inner.lock().message.clone()
    }

    /// Latest classification per sub-target correlation id.
    pub fn tally(&self) -> Tally {
        self.inner.lock().tally.clone()
    }

    /// History entry for this attempt.
    pub fn record(&self) -> OperationRecord {
        let inner = self.inner.lock();
        OperationRecord {
            actor: self.actor.name().to_string(),
            operation: self.recipe.clone(),
            target: self
                .event
                .target_value()
                .map(str::to_string)
                .unwrap_or_else(|| self.target_type.to_string()),
            sub_request_id: self.attempt.to_string(),
            start: self.created_at,
            end: inner.ended_at,
            outcome: inner.outcome.as_ref().map(|o| match o {
                OperationOutcome::Completed(r) => r.to_string(),
                OperationOutcome::Aborted(_) => PolicyResult::FailureException.to_string(),
            }),
            message: inner.message.clone(),
        }
    }

    // ─── Transitions ─────────────────────────────────────────────────

    /// Validate preconditions and, if they hold, emit the requests.
    ///
    /// Returns `Err` only when called outside `CREATED` and before
    /// resolution. An operation already resolved (guard deny, abatement,
    /// timeout) reports its outcome instead.
    pub fn start(&self) -> Result<Dispatch, OperationError> {
        let mut inner = self.inner.lock();
        match inner.state {
            OperationState::Created => {}
            OperationState::Resolved => {
                let outcome = inner
                    .outcome
                    .clone()
                    .unwrap_or(OperationOutcome::Completed(PolicyResult::FailureException));
                return Ok(Dispatch::Resolved(outcome));
            }
            other => return Err(OperationError::AlreadyStarted(other.name())),
        }
        inner.state = OperationState::AwaitingValidation;

        let checked = preconditions::check(&self.event, &self.config).and_then(|()| {
            self.sub_targets.as_ref().map(|_| ()).map_err(|f| f.clone())
        });
        if let Err(failure) = checked {
            tracing::warn!(
                request_id = %self.request_id,
                policy_id = %self.policy.id,
                reason = %failure,
                "operation aborted before send"
            );
            let text = failure.to_string();
            inner.resolve(OperationOutcome::Aborted(text.clone()), Some(text));
            return Ok(Dispatch::Aborted(failure));
        }

        let ctx = RequestContext {
            request_id: self.request_id,
            attempt: self.attempt,
            policy: &self.policy,
            event: &self.event,
            config: &self.config,
        };
        let built: Result<Vec<_>, _> = self
            .sub_targets()
            .iter()
            .map(|t| self.actor.build_request(&ctx, t))
            .collect();
        match built {
            Ok(requests) => {
                inner.state = OperationState::Sent;
                tracing::debug!(
                    request_id = %self.request_id,
                    policy_id = %self.policy.id,
                    requests = requests.len(),
                    "operation sent"
                );
                Ok(Dispatch::Send(requests))
            }
            Err(e) => {
                tracing::warn!(
                    request_id = %self.request_id,
                    policy_id = %self.policy.id,
                    error = %e,
                    "request construction failed"
                );
                let outcome = OperationOutcome::Completed(PolicyResult::FailureException);
                inner.resolve(outcome.clone(), Some(e.to_string()));
                Ok(Dispatch::Resolved(outcome))
            }
        }
    }

    /// Deliver one message. Returns the result when this call resolved
    /// the operation, `None` otherwise.
    pub fn incoming_message(&self, message: &IncomingMessage) -> Option<PolicyResult> {
        let mut inner = self.inner.lock();
        if inner.state.is_terminal() {
            tracing::debug!(request_id = %self.request_id, "message after resolution ignored");
            return None;
        }
        match message {
            IncomingMessage::Response(response) => self.on_response(&mut inner, response),
            IncomingMessage::Event(event) => self.on_event(&mut inner, event),
            IncomingMessage::Guard(decision) => self.on_guard(&mut inner, *decision),
        }
    }

    fn on_response(&self, inner: &mut Inner, response: &ActorResponse) -> Option<PolicyResult> {
        if inner.state != OperationState::Sent || !inner.tally.expects(&response.correlation_id) {
            tracing::debug!(
                request_id = %self.request_id,
                correlation_id = %response.correlation_id,
                state = %inner.state,
                "response ignored"
            );
            return None;
        }
        let classification = self.actor.classifier(&self.recipe).classify(response);
        inner
            .tally
            .record(&response.correlation_id, classification.class);
        tracing::debug!(
            request_id = %self.request_id,
            correlation_id = %response.correlation_id,
            class = %classification.class,
            "response classified"
        );

        let result = tally::resolve(&inner.tally)?;
        let message = if result == PolicyResult::FailureException && inner.tally.len() > 1 {
            let t = &inner.tally;
            let text = format!(
                "sub-targets disagree: {} success, {} failure, {} exception",
                t.count(ResponseClass::Success),
                t.count(ResponseClass::Failure),
                t.count(ResponseClass::Exception),
            );
            tracing::warn!(request_id = %self.request_id, %text, "ambiguous aggregate outcome");
            Some(text)
        } else {
            classification.detail
        };
        inner.resolve(OperationOutcome::Completed(result), message);
        Some(result)
    }

    fn on_event(&self, inner: &mut Inner, event: &ControlLoopEvent) -> Option<PolicyResult> {
        if !event.is_abated() || event.request_id != Some(self.request_id) {
            return None;
        }
        let text = if inner.state == OperationState::Sent {
            "Abatement received".to_string()
        } else {
            format!("Abatement received before {} request was sent", self.actor.name())
        };
        tracing::debug!(request_id = %self.request_id, "abatement resolved operation");
        inner.resolve(OperationOutcome::Completed(PolicyResult::Success), Some(text));
        Some(PolicyResult::Success)
    }

    fn on_guard(&self, inner: &mut Inner, decision: GuardDecision) -> Option<PolicyResult> {
        if inner.state != OperationState::Created || decision == GuardDecision::Permit {
            return None;
        }
        tracing::warn!(request_id = %self.request_id, policy_id = %self.policy.id, "denied by guard");
        inner.resolve(
            OperationOutcome::Completed(PolicyResult::FailureGuard),
            Some(GUARD_DENIED.to_string()),
        );
        Some(PolicyResult::FailureGuard)
    }

    /// The caller's clock says the budget elapsed. Resolves
    /// `FAILURE_TIMEOUT` unless already resolved.
    pub fn timeout(&self) -> Option<PolicyResult> {
        let mut inner = self.inner.lock();
        if inner.state.is_terminal() {
            return None;
        }
        tracing::debug!(request_id = %self.request_id, state = %inner.state, "operation timed out");
        inner.resolve(
            OperationOutcome::Completed(PolicyResult::FailureTimeout),
            Some(TIMED_OUT.to_string()),
        );
        Some(PolicyResult::FailureTimeout)
    }
}

fn resolve_sub_targets(
    event: &ControlLoopEvent,
    target_type: TargetType,
    request_id: RequestId,
    sequence: u32,
    inventory: &dyn InventoryResolver,
    config: &OperationConfig,
) -> Result<Vec<SubTarget>, PreconditionFailure> {
    let attr = |key: &str| {
        event
            .aai
            .as_ref()
            .and_then(|aai| inventory.attribute(aai, key))
            .map(str::to_string)
    };
    let base = format!("{request_id}-{sequence}");
    let vnf_id = attr(&config.vnf_id_key);

    if target_type != TargetType::Vnf {
        return Ok(vec![SubTarget {
            correlation_id: base,
            vnf_id,
            vserver_id: attr(&config.vserver_id_key),
        }]);
    }

    let Some(vnf_id) = vnf_id else {
        return Err(PreconditionFailure::MissingAttribute(config.vnf_id_key.clone()));
    };
    let members = inventory.vnf_members(&vnf_id)?;
    Ok(members
        .into_iter()
        .enumerate()
        .map(|(i, vserver)| SubTarget {
            correlation_id: format!("{base}-{}", i + 1),
            vnf_id: Some(vnf_id.clone()),
            vserver_id: Some(vserver),
        })
        .collect())
}
