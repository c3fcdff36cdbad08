//! # Control-Loop Transaction
//!
//! One running instance of a control loop, keyed by the onset's request id.
//! Walks the validated graph: creates an operation for the trigger policy,
//! routes each operation result along the policy's outcome edges, retries
//! failed attempts within the policy's budget and ends in a `FinalResult`.
//!
//! ## Routing
//!
//! ```text
//! SUCCESS            → FINAL_SUCCESS
//! FAILURE            → retry while attempt <= retry,
//!                      then `failure` (attempt 1) or `failure_retries`
//! FAILURE_EXCEPTION  → `failure`            (also precondition aborts)
//! FAILURE_RETRIES    → `failure_retries`
//! FAILURE_TIMEOUT    → `failure_timeout`
//! FAILURE_GUARD      → `failure_guard`
//! ```
//!
//! The transaction performs no I/O and owns no clock. Every transition
//! returns a [`Step`]: requests to send, notifications to publish and
//! timers to arm.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use remedy_core::{ControlLoopEvent, EdgeTarget, FinalResult, PolicyId, PolicyResult, RequestId};
use remedy_operation::{
    Dispatch, GuardDecision, IncomingMessage, InventoryResolver, Operation, OperationConfig,
    OperationRecord, OperationSpec, OperationState, OutboundRequest,
};
use remedy_policy::ControlLoopGraph;

use crate::config::EngineConfig;
use crate::error::OnsetRejection;
use crate::notification::{summarize, Notification, NotificationKind};
use crate::registry::ActorRegistry;

pub(crate) const CONTROL_LOOP_TIMED_OUT: &str = "Control Loop timed out";
pub(crate) const OPERATION_TIMED_OUT: &str = "Operation timed out";
pub(crate) const RETRY_LIMIT: &str = "Control Loop reached failure retry limit";

// ─── Context and output ──────────────────────────────────────────────

/// Collaborators shared by every transaction of one engine.
#[derive(Clone)]
pub struct TransactionContext {
    /// Executable actors.
    pub registry: Arc<ActorRegistry>,
    /// VNF membership lookups.
    pub inventory: Arc<dyn InventoryResolver>,
    /// Attribute keys and request defaults.
    pub operation_config: OperationConfig,
    /// Guard and abatement behavior.
    pub engine_config: EngineConfig,
}

impl fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionContext")
            .field("registry", &self.registry)
            .field("operation_config", &self.operation_config)
            .field("engine_config", &self.engine_config)
            .finish_non_exhaustive()
    }
}

/// A timer the caller should arm for the current operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationTimer {
    /// Control-loop instance.
    pub request_id: RequestId,
    /// Policy whose attempt is being timed.
    pub policy_id: PolicyId,
    /// Attempt number.
    pub attempt: u32,
    /// Operation sequence number within the transaction. Only a timer
    /// whose sequence matches the operation in flight fires it.
    pub sequence: u32,
    /// How long to wait.
    pub after: Duration,
}

/// Effects of one transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Step {
    /// Requests to hand to the transport.
    pub requests: Vec<OutboundRequest>,
    /// Notifications to publish, in order.
    pub notifications: Vec<Notification>,
    /// Arm this operation timer.
    pub operation_timer: Option<OperationTimer>,
    /// Arm the overall control-loop timer.
    pub loop_timer: Option<Duration>,
}

impl Step {
    /// Whether the transition had no visible effect.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
            && self.notifications.is_empty()
            && self.operation_timer.is_none()
            && self.loop_timer.is_none()
    }

    /// The loop-ending notification, if this step ended the loop.
    pub fn final_notification(&self) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.kind.is_final())
    }

    /// Notification kinds in emission order.
    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.notifications.iter().map(|n| n.kind).collect()
    }
}

/// Reject an onset that cannot start a transaction.
pub fn validate_onset(event: &ControlLoopEvent) -> Result<RequestId, OnsetRejection> {
    let request_id = event.request_id.ok_or(OnsetRejection::NoRequestId)?;
    if event.target_type.is_none() {
        return Err(OnsetRejection::NoTargetType);
    }
    if event.target.as_deref().map_or(true, str::is_empty) {
        return Err(OnsetRejection::NoTarget);
    }
    Ok(request_id)
}

// ─── Transaction ─────────────────────────────────────────────────────

/// One control-loop instance.
#[derive(Debug)]
pub struct ControlLoopTransaction {
    request_id: RequestId,
    onset: ControlLoopEvent,
    graph: Arc<ControlLoopGraph>,
    ctx: TransactionContext,
    current: Option<Operation>,
    sequence: u32,
    history: Vec<OperationRecord>,
    final_result: Option<FinalResult>,
    message: Option<String>,
}

impl ControlLoopTransaction {
    /// Validate the onset and enter the graph at its trigger.
    pub fn start(
        graph: Arc<ControlLoopGraph>,
        onset: ControlLoopEvent,
        ctx: TransactionContext,
    ) -> Result<(Self, Step), OnsetRejection> {
        let request_id = validate_onset(&onset)?;
        let trigger = graph.trigger().clone();
        let loop_timeout = graph.timeout();
        let mut txn = Self {
            request_id,
            onset,
            graph,
            ctx,
            current: None,
            sequence: 0,
            history: Vec::new(),
            final_result: None,
            message: None,
        };
        tracing::info!(
            request_id = %request_id,
            control_loop = txn.graph.name(),
            "control loop started"
        );

        let mut step = Step::default();
        match trigger {
            EdgeTarget::Policy(id) => {
                if loop_timeout > 0 {
                    step.loop_timer = Some(Duration::from_secs(u64::from(loop_timeout)));
                }
                txn.begin_policy(&id, 1, &mut step);
            }
            EdgeTarget::Terminal(result) => txn.finish(result, &mut step),
        }
        Ok((txn, step))
    }

    // ─── Accessors ───────────────────────────────────────────────────

    /// Control-loop instance.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// The onset that started the loop.
    pub fn onset(&self) -> &ControlLoopEvent {
        &self.onset
    }

    /// The graph being walked.
    pub fn graph(&self) -> &ControlLoopGraph {
        &self.graph
    }

    /// The operation in flight, if any.
    pub fn current_operation(&self) -> Option<&Operation> {
        self.current.as_ref()
    }

    /// Completed attempts, oldest first.
    pub fn history(&self) -> &[OperationRecord] {
        &self.history
    }

    /// How the loop ended, once it has.
    pub fn final_result(&self) -> Option<FinalResult> {
        self.final_result
    }

    /// Whether the loop has ended.
    pub fn is_final(&self) -> bool {
        self.final_result.is_some()
    }

    /// Message carried by the final notification.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    // ─── Transitions ─────────────────────────────────────────────────

    /// Route a message to the operation in flight.
    pub fn incoming_message(&mut self, message: &IncomingMessage) -> Step {
        let mut step = Step::default();
        if self.is_final() {
            tracing::debug!(request_id = %self.request_id, "message after final result ignored");
            return step;
        }
        let Some(state) = self.current.as_ref().map(Operation::state) else {
            return step;
        };
        let EngineConfig {
            guard_enabled,
            abatement_before_send,
            ..
        } = self.ctx.engine_config;
        match message {
            IncomingMessage::Event(e)
                if e.is_abated() && state == OperationState::Created && !abatement_before_send =>
            {
                tracing::debug!(request_id = %self.request_id, "abatement before send ignored");
                return step;
            }
            IncomingMessage::Guard(GuardDecision::Permit)
                if state == OperationState::Created && guard_enabled =>
            {
                self.start_current(&mut step);
                return step;
            }
            _ => {}
        }
        let resolved = self.current.as_ref().and_then(|op| op.incoming_message(message));
        if let Some(result) = resolved {
            self.complete(result, &mut step);
        }
        step
    }

    /// An operation timer fired. Timers armed for any earlier operation,
    /// including an earlier run of the same policy, are ignored.
    pub fn operation_timeout(&mut self, timer: &OperationTimer) -> Step {
        let mut step = Step::default();
        let current = self
            .current
            .as_ref()
            .filter(|op| op.sequence() == timer.sequence);
        let Some(op) = current else {
            tracing::debug!(
                request_id = %self.request_id,
                policy_id = %timer.policy_id,
                attempt = timer.attempt,
                sequence = timer.sequence,
                "stale operation timer"
            );
            return step;
        };
        if let Some(result) = op.timeout() {
            self.complete(result, &mut step);
        }
        step
    }

    /// The overall budget elapsed: end in `FINAL_FAILURE_TIMEOUT`.
    pub fn control_loop_timeout(&mut self) -> Step {
        let mut step = Step::default();
        if self.is_final() {
            return step;
        }
        if let Some(op) = self.current.take() {
            op.timeout();
            self.history.push(op.record());
        }
        self.message = Some(CONTROL_LOOP_TIMED_OUT.to_string());
        self.finish(FinalResult::FinalFailureTimeout, &mut step);
        step
    }

    // ─── Internals ───────────────────────────────────────────────────

    fn begin_policy(&mut self, id: &PolicyId, attempt: u32, step: &mut Step) {
        let Some(policy) = self.graph.policy_for_id(id).cloned() else {
            self.message = Some(format!("Unknown policy {id}"));
            return self.finish(FinalResult::FinalFailure, step);
        };
        let actor_name = policy.actor.clone().unwrap_or_default();
        let Some(actor) = self.ctx.registry.get(&actor_name) else {
            tracing::warn!(request_id = %self.request_id, policy_id = %id, actor = %actor_name, "no such actor");
            self.message = Some(format!("Unknown actor {actor_name}"));
            return self.finish(FinalResult::FinalFailure, step);
        };

        self.sequence += 1;
        let spec = OperationSpec {
            event: self.onset.clone(),
            policy,
            attempt,
            sequence: self.sequence,
        };
        let created = Operation::new(
            spec,
            actor,
            self.ctx.inventory.as_ref(),
            self.ctx.operation_config.clone(),
        );
        match created {
            Ok(op) => self.current = Some(op),
            Err(e) => {
                tracing::warn!(request_id = %self.request_id, policy_id = %id, error = %e, "operation not created");
                self.message = Some(e.to_string());
                return self.finish(FinalResult::FinalFailure, step);
            }
        }

        if self.ctx.engine_config.guard_enabled {
            tracing::debug!(request_id = %self.request_id, policy_id = %id, attempt, "awaiting guard");
            return;
        }
        self.start_current(step);
    }

    fn start_current(&mut self, step: &mut Step) {
        let Some(op) = self.current.as_ref() else {
            return;
        };
        let dispatch = match op.start() {
            Ok(d) => d,
            Err(e) => {
                tracing::debug!(request_id = %self.request_id, error = %e, "start ignored");
                return;
            }
        };
        let result = match dispatch {
            Dispatch::Send(requests) => {
                step.notifications
                    .push(self.operation_notice(op, NotificationKind::Operation));
                step.requests.extend(requests);
                let timeout = op.policy().timeout;
                if timeout > 0 {
                    step.operation_timer = Some(OperationTimer {
                        request_id: self.request_id,
                        policy_id: op.policy_id().clone(),
                        attempt: op.attempt(),
                        sequence: op.sequence(),
                        after: Duration::from_secs(u64::from(timeout)),
                    });
                }
                return;
            }
            Dispatch::Aborted(_) | Dispatch::Resolved(_) => op
                .outcome()
                .map(|o| o.policy_result())
                .unwrap_or(PolicyResult::FailureException),
        };
        self.complete(result, step);
    }

    fn complete(&mut self, result: PolicyResult, step: &mut Step) {
        let Some(op) = self.current.take() else {
            return;
        };
        self.history.push(op.record());
        step.notifications
            .push(self.operation_notice(&op, NotificationKind::for_result(result)));
        self.message = op.message();
        tracing::info!(
            request_id = %self.request_id,
            policy_id = %op.policy_id(),
            attempt = op.attempt(),
            result = %result,
            "operation completed"
        );

        let policy = op.policy();
        let next = match result.edge() {
            None => EdgeTarget::Terminal(FinalResult::FinalSuccess),
            Some(_) if result == PolicyResult::Failure => {
                if op.attempt() <= policy.retry {
                    let id = policy.id.clone();
                    tracing::debug!(request_id = %self.request_id, policy_id = %id, "retrying");
                    return self.begin_policy(&id, op.attempt() + 1, step);
                }
                if op.attempt() == 1 {
                    policy.failure.clone()
                } else {
                    policy.failure_retries.clone()
                }
            }
            Some(edge) => {
                match result {
                    PolicyResult::FailureTimeout => {
                        self.message = Some(OPERATION_TIMED_OUT.to_string())
                    }
                    PolicyResult::FailureRetries => self.message = Some(RETRY_LIMIT.to_string()),
                    _ => {}
                }
                policy.edge(edge).clone()
            }
        };
        match next {
            EdgeTarget::Policy(id) => self.begin_policy(&id, 1, step),
            EdgeTarget::Terminal(f) => self.finish(f, step),
        }
    }

    fn finish(&mut self, result: FinalResult, step: &mut Step) {
        self.final_result = Some(result);
        self.current = None;
        let kind = NotificationKind::for_final(result);
        tracing::info!(
            request_id = %self.request_id,
            final_result = %result,
            message = self.message.as_deref().unwrap_or_default(),
            "control loop finished"
        );
        step.notifications.push(Notification {
            kind,
            request_id: self.request_id,
            closed_loop_control_name: self.onset.closed_loop_control_name.clone(),
            policy_id: None,
            message: if result.is_failure() {
                self.message.clone()
            } else {
                None
            },
            history: self.history.clone(),
            timestamp: Utc::now(),
        });
    }

    /// Notification about one operation, with the history of attempts by
    /// the same actor and recipe.
    fn operation_notice(&self, op: &Operation, kind: NotificationKind) -> Notification {
        let record = op.record();
        let history = self
            .history
            .iter()
            .filter(|h| h.actor == record.actor && h.operation == record.operation)
            .cloned()
            .collect();
        Notification {
            kind,
            request_id: self.request_id,
            closed_loop_control_name: self.onset.closed_loop_control_name.clone(),
            policy_id: Some(op.policy_id().clone()),
            message: Some(summarize(&record)),
            history,
            timestamp: Utc::now(),
        }
    }
}
