//! # Timers
//!
//! Operations and transactions own no clock. These helpers arm tokio
//! timers that call back into the manager when a budget elapses. A timer
//! that fires after its operation already resolved is a no-op.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use remedy_core::RequestId;

use crate::manager::ControlLoopManager;
use crate::transaction::{OperationTimer, Step};

/// Fire [`ControlLoopManager::operation_timeout`] after `timer.after`.
///
/// The task yields the resulting step; empty when the transaction has
/// already moved on or ended.
pub fn arm_operation_timeout(
    manager: Arc<ControlLoopManager>,
    timer: OperationTimer,
) -> JoinHandle<Step> {
    tokio::spawn(async move {
        tokio::time::sleep(timer.after).await;
        manager.operation_timeout(&timer).unwrap_or_else(|e| {
            tracing::debug!(request_id = %timer.request_id, error = %e, "operation timer expired");
            Step::default()
        })
    })
}

/// Fire [`ControlLoopManager::control_loop_timeout`] after `after`.
pub fn arm_control_loop_timeout(
    manager: Arc<ControlLoopManager>,
    request_id: RequestId,
    after: Duration,
) -> JoinHandle<Step> {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        manager.control_loop_timeout(request_id).unwrap_or_else(|e| {
            tracing::debug!(request_id = %request_id, error = %e, "control loop timer expired");
            Step::default()
        })
    })
}

/// Arm whatever timers a step asks for.
pub fn arm_step_timers(
    manager: &Arc<ControlLoopManager>,
    request_id: RequestId,
    step: &Step,
) -> Vec<JoinHandle<Step>> {
    let mut handles = Vec::new();
    if let Some(after) = step.loop_timer {
        handles.push(arm_control_loop_timeout(
            Arc::clone(manager),
            request_id,
            after,
        ));
    }
    if let Some(timer) = step.operation_timer.clone() {
        handles.push(arm_operation_timeout(Arc::clone(manager), timer));
    }
    handles
}
