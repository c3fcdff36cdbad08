//! # Executable Control-Loop Graph
//!
//! The read-only form of a validated control loop. Built once by
//! [`ControlLoopPolicyBuilder::into_graph`](crate::ControlLoopPolicyBuilder::into_graph),
//! then shared behind an `Arc` by every control-loop instance that runs it.

use std::collections::HashMap;

use remedy_core::{EdgeTarget, FinalResult, PolicyId, PolicyResult};

use crate::policy::{ControlLoopPolicy, Policy};

/// A validated, immutable control loop.
#[derive(Debug, Clone)]
pub struct ControlLoopGraph {
    doc: ControlLoopPolicy,
    index: HashMap<PolicyId, usize>,
}

impl ControlLoopGraph {
    pub(crate) fn new(doc: ControlLoopPolicy) -> Self {
        let index = doc
            .policies
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        Self { doc, index }
    }

    /// Control-loop name.
    pub fn name(&self) -> &str {
        &self.doc.control_loop.control_loop_name
    }

    /// Overall budget in seconds.
    pub fn timeout(&self) -> u32 {
        self.doc.control_loop.timeout
    }

    /// Whether an abated event is required to close the loop.
    pub fn abatement(&self) -> bool {
        self.doc.control_loop.abatement
    }

    /// Entry point: a policy, or `FINAL_OPENLOOP`.
    pub fn trigger(&self) -> &EdgeTarget {
        &self.doc.control_loop.trigger_policy
    }

    /// The trigger policy, `None` for an open loop.
    pub fn trigger_policy(&self) -> Option<&Policy> {
        self.trigger().policy_id().and_then(|id| self.policy_for_id(id))
    }

    /// Look up a policy by id.
    pub fn policy_for_id(&self, id: &PolicyId) -> Option<&Policy> {
        self.index.get(id).and_then(|&i| self.doc.policies.get(i))
    }

    /// Where the loop goes after `id` ends with `result`.
    ///
    /// `SUCCESS` always ends the loop in `FINAL_SUCCESS`. `None` when `id`
    /// is not part of this graph.
    pub fn next(&self, id: &PolicyId, result: PolicyResult) -> Option<EdgeTarget> {
        let policy = self.policy_for_id(id)?;
        Some(match result.edge() {
            None => FinalResult::FinalSuccess.into(),
            Some(edge) => policy.edge(edge).clone(),
        })
    }

    /// All policies in authoring order.
    pub fn policies(&self) -> &[Policy] {
        &self.doc.policies
    }

    /// The underlying document.
    pub fn document(&self) -> &ControlLoopPolicy {
        &self.doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ControlLoopPolicyBuilder;
    use crate::policy::NewPolicy;
    use remedy_core::TargetType;

    #[test]
    fn next_follows_edges() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 2000);
        let t = b.set_trigger_policy(
            NewPolicy::new("Restart", "APPC", TargetType::Vm, "Restart").timeout(300),
        );
        let r = b
            .set_policy_for_policy_result(
                NewPolicy::new("Rebuild", "APPC", TargetType::Vm, "Rebuild").timeout(600),
                &t.id,
                &[PolicyResult::Failure],
            )
            .unwrap();
        let g = b.into_graph().unwrap();

        assert_eq!(g.trigger_policy().map(|p| &p.id), Some(&t.id));
        assert_eq!(
            g.next(&t.id, PolicyResult::Success),
            Some(FinalResult::FinalSuccess.into())
        );
        assert_eq!(
            g.next(&t.id, PolicyResult::FailureException),
            Some(EdgeTarget::Policy(r.id.clone()))
        );
        assert_eq!(
            g.next(&r.id, PolicyResult::FailureGuard),
            Some(FinalResult::FinalFailureGuard.into())
        );
        assert_eq!(g.next(&PolicyId::new("x"), PolicyResult::Failure), None);
    }

    #[test]
    fn graph_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ControlLoopGraph>();
    }
}
