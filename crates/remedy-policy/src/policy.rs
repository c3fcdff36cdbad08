//! # Control-Loop Policy Document
//!
//! The serde-level data model of one remediation graph. Field names follow
//! the control-loop YAML documents authored by operators (`controlLoop`,
//! `trigger_policy`, `failure_retries`, ...).
//!
//! ```yaml
//! controlLoop:
//!   controlLoopName: vFirewall
//!   trigger_policy: 2a0d1e0c-...
//!   timeout: 1200
//!   abatement: false
//! policies:
//!   - id: 2a0d1e0c-...
//!     name: Restart the VM
//!     actor: APPC
//!     recipe: Restart
//!     target: { type: VM }
//!     retry: 2
//!     timeout: 300
//!     failure: FINAL_FAILURE
//!     failure_retries: FINAL_FAILURE_RETRIES
//!     failure_timeout: FINAL_FAILURE_TIMEOUT
//!     failure_guard: FINAL_FAILURE_GUARD
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use remedy_core::{EdgeTarget, FinalResult, OutcomeEdge, PolicyId, Target};

// ─── Policy ──────────────────────────────────────────────────────────

/// Accumulation parameters: the policy only fires after `limit` matching
/// events within `period`. Evaluated by the rule engine; the graph only
/// stores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationsAccumulateParams {
    /// Accumulation window, e.g. `"15 minute"`.
    pub period: String,
    /// Number of events required within the window.
    pub limit: u32,
}

/// One remediation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    /// Unique within the owning control loop.
    pub id: PolicyId,
    /// Short human-readable name.
    pub name: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Remote controller family, e.g. `APPC`.
    #[serde(default)]
    pub actor: Option<String>,
    /// Command name, valid only for certain actor/target combinations.
    #[serde(default)]
    pub recipe: Option<String>,
    /// Scope of the action.
    #[serde(default)]
    pub target: Option<Target>,
    /// Free-form parameters passed to the remote actor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<BTreeMap<String, String>>,
    /// Retry budget for this policy's own action.
    #[serde(default)]
    pub retry: u32,
    /// Timeout budget for one attempt, in seconds.
    #[serde(default)]
    pub timeout: u32,
    /// Followed on `FAILURE` and `FAILURE_EXCEPTION`.
    #[serde(default = "default_failure")]
    pub failure: EdgeTarget,
    /// Followed on `FAILURE_RETRIES`.
    #[serde(default = "default_failure_retries")]
    pub failure_retries: EdgeTarget,
    /// Followed on `FAILURE_TIMEOUT`.
    #[serde(default = "default_failure_timeout")]
    pub failure_timeout: EdgeTarget,
    /// Followed on `FAILURE_GUARD`.
    #[serde(default = "default_failure_guard")]
    pub failure_guard: EdgeTarget,
    /// Accumulation parameters, if the policy accumulates events.
    #[serde(
        default,
        rename = "operationsAccumulateParams",
        skip_serializing_if = "Option::is_none"
    )]
    pub operations_accumulate_params: Option<OperationsAccumulateParams>,
}

fn default_failure() -> EdgeTarget {
    OutcomeEdge::Failure.sentinel().into()
}

fn default_failure_retries() -> EdgeTarget {
    OutcomeEdge::FailureRetries.sentinel().into()
}

fn default_failure_timeout() -> EdgeTarget {
    OutcomeEdge::FailureTimeout.sentinel().into()
}

fn default_failure_guard() -> EdgeTarget {
    OutcomeEdge::FailureGuard.sentinel().into()
}

impl Policy {
    /// Create a policy with a fresh id and every edge at its sentinel.
    pub fn new(params: NewPolicy) -> Self {
        Self::with_id(PolicyId::generate(), params)
    }

    /// Create a policy with the given id and every edge at its sentinel.
    pub fn with_id(id: PolicyId, params: NewPolicy) -> Self {
        Self {
            id,
            name: params.name,
            description: params.description,
            actor: params.actor,
            recipe: params.recipe,
            target: params.target,
            payload: params.payload,
            retry: params.retry,
            timeout: params.timeout,
            failure: default_failure(),
            failure_retries: default_failure_retries(),
            failure_timeout: default_failure_timeout(),
            failure_guard: default_failure_guard(),
            operations_accumulate_params: None,
        }
    }

    /// The target of one outcome edge.
    pub fn edge(&self, edge: OutcomeEdge) -> &EdgeTarget {
        match edge {
            OutcomeEdge::Failure => &self.failure,
            OutcomeEdge::FailureRetries => &self.failure_retries,
            OutcomeEdge::FailureTimeout => &self.failure_timeout,
            OutcomeEdge::FailureGuard => &self.failure_guard,
        }
    }

    /// Point one outcome edge somewhere else.
    pub fn set_edge(&mut self, edge: OutcomeEdge, target: EdgeTarget) {
        let slot = match edge {
            OutcomeEdge::Failure => &mut self.failure,
            OutcomeEdge::FailureRetries => &mut self.failure_retries,
            OutcomeEdge::FailureTimeout => &mut self.failure_timeout,
            OutcomeEdge::FailureGuard => &mut self.failure_guard,
        };
        *slot = target;
    }

    /// Reset every outcome edge to its sentinel.
    pub fn reset_edges(&mut self) {
        for edge in OutcomeEdge::ALL {
            self.set_edge(edge, edge.sentinel().into());
        }
    }

    /// Reset every edge that references `id` to its sentinel.
    ///
    /// Returns the number of edges that changed.
    pub fn detach(&mut self, id: &PolicyId) -> usize {
        let mut changed = 0;
        for edge in OutcomeEdge::ALL {
            if self.edge(edge).references(id) {
                self.set_edge(edge, edge.sentinel().into());
                changed += 1;
            }
        }
        changed
    }

    /// All four edges with their targets, in traversal order.
    pub fn edges(&self) -> impl Iterator<Item = (OutcomeEdge, &EdgeTarget)> {
        OutcomeEdge::ALL.into_iter().map(move |e| (e, self.edge(e)))
    }

    /// Ids of the policies this policy routes to, in traversal order.
    pub fn successors(&self) -> impl Iterator<Item = &PolicyId> {
        self.edges().filter_map(|(_, t)| t.policy_id())
    }
}

/// Creation parameters for a new policy.
///
/// `actor`, `recipe` and `target` are optional so that an incomplete policy
/// can be authored and then reported by validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPolicy {
    /// Short human-readable name.
    pub name: String,
    /// Longer description.
    pub description: String,
    /// Remote controller family.
    pub actor: Option<String>,
    /// Scope of the action.
    pub target: Option<Target>,
    /// Command name.
    pub recipe: Option<String>,
    /// Parameters passed to the remote actor.
    pub payload: Option<BTreeMap<String, String>>,
    /// Retry budget.
    pub retry: u32,
    /// Timeout budget, in seconds.
    pub timeout: u32,
}

impl NewPolicy {
    /// A fully specified policy with no payload.
    pub fn new(
        name: impl Into<String>,
        actor: impl Into<String>,
        target: impl Into<Target>,
        recipe: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            actor: Some(actor.into()),
            target: Some(target.into()),
            recipe: Some(recipe.into()),
            ..Self::default()
        }
    }

    /// Builder: set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set the retry budget.
    pub fn retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    /// Builder: set the timeout budget in seconds.
    pub fn timeout(mut self, timeout: u32) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder: set one payload entry.
    pub fn payload_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.payload
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }
}

// ─── Control-loop metadata ───────────────────────────────────────────

/// Service catalog reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Service {
    /// Catalog UUID of the service.
    #[serde(default, rename = "serviceUUID", skip_serializing_if = "Option::is_none")]
    pub service_uuid: Option<Uuid>,
    /// Catalog name of the service.
    #[serde(default, rename = "serviceName", skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
}

impl Service {
    /// A service referenced by name only.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            service_uuid: None,
            service_name: Some(name.into()),
        }
    }

    /// Whether the reference identifies anything.
    pub fn is_identified(&self) -> bool {
        self.service_uuid.is_some() || self.service_name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

/// Resource catalog reference.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resource {
    /// Catalog UUID of the resource.
    #[serde(default, rename = "resourceUUID", skip_serializing_if = "Option::is_none")]
    pub resource_uuid: Option<Uuid>,
    /// Catalog name of the resource.
    #[serde(default, rename = "resourceName", skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    /// Resource kind, e.g. `VF` or `VFC`.
    #[serde(default, rename = "resourceType", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

impl Resource {
    /// A resource referenced by name only.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            resource_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Whether the reference identifies anything.
    pub fn is_identified(&self) -> bool {
        self.resource_uuid.is_some()
            || self.resource_name.as_deref().is_some_and(|n| !n.is_empty())
    }
}

/// Physical network function descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pnf {
    /// Inventory name of the PNF.
    #[serde(default, rename = "PNFName", skip_serializing_if = "Option::is_none")]
    pub pnf_name: Option<String>,
    /// PNF type, e.g. `eNodeB`.
    #[serde(default, rename = "PNFType", skip_serializing_if = "Option::is_none")]
    pub pnf_type: Option<String>,
}

// ─── ControlLoop ─────────────────────────────────────────────────────

/// Header of one remediation graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlLoop {
    /// Name of the control loop; events are addressed to it.
    #[serde(rename = "controlLoopName")]
    pub control_loop_name: String,
    /// Document format version.
    #[serde(default = "default_version")]
    pub version: String,
    /// Services the loop applies to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<Service>,
    /// Resources the loop applies to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,
    /// PNF the loop applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnf: Option<Pnf>,
    /// Entry point: a policy id, or `FINAL_OPENLOOP` for observe-only.
    pub trigger_policy: EdgeTarget,
    /// Overall budget for the whole chain, in seconds.
    pub timeout: u32,
    /// Whether an explicit abated event is required to close the loop.
    #[serde(default)]
    pub abatement: bool,
}

fn default_version() -> String {
    "2.0.0".to_string()
}

impl ControlLoop {
    /// An open loop with no metadata.
    pub fn new(control_loop_name: impl Into<String>, timeout: u32) -> Self {
        Self {
            control_loop_name: control_loop_name.into(),
            version: default_version(),
            services: Vec::new(),
            resources: Vec::new(),
            pnf: None,
            trigger_policy: FinalResult::FinalOpenloop.into(),
            timeout,
            abatement: false,
        }
    }

    /// Whether the trigger is `FINAL_OPENLOOP`.
    pub fn is_open_loop(&self) -> bool {
        self.trigger_policy == EdgeTarget::Terminal(FinalResult::FinalOpenloop)
    }
}

/// A complete control-loop document: header plus policies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlLoopPolicy {
    /// Header.
    #[serde(rename = "controlLoop")]
    pub control_loop: ControlLoop,
    /// Policies, in authoring order.
    #[serde(default)]
    pub policies: Vec<Policy>,
}

impl ControlLoopPolicy {
    /// Find a policy by id.
    pub fn policy(&self, id: &PolicyId) -> Option<&Policy> {
        self.policies.iter().find(|p| &p.id == id)
    }

    /// Find a policy by id, mutably.
    pub fn policy_mut(&mut self, id: &PolicyId) -> Option<&mut Policy> {
        self.policies.iter_mut().find(|p| &p.id == id)
    }

    /// Parse a YAML document.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remedy_core::TargetType;

    fn restart() -> Policy {
        Policy::new(NewPolicy::new("Restart", "APPC", TargetType::Vm, "Restart").timeout(300))
    }

    #[test]
    fn new_policy_edges_start_at_sentinels() {
        let p = restart();
        for (edge, target) in p.edges() {
            assert_eq!(target, &EdgeTarget::Terminal(edge.sentinel()));
        }
        assert_eq!(p.successors().count(), 0);
    }

    #[test]
    fn detach_resets_only_matching_edges() {
        let mut p = restart();
        let a = PolicyId::new("a");
        let b = PolicyId::new("b");
        p.set_edge(OutcomeEdge::Failure, a.clone().into());
        p.set_edge(OutcomeEdge::FailureTimeout, a.clone().into());
        p.set_edge(OutcomeEdge::FailureGuard, b.clone().into());
        assert_eq!(p.detach(&a), 2);
        assert_eq!(p.failure, FinalResult::FinalFailure.into());
        assert_eq!(p.failure_timeout, FinalResult::FinalFailureTimeout.into());
        assert_eq!(p.failure_guard, EdgeTarget::Policy(b));
    }

    #[test]
    fn new_control_loop_is_open() {
        let cl = ControlLoop::new("cl", 1200);
        assert!(cl.is_open_loop());
        assert_eq!(cl.version, "2.0.0");
    }

    #[test]
    fn yaml_document_parses_with_defaults() {
        let yaml = r#"
controlLoop:
  controlLoopName: vFirewall
  trigger_policy: p1
  timeout: 1200
policies:
  - id: p1
    name: Restart the VM
    actor: APPC
    recipe: Restart
    target:
      type: VM
    retry: 2
    timeout: 300
    failure: FINAL_FAILURE
"#;
        let doc = ControlLoopPolicy::from_yaml(yaml).unwrap();
        assert_eq!(doc.control_loop.trigger_policy, EdgeTarget::Policy(PolicyId::new("p1")));
        let p = doc.policy(&PolicyId::new("p1")).unwrap();
        assert_eq!(p.failure_guard, FinalResult::FinalFailureGuard.into());
        assert_eq!(p.target, Some(Target::new(TargetType::Vm)));
        assert!(!doc.control_loop.abatement);
    }

    #[test]
    fn service_identification() {
        assert!(Service::named("vFW").is_identified());
        assert!(!Service::named("").is_identified());
        assert!(!Service::default().is_identified());
    }
}
