//! # Control-Loop Policy Builder
//!
//! The authoring API for one control loop. Every mutation keeps the graph
//! closed: after any call returns, each outcome edge and the trigger point
//! at an existing policy or at a [`FinalResult`] sentinel. Validation can
//! then be run at any moment with [`ControlLoopPolicyBuilder::build_specification`].
//!
//! The builder is owned by a single authoring actor and is not `Sync`-shared.
//! Once the report is clean, [`ControlLoopPolicyBuilder::into_graph`] freezes
//! it into a [`ControlLoopGraph`] for concurrent execution.
//!
//! ## Example
//!
//! ```
//! use remedy_core::{PolicyResult, TargetType};
//! use remedy_policy::{ControlLoopPolicyBuilder, NewPolicy};
//!
//! let mut builder = ControlLoopPolicyBuilder::new("vFirewall", 1200);
//! let restart = builder.set_trigger_policy(
//!     NewPolicy::new("Restart", "APPC", TargetType::Vm, "Restart").retry(2).timeout(300),
//! );
//! builder
//!     .set_policy_for_policy_result(
//!         NewPolicy::new("Rebuild", "APPC", TargetType::Vm, "Rebuild").timeout(600),
//!         &restart.id,
//!         &[PolicyResult::Failure, PolicyResult::FailureRetries],
//!     )
//!     .unwrap();
//! assert!(builder.build_specification().is_valid());
//! ```

use std::collections::HashSet;

use remedy_core::{EdgeTarget, FinalResult, OutcomeEdge, PolicyId, PolicyResult};

use crate::catalog::{ActorCatalog, StandardActorCatalog};
use crate::error::{BuilderError, GraphError};
use crate::graph::ControlLoopGraph;
use crate::policy::{
    ControlLoop, ControlLoopPolicy, NewPolicy, OperationsAccumulateParams, Pnf, Policy, Resource,
    Service,
};
use crate::validate::{self, MessageLevel, Results};

/// Mutation API over one [`ControlLoopPolicy`] document.
#[derive(Debug, Clone)]
pub struct ControlLoopPolicyBuilder<C: ActorCatalog = StandardActorCatalog> {
    doc: ControlLoopPolicy,
    catalog: C,
}

impl ControlLoopPolicyBuilder<StandardActorCatalog> {
    /// An open loop with the given name and overall timeout in seconds.
    pub fn new(control_loop_name: impl Into<String>, timeout: u32) -> Self {
        Self::with_catalog(control_loop_name, timeout, StandardActorCatalog::new())
    }

    /// Adopt a deserialized document, validated against the standard catalog.
    pub fn from_document(doc: ControlLoopPolicy) -> Result<Self, BuilderError> {
        Self::from_document_with_catalog(doc, StandardActorCatalog::new())
    }
}

impl<C: ActorCatalog> ControlLoopPolicyBuilder<C> {
    /// An open loop validated against a custom catalog.
    pub fn with_catalog(control_loop_name: impl Into<String>, timeout: u32, catalog: C) -> Self {
        Self {
            doc: ControlLoopPolicy {
                control_loop: ControlLoop::new(control_loop_name, timeout),
                policies: Vec::new(),
            },
            catalog,
        }
    }

    /// Adopt a deserialized document.
    ///
    /// Rejects duplicate ids, edges to unknown policies, and a trigger that
    /// is neither a known policy nor `FINAL_OPENLOOP`.
    pub fn from_document_with_catalog(
        doc: ControlLoopPolicy,
        catalog: C,
    ) -> Result<Self, BuilderError> {
        let mut ids = HashSet::new();
        for policy in &doc.policies {
            if !ids.insert(&policy.id) {
                return Err(BuilderError::DuplicatePolicy(policy.id.clone()));
            }
        }
        for policy in &doc.policies {
            for (edge, target) in policy.edges() {
                if let Some(id) = target.policy_id() {
                    if !ids.contains(id) {
                        return Err(BuilderError::DanglingEdge {
                            policy: policy.id.clone(),
                            edge,
                            target: target.clone(),
                        });
                    }
                }
            }
        }
        let trigger = &doc.control_loop.trigger_policy;
        let trigger_ok = match trigger {
            EdgeTarget::Policy(id) => ids.contains(id),
            EdgeTarget::Terminal(r) => *r == FinalResult::FinalOpenloop,
        };
        if !trigger_ok {
            return Err(BuilderError::UnknownTrigger(trigger.clone()));
        }

        tracing::debug!(
            control_loop = %doc.control_loop.control_loop_name,
            policies = doc.policies.len(),
            "adopted control-loop document"
        );
        Ok(Self { doc, catalog })
    }

    // ─── Accessors ───────────────────────────────────────────────────

    /// The control-loop header.
    pub fn control_loop(&self) -> &ControlLoop {
        &self.doc.control_loop
    }

    /// The whole document.
    pub fn document(&self) -> &ControlLoopPolicy {
        &self.doc
    }

    /// The catalog used by validation.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// All policies in authoring order.
    pub fn policies(&self) -> &[Policy] {
        &self.doc.policies
    }

    /// Look up a policy.
    pub fn policy(&self, id: &PolicyId) -> Option<&Policy> {
        self.doc.policy(id)
    }

    /// The trigger policy, or `None` for an open loop.
    pub fn trigger_policy(&self) -> Option<&Policy> {
        self.doc
            .control_loop
            .trigger_policy
            .policy_id()
            .and_then(|id| self.doc.policy(id))
    }

    /// Whether the trigger is `FINAL_OPENLOOP`.
    pub fn is_open_loop(&self) -> bool {
        self.doc.control_loop.is_open_loop()
    }

    fn require(&self, id: &PolicyId) -> Result<(), BuilderError> {
        match self.doc.policy(id) {
            Some(_) => Ok(()),
            None => Err(BuilderError::UnknownPolicy(id.clone())),
        }
    }

    fn policy_mut(&mut self, id: &PolicyId) -> Result<&mut Policy, BuilderError> {
        self.doc
            .policy_mut(id)
            .ok_or_else(|| BuilderError::UnknownPolicy(id.clone()))
    }

    // ─── Graph mutations ─────────────────────────────────────────────

    /// Create a policy and make it the trigger.
    ///
    /// A previous trigger stays in the graph, unreferenced by the trigger,
    /// until it is removed separately.
    pub fn set_trigger_policy(&mut self, params: NewPolicy) -> Policy {
        let policy = Policy::new(params);
        self.doc.control_loop.trigger_policy = policy.id.clone().into();
        self.doc.policies.push(policy.clone());
        tracing::debug!(policy_id = %policy.id, "trigger policy created");
        policy
    }

    /// Re-point the trigger at an existing policy.
    pub fn set_trigger_policy_id(&mut self, id: &PolicyId) -> Result<&ControlLoop, BuilderError> {
        self.require(id)?;
        self.doc.control_loop.trigger_policy = id.clone().into();
        tracing::debug!(policy_id = %id, "trigger policy re-pointed");
        Ok(&self.doc.control_loop)
    }

    /// Create a policy and route `source`'s edges for `results` to it.
    ///
    /// Returns the new policy. Nothing changes when `source` is unknown or
    /// `results` contains `SUCCESS`.
    pub fn set_policy_for_policy_result(
        &mut self,
        params: NewPolicy,
        source: &PolicyId,
        results: &[PolicyResult],
    ) -> Result<Policy, BuilderError> {
        self.require(source)?;
        let edges = edges_for(results)?;
        let policy = Policy::new(params);
        self.wire(source, &policy.id, &edges)?;
        self.doc.policies.push(policy.clone());
        Ok(policy)
    }

    /// Route `source`'s edges for `results` to the existing `target`.
    ///
    /// Returns the target policy.
    pub fn set_existing_policy_for_policy_result(
        &mut self,
        target: &PolicyId,
        source: &PolicyId,
        results: &[PolicyResult],
    ) -> Result<Policy, BuilderError> {
        self.require(target)?;
        self.require(source)?;
        let edges = edges_for(results)?;
        self.wire(source, target, &edges)?;
        self.policy(target)
            .cloned()
            .ok_or_else(|| BuilderError::UnknownPolicy(target.clone()))
    }

    fn wire(
        &mut self,
        source: &PolicyId,
        target: &PolicyId,
        edges: &[OutcomeEdge],
    ) -> Result<(), BuilderError> {
        let policy = self.policy_mut(source)?;
        for edge in edges {
            policy.set_edge(*edge, target.clone().into());
            tracing::debug!(policy_id = %source, edge = %edge, target = %target, "edge wired");
        }
        Ok(())
    }

    /// Reset all four edges of `id` to their sentinels.
    pub fn reset_policy_results(&mut self, id: &PolicyId) -> Result<Policy, BuilderError> {
        let policy = self.policy_mut(id)?;
        policy.reset_edges();
        tracing::debug!(policy_id = %id, "edges reset");
        Ok(policy.clone())
    }

    /// Delete a policy.
    ///
    /// Every edge elsewhere that referenced it falls back to its sentinel.
    /// If it was the trigger, the loop becomes open.
    pub fn remove_policy(&mut self, id: &PolicyId) -> Result<bool, BuilderError> {
        self.require(id)?;
        if self.doc.control_loop.trigger_policy.references(id) {
            self.doc.control_loop.trigger_policy = FinalResult::FinalOpenloop.into();
        }
        let mut detached = 0;
        for policy in self.doc.policies.iter_mut() {
            detached += policy.detach(id);
        }
        let before = self.doc.policies.len();
        self.doc.policies.retain(|p| &p.id != id);
        tracing::debug!(policy_id = %id, detached, "policy removed");
        Ok(self.doc.policies.len() < before)
    }

    /// Delete every policy and open the loop.
    pub fn remove_all_policies(&mut self) -> &ControlLoop {
        self.doc.policies.clear();
        self.doc.control_loop.trigger_policy = FinalResult::FinalOpenloop.into();
        tracing::debug!("all policies removed");
        &self.doc.control_loop
    }

    /// Attach accumulation parameters to a policy.
    pub fn add_operations_accumulate_params(
        &mut self,
        id: &PolicyId,
        params: OperationsAccumulateParams,
    ) -> Result<Policy, BuilderError> {
        let policy = self.policy_mut(id)?;
        policy.operations_accumulate_params = Some(params);
        Ok(policy.clone())
    }

    // ─── Metadata ────────────────────────────────────────────────────

    /// Add service references.
    pub fn add_service(&mut self, services: &[Service]) -> Result<&mut Self, BuilderError> {
        if services.iter().any(|s| !s.is_identified()) {
            return Err(BuilderError::InvalidService);
        }
        self.doc.control_loop.services.extend_from_slice(services);
        Ok(self)
    }

    /// Remove service references, matched by UUID when present, else by name.
    pub fn remove_service(&mut self, services: &[Service]) -> Result<&mut Self, BuilderError> {
        if self.doc.control_loop.services.is_empty() {
            return Err(BuilderError::NoServices);
        }
        for service in services {
            if !service.is_identified() {
                return Err(BuilderError::InvalidService);
            }
            let existing = &mut self.doc.control_loop.services;
            let pos = existing
                .iter()
                .position(|s| same_service(s, service))
                .ok_or_else(|| BuilderError::UnknownService(service_label(service)))?;
            existing.remove(pos);
        }
        Ok(self)
    }

    /// Remove every service reference.
    pub fn remove_all_services(&mut self) -> &mut Self {
        self.doc.control_loop.services.clear();
        self
    }

    /// Add resource references.
    pub fn add_resource(&mut self, resources: &[Resource]) -> Result<&mut Self, BuilderError> {
        if resources.iter().any(|r| !r.is_identified()) {
            return Err(BuilderError::InvalidResource);
        }
        self.doc.control_loop.resources.extend_from_slice(resources);
        Ok(self)
    }

    /// Remove resource references, matched by UUID when present, else by name.
    pub fn remove_resource(&mut self, resources: &[Resource]) -> Result<&mut Self, BuilderError> {
        if self.doc.control_loop.resources.is_empty() {
            return Err(BuilderError::NoResources);
        }
        for resource in resources {
            if !resource.is_identified() {
                return Err(BuilderError::InvalidResource);
            }
            let existing = &mut self.doc.control_loop.resources;
            let pos = existing
                .iter()
                .position(|r| same_resource(r, resource))
                .ok_or_else(|| BuilderError::UnknownResource(resource_label(resource)))?;
            existing.remove(pos);
        }
        Ok(self)
    }

    /// Remove every resource reference.
    pub fn remove_all_resources(&mut self) -> &mut Self {
        self.doc.control_loop.resources.clear();
        self
    }

    /// Set the PNF descriptor.
    pub fn set_pnf(&mut self, pnf: Pnf) -> Result<&mut Self, BuilderError> {
        if pnf.pnf_name.is_none() && pnf.pnf_type.is_none() {
            return Err(BuilderError::InvalidPnf);
        }
        self.doc.control_loop.pnf = Some(pnf);
        Ok(self)
    }

    /// Clear the PNF descriptor.
    pub fn remove_pnf(&mut self) -> &mut Self {
        self.doc.control_loop.pnf = None;
        self
    }

    /// Whether an explicit abated event is required to close the loop.
    pub fn set_abatement(&mut self, abatement: bool) -> &mut Self {
        self.doc.control_loop.abatement = abatement;
        self
    }

    /// Overall control-loop budget in seconds.
    pub fn set_timeout(&mut self, timeout: u32) -> &mut Self {
        self.doc.control_loop.timeout = timeout;
        self
    }

    // ─── Validation ──────────────────────────────────────────────────

    /// Worst-case sum of policy timeouts along any chain from the trigger.
    pub fn calculate_timeout(&self) -> u64 {
        validate::calculate_timeout(&self.doc)
    }

    /// Run every check and attach the YAML rendering of the document.
    pub fn build_specification(&self) -> Results {
        let mut results = validate::validate(&self.doc, &self.catalog);
        match self.doc.to_yaml() {
            Ok(yaml) => results.specification = Some(yaml),
            Err(e) => results.add(MessageLevel::Exception, e.to_string()),
        }
        results
    }

    /// Validate and freeze into an executable graph.
    pub fn into_graph(self) -> Result<ControlLoopGraph, GraphError> {
        let results = validate::validate(&self.doc, &self.catalog);
        if results.has_errors() {
            return Err(GraphError::Invalid {
                name: self.doc.control_loop.control_loop_name.clone(),
                errors: results.errors().cloned().collect(),
            });
        }
        Ok(ControlLoopGraph::new(self.doc))
    }
}

fn edges_for(results: &[PolicyResult]) -> Result<Vec<OutcomeEdge>, BuilderError> {
    results
        .iter()
        .map(|r| r.edge().ok_or(BuilderError::NoEdgeForResult(*r)))
        .collect()
}

fn same_service(a: &Service, b: &Service) -> bool {
    match (a.service_uuid, b.service_uuid) {
        (Some(x), Some(y)) => x == y,
        _ => b.service_name.is_some() && a.service_name == b.service_name,
    }
}

fn service_label(s: &Service) -> String {
    match (&s.service_uuid, &s.service_name) {
        (_, Some(name)) => name.clone(),
        (Some(uuid), None) => uuid.to_string(),
        (None, None) => String::new(),
    }
}

fn same_resource(a: &Resource, b: &Resource) -> bool {
    match (a.resource_uuid, b.resource_uuid) {
        (Some(x), Some(y)) => x == y,
        _ => b.resource_name.is_some() && a.resource_name == b.resource_name,
    }
}

fn resource_label(r: &Resource) -> String {
    match (&r.resource_uuid, &r.resource_name) {
        (_, Some(name)) => name.clone(),
        (Some(uuid), None) => uuid.to_string(),
        (None, None) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remedy_core::TargetType;

    fn restart() -> NewPolicy {
        NewPolicy::new("Restart", "APPC", TargetType::Vm, "Restart")
            .retry(2)
            .timeout(300)
    }

    fn rebuild() -> NewPolicy {
        NewPolicy::new("Rebuild", "APPC", TargetType::Vm, "Rebuild").timeout(600)
    }

    // ── Trigger ──

    #[test]
    fn new_builder_is_open_loop() {
        let b = ControlLoopPolicyBuilder::new("cl", 100);
        assert!(b.is_open_loop());
        assert!(b.trigger_policy().is_none());
        assert!(b.policies().is_empty());
    }

    #[test]
    fn replacing_trigger_orphans_previous() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 2000);
        let first = b.set_trigger_policy(restart());
        let second = b.set_trigger_policy(rebuild());
        assert_eq!(b.trigger_policy().map(|p| &p.id), Some(&second.id));
        assert!(b.policy(&first.id).is_some());
        let r = b.build_specification();
        assert!(r.contains(&format!("Policy {} is not reachable.", first.id)));
    }

    #[test]
    fn set_trigger_to_unknown_policy_fails() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 100);
        let err = b.set_trigger_policy_id(&PolicyId::new("nope")).unwrap_err();
        assert_eq!(err, BuilderError::UnknownPolicy(PolicyId::new("nope")));
        assert!(b.is_open_loop());
    }

    // ── Wiring ──

    #[test]
    fn results_wire_matching_edges() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 2000);
        let t = b.set_trigger_policy(restart());
        let r = b
            .set_policy_for_policy_result(
                rebuild(),
                &t.id,
                &[PolicyResult::FailureException, PolicyResult::FailureGuard],
            )
            .unwrap();
        let t = b.policy(&t.id).unwrap();
        assert_eq!(t.failure, EdgeTarget::Policy(r.id.clone()));
        assert_eq!(t.failure_guard, EdgeTarget::Policy(r.id.clone()));
        assert_eq!(t.failure_timeout, FinalResult::FinalFailureTimeout.into());
    }

    #[test]
    fn success_is_rejected_without_mutation() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 2000);
        let t = b.set_trigger_policy(restart());
        let before = b.document().clone();
        let err = b
            .set_policy_for_policy_result(
                rebuild(),
                &t.id,
                &[PolicyResult::Failure, PolicyResult::Success],
            )
            .unwrap_err();
        assert_eq!(err.to_string(), "no edge for SUCCESS");
        assert_eq!(b.document(), &before);
    }

    #[test]
    fn unknown_source_is_rejected() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 2000);
        let err = b
            .set_policy_for_policy_result(rebuild(), &PolicyId::new("x"), &[PolicyResult::Failure])
            .unwrap_err();
        assert!(matches!(err, BuilderError::UnknownPolicy(_)));
        assert!(b.policies().is_empty());
    }

    #[test]
    fn existing_target_wiring_returns_target() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 2000);
        let t = b.set_trigger_policy(restart());
        let r = b
            .set_policy_for_policy_result(rebuild(), &t.id, &[PolicyResult::Failure])
            .unwrap();
        let got = b
            .set_existing_policy_for_policy_result(&r.id, &t.id, &[PolicyResult::FailureTimeout])
            .unwrap();
        assert_eq!(got.id, r.id);
        assert_eq!(
            b.policy(&t.id).unwrap().failure_timeout,
            EdgeTarget::Policy(r.id)
        );
    }

    // ── Removal ──

    #[test]
    fn remove_resets_referencing_edges() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 2000);
        let t = b.set_trigger_policy(restart());
        let r = b
            .set_policy_for_policy_result(
                rebuild(),
                &t.id,
                &[PolicyResult::Failure, PolicyResult::FailureRetries],
            )
            .unwrap();
        assert!(b.remove_policy(&r.id).unwrap());
        let t = b.policy(&t.id).unwrap();
        assert_eq!(t.failure, FinalResult::FinalFailure.into());
        assert_eq!(t.failure_retries, FinalResult::FinalFailureRetries.into());
    }

    #[test]
    fn removing_trigger_opens_loop_and_detaches() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 2000);
        let t = b.set_trigger_policy(restart());
        let r = b
            .set_policy_for_policy_result(rebuild(), &t.id, &[PolicyResult::Failure])
            .unwrap();
        b.set_existing_policy_for_policy_result(&t.id, &r.id, &[PolicyResult::Failure])
            .unwrap();
        assert!(b.remove_policy(&t.id).unwrap());
        assert!(b.is_open_loop());
        assert_eq!(b.policy(&r.id).unwrap().failure, FinalResult::FinalFailure.into());
    }

    #[test]
    fn remove_unknown_policy_fails() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 2000);
        assert!(b.remove_policy(&PolicyId::new("x")).is_err());
    }

    #[test]
    fn remove_all_policies_opens_loop() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 2000);
        let t = b.set_trigger_policy(restart());
        b.set_policy_for_policy_result(rebuild(), &t.id, &[PolicyResult::Failure])
            .unwrap();
        let cl = b.remove_all_policies();
        assert!(cl.is_open_loop());
        assert!(b.policies().is_empty());
        assert!(b.build_specification().messages.is_empty());
    }

    #[test]
    fn reset_trigger_keeps_it_reachable() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 2000);
        let t = b.set_trigger_policy(restart());
        b.set_policy_for_policy_result(rebuild(), &t.id, &[PolicyResult::Failure])
            .unwrap();
        b.reset_policy_results(&t.id).unwrap();
        let r = b.build_specification();
        assert!(!r.contains(&format!("Policy {} is not reachable.", t.id)));
        assert_eq!(r.warnings().count(), 1);
    }

    // ── Metadata ──

    #[test]
    fn service_validation() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 100);
        assert_eq!(
            b.add_service(&[Service::default()]).unwrap_err(),
            BuilderError::InvalidService
        );
        assert_eq!(
            b.remove_service(&[Service::named("vFW")]).unwrap_err(),
            BuilderError::NoServices
        );
        b.add_service(&[Service::named("vFW"), Service::named("vLB")])
            .unwrap();
        assert_eq!(
            b.remove_service(&[Service::named("vDNS")]).unwrap_err(),
            BuilderError::UnknownService("vDNS".into())
        );
        b.remove_service(&[Service::named("vFW")]).unwrap();
        assert_eq!(b.control_loop().services, vec![Service::named("vLB")]);
        b.remove_all_services();
        assert!(b.control_loop().services.is_empty());
    }

    #[test]
    fn resource_validation() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 100);
        assert_eq!(
            b.add_resource(&[Resource::default()]).unwrap_err(),
            BuilderError::InvalidResource
        );
        b.add_resource(&[Resource::named("vFW-VF")]).unwrap();
        b.remove_resource(&[Resource::named("vFW-VF")]).unwrap();
        assert_eq!(
            b.remove_resource(&[Resource::named("vFW-VF")]).unwrap_err(),
            BuilderError::NoResources
        );
    }

    #[test]
    fn pnf_requires_name_or_type() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 100);
        assert_eq!(b.set_pnf(Pnf::default()).unwrap_err(), BuilderError::InvalidPnf);
        b.set_pnf(Pnf {
            pnf_name: Some("pnf-1".into()),
            pnf_type: None,
        })
        .unwrap();
        assert!(b.control_loop().pnf.is_some());
        b.remove_pnf();
        assert!(b.control_loop().pnf.is_none());
    }

    #[test]
    fn accumulate_params_attach() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 100);
        let t = b.set_trigger_policy(restart());
        let p = b
            .add_operations_accumulate_params(
                &t.id,
                OperationsAccumulateParams {
                    period: "15 minute".into(),
                    limit: 3,
                },
            )
            .unwrap();
        assert_eq!(p.operations_accumulate_params.map(|a| a.limit), Some(3));
    }

    // ── Documents ──

    #[test]
    fn specification_is_yaml_of_document() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 1000);
        b.set_trigger_policy(restart());
        let r = b.build_specification();
        let spec = r.specification.unwrap();
        let back = ControlLoopPolicy::from_yaml(&spec).unwrap();
        assert_eq!(&back, b.document());
    }

    #[test]
    fn from_document_rejects_dangling_edge() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 1000);
        let t = b.set_trigger_policy(restart());
        let mut doc = b.document().clone();
        doc.policies[0].set_edge(OutcomeEdge::Failure, PolicyId::new("ghost").into());
        let err = ControlLoopPolicyBuilder::from_document(doc).unwrap_err();
        assert_eq!(
            err,
            BuilderError::DanglingEdge {
                policy: t.id,
                edge: OutcomeEdge::Failure,
                target: PolicyId::new("ghost").into(),
            }
        );
    }

    #[test]
    fn from_document_rejects_terminal_trigger() {
        let mut doc = ControlLoopPolicyBuilder::new("cl", 1000).document().clone();
        doc.control_loop.trigger_policy = FinalResult::FinalFailure.into();
        assert!(matches!(
            ControlLoopPolicyBuilder::from_document(doc),
            Err(BuilderError::UnknownTrigger(_))
        ));
    }

    #[test]
    fn into_graph_rejects_errors() {
        let mut b = ControlLoopPolicyBuilder::new("cl", 100);
        b.set_trigger_policy(restart());
        let err = b.into_graph().unwrap_err();
        let GraphError::Invalid { errors, .. } = err;
        assert_eq!(errors.len(), 1);
    }
}
