//! # Policy Graph Invariants
//!
//! End-to-end authoring scenarios plus property tests for the graph-closure
//! invariant: after any sequence of removals, no edge references a policy
//! that is no longer in the graph.

use proptest::prelude::*;

use remedy_core::{EdgeTarget, FinalResult, PolicyId, PolicyResult, TargetType};
use remedy_policy::{
    ControlLoopPolicy, ControlLoopPolicyBuilder, MessageLevel, NewPolicy, StandardActorCatalog,
};

const BUDGET_ERROR: &str =
    "controlLoop overall timeout is less than the sum of operational policy timeouts.";
const OPEN_LOOP_WARNING: &str =
    "Open Loop policy contains policies. The policies will never be invoked.";

fn vm_policy(name: &str, recipe: &str, timeout: u32) -> NewPolicy {
    NewPolicy::new(name, "APPC", TargetType::Vm, recipe).timeout(timeout)
}

fn assert_closed(doc: &ControlLoopPolicy) {
    for policy in &doc.policies {
        for (edge, target) in policy.edges() {
            if let Some(id) = target.policy_id() {
                assert!(
                    doc.policy(id).is_some(),
                    "{} edge {} dangles at {}",
                    policy.id,
                    edge,
                    id
                );
            }
        }
    }
    if let Some(id) = doc.control_loop.trigger_policy.policy_id() {
        assert!(doc.policy(id).is_some(), "trigger dangles at {id}");
    }
}

// ── Scenarios ──

#[test]
fn timeout_budget_scenario() {
    let mut builder = ControlLoopPolicyBuilder::new("vFirewall", 800);
    let trigger = builder.set_trigger_policy(vm_policy("Restart", "Restart", 300).retry(2));
    builder
        .set_policy_for_policy_result(
            vm_policy("Rebuild", "Rebuild", 600),
            &trigger.id,
            &[PolicyResult::Failure],
        )
        .unwrap();

    assert_eq!(builder.calculate_timeout(), 900);
    let results = builder.build_specification();
    assert_eq!(results.count(BUDGET_ERROR), 1);
    assert!(!results.is_valid());

    builder.set_timeout(1000);
    let results = builder.build_specification();
    assert!(!results.contains(BUDGET_ERROR));
    assert!(results.is_valid());
}

#[test]
fn downstream_timeout_changes_sum_and_removal_drops_it() {
    let mut builder = ControlLoopPolicyBuilder::new("vFirewall", 5000);
    let trigger = builder.set_trigger_policy(vm_policy("Restart", "Restart", 300));
    let rebuild = builder
        .set_policy_for_policy_result(
            vm_policy("Rebuild", "Rebuild", 600),
            &trigger.id,
            &[PolicyResult::FailureTimeout],
        )
        .unwrap();
    assert_eq!(builder.calculate_timeout(), 900);

    builder.remove_policy(&rebuild.id).unwrap();
    builder
        .set_policy_for_policy_result(
            vm_policy("Migrate", "Migrate", 1200),
            &trigger.id,
            &[PolicyResult::FailureTimeout],
        )
        .unwrap();
    assert_eq!(builder.calculate_timeout(), 1500);

    let trigger_id = trigger.id.clone();
    builder.reset_policy_results(&trigger_id).unwrap();
    assert_eq!(builder.calculate_timeout(), 300);
}

#[test]
fn open_loop_with_policies_always_warns() {
    let mut builder = ControlLoopPolicyBuilder::new("vDNS", 1000);
    let trigger = builder.set_trigger_policy(vm_policy("Restart", "Restart", 100));
    let yaml = builder.document().to_yaml().unwrap();
    let mut doc = ControlLoopPolicy::from_yaml(&yaml).unwrap();
    doc.control_loop.trigger_policy = FinalResult::FinalOpenloop.into();

    let builder = ControlLoopPolicyBuilder::from_document(doc).unwrap();
    assert!(builder.is_open_loop());
    let results = builder.build_specification();
    assert_eq!(results.count(OPEN_LOOP_WARNING), 1);
    assert!(results.contains(&format!("Policy {} is not reachable.", trigger.id)));
    assert!(results.is_valid());
}

#[test]
fn every_check_contributes_in_one_report() {
    let mut builder = ControlLoopPolicyBuilder::new("vLB", 10);
    let trigger = builder.set_trigger_policy(NewPolicy {
        name: "broken".into(),
        timeout: 60,
        ..NewPolicy::default()
    });
    let orphan = builder.set_trigger_policy(vm_policy("Restart", "Restart", 30));
    builder.set_trigger_policy_id(&trigger.id).unwrap();

    let results = builder.build_specification();
    let texts: Vec<(MessageLevel, &str)> = results
        .messages
        .iter()
        .map(|m| (m.level, m.message.as_str()))
        .collect();
    let unreachable = format!("Policy {} is not reachable.", orphan.id);
    assert_eq!(
        texts,
        vec![
            (MessageLevel::Error, "Policy actor is null"),
            (MessageLevel::Error, "Policy recipe is invalid"),
            (MessageLevel::Error, "Policy target is null"),
            (MessageLevel::Warning, unreachable.as_str()),
            (MessageLevel::Error, BUDGET_ERROR),
        ]
    );
}

#[test]
fn report_serializes_to_json() {
    let builder = ControlLoopPolicyBuilder::new("vFirewall", 100);
    let results = builder.build_specification();
    let json = serde_json::to_value(&results).unwrap();
    assert_eq!(json["messages"], serde_json::json!([]));
    assert!(json["specification"].as_str().unwrap().contains("FINAL_OPENLOOP"));
}

#[test]
fn graph_walk_from_custom_catalog() {
    let mut catalog = StandardActorCatalog::empty();
    catalog.register("RANController", "Restart", &[TargetType::Pnf]);
    let mut builder = ControlLoopPolicyBuilder::with_catalog("ran", 600, catalog);
    let trigger = builder.set_trigger_policy(
        NewPolicy::new("Restart", "RANController", TargetType::Pnf, "Restart").timeout(120),
    );
    let graph = builder.into_graph().unwrap();
    assert_eq!(graph.name(), "ran");
    assert_eq!(
        graph.next(&trigger.id, PolicyResult::FailureTimeout),
        Some(EdgeTarget::Terminal(FinalResult::FinalFailureTimeout))
    );
}

// ── Properties ──

/// A random graph: `n` policies, each edge wired to a random policy or left
/// at its sentinel, followed by removal of a random subset.
fn graph_plan() -> impl Strategy<Value = (usize, Vec<(usize, usize, usize)>, Vec<usize>)> {
    (2usize..8).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n, 0usize..5), 0..20),
            prop::collection::vec(0..n, 0..n),
        )
    })
}

const WIRABLE: [PolicyResult; 5] = [
    PolicyResult::Failure,
    PolicyResult::FailureRetries,
    PolicyResult::FailureTimeout,
    PolicyResult::FailureException,
    PolicyResult::FailureGuard,
];

proptest! {
    /// Removal never leaves an edge pointing at a removed policy.
    #[test]
    fn removals_never_leave_dangling_edges((n, wires, removals) in graph_plan()) {
        let mut builder = ControlLoopPolicyBuilder::new("prop", 100_000);
        let mut ids: Vec<PolicyId> = Vec::new();
        ids.push(builder.set_trigger_policy(vm_policy("p0", "Restart", 10)).id);
        for i in 1..n {
            let p = builder
                .set_policy_for_policy_result(
                    vm_policy(&format!("p{i}"), "Restart", 10),
                    &ids[0],
                    &[PolicyResult::FailureGuard],
                )
                .unwrap();
            ids.push(p.id);
        }
        for (src, dst, r) in wires {
            builder
                .set_existing_policy_for_policy_result(&ids[dst], &ids[src], &[WIRABLE[r]])
                .unwrap();
        }

        let mut removed = std::collections::HashSet::new();
        for idx in removals {
            let id = &ids[idx];
            if removed.insert(id.clone()) {
                prop_assert!(builder.remove_policy(id).unwrap());
            } else {
                prop_assert!(builder.remove_policy(id).is_err());
            }
            assert_closed(builder.document());
            for policy in builder.policies() {
                prop_assert!(policy.successors().all(|s| !removed.contains(s)));
            }
        }
    }

    /// Resetting the trigger's edges never makes it unreachable.
    #[test]
    fn reset_trigger_stays_reachable(n in 1usize..6) {
        let mut builder = ControlLoopPolicyBuilder::new("prop", 100_000);
        let trigger = builder.set_trigger_policy(vm_policy("t", "Restart", 10));
        let mut last = trigger.id.clone();
        for i in 0..n {
            last = builder
                .set_policy_for_policy_result(
                    vm_policy(&format!("p{i}"), "Rebuild", 10),
                    &last,
                    &[PolicyResult::Failure],
                )
                .unwrap()
                .id;
        }
        builder.reset_policy_results(&trigger.id).unwrap();
        let results = builder.build_specification();
        let unreachable = format!("Policy {} is not reachable.", trigger.id);
        prop_assert!(!results.contains(&unreachable));
        prop_assert_eq!(results.warnings().count(), n);
    }
}
