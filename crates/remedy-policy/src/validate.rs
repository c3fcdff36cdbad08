//! # Control-Loop Validation
//!
//! Four checks, run in order, each appending to one [`Results`] report.
//! No check short-circuits another.
//!
//! 1. Per-policy fields: actor, recipe, target.
//! 2. Reachability from the trigger over all four outcome edges.
//! 3. Worst-case timeout chain against the control-loop budget.
//! 4. Open-loop consistency.
//!
//! ERROR and EXCEPTION messages block execution; WARNING messages do not.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use remedy_core::PolicyId;

use crate::catalog::ActorCatalog;
use crate::policy::{ControlLoopPolicy, Policy};

pub(crate) const ACTOR_NULL: &str = "Policy actor is null";
pub(crate) const RECIPE_INVALID: &str = "Policy recipe is invalid";
pub(crate) const TARGET_NULL: &str = "Policy target is null";
pub(crate) const TIMEOUT_OVERRUN: &str =
    "controlLoop overall timeout is less than the sum of operational policy timeouts.";
pub(crate) const OPEN_LOOP_WITH_POLICIES: &str =
    "Open Loop policy contains policies. The policies will never be invoked.";

// ─── Report ──────────────────────────────────────────────────────────

/// Severity of one validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageLevel {
    /// Informational.
    Info,
    /// Non-fatal; execution may proceed.
    Warning,
    /// Fatal; the control loop must not run.
    Error,
    /// Fatal; something failed while producing the report.
    Exception,
}

impl MessageLevel {
    /// Upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Exception => "EXCEPTION",
        }
    }

    /// Whether a message at this level blocks execution.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Error | Self::Exception)
    }
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Severity.
    pub level: MessageLevel,
    /// Human-readable text.
    pub message: String,
}

impl Message {
    /// Create a message.
    pub fn new(level: MessageLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.message)
    }
}

/// Accumulated validation report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    /// Findings in check order.
    pub messages: Vec<Message>,
    /// YAML rendering of the validated document, when produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification: Option<String>,
}

impl Results {
    /// Append a finding.
    pub fn add(&mut self, level: MessageLevel, message: impl Into<String>) {
        self.messages.push(Message::new(level, message));
    }

    /// Whether any ERROR or EXCEPTION was reported.
    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.level.is_blocking())
    }

    /// Whether the control loop may be executed.
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Whether any message carries exactly this text.
    pub fn contains(&self, text: &str) -> bool {
        self.messages.iter().any(|m| m.message == text)
    }

    /// Number of messages carrying exactly this text.
    pub fn count(&self, text: &str) -> usize {
        self.messages.iter().filter(|m| m.message == text).count()
    }

    /// Blocking messages.
    pub fn errors(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.level.is_blocking())
    }

    /// WARNING messages.
    pub fn warnings(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| m.level == MessageLevel::Warning)
    }
}

// ─── Checks ──────────────────────────────────────────────────────────

/// Run all four checks against `doc`.
pub fn validate<C: ActorCatalog + ?Sized>(doc: &ControlLoopPolicy, catalog: &C) -> Results {
    let mut results = Results::default();

    for policy in &doc.policies {
        check_fields(policy, catalog, &mut results);
    }
    check_reachability(doc, &mut results);
    check_timeout_budget(doc, &mut results);
    check_open_loop(doc, &mut results);

    for m in &results.messages {
        tracing::debug!(
            control_loop = %doc.control_loop.control_loop_name,
            level = %m.level,
            message = %m.message,
            "validation finding"
        );
    }
    results
}

fn check_fields<C: ActorCatalog + ?Sized>(policy: &Policy, catalog: &C, results: &mut Results) {
    if policy.actor.is_none() {
        results.add(MessageLevel::Error, ACTOR_NULL);
    }
    let recipe_ok = match (&policy.actor, &policy.recipe) {
        (Some(actor), Some(recipe)) => {
            catalog.is_valid_recipe(actor, recipe, policy.target.as_ref().map(|t| t.target_type))
        }
        _ => false,
    };
    if !recipe_ok {
        results.add(MessageLevel::Error, RECIPE_INVALID);
    }
    if policy.target.is_none() {
        results.add(MessageLevel::Error, TARGET_NULL);
    }
}

/// Ids reachable from the trigger, breadth-first over all four edges.
pub(crate) fn reachable(doc: &ControlLoopPolicy) -> HashSet<PolicyId> {
    let by_id: HashMap<&PolicyId, &Policy> = doc.policies.iter().map(|p| (&p.id, p)).collect();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();

    if let Some(trigger) = doc.control_loop.trigger_policy.policy_id() {
        if by_id.contains_key(trigger) {
            seen.insert(trigger.clone());
            queue.push_back(trigger);
        }
    }
    while let Some(id) = queue.pop_front() {
        let Some(policy) = by_id.get(id) else {
            continue;
        };
        for next in policy.successors() {
            if by_id.contains_key(next) && seen.insert(next.clone()) {
                queue.push_back(next);
            }
        }
    }
    seen
}

fn check_reachability(doc: &ControlLoopPolicy, results: &mut Results) {
    let seen = reachable(doc);
    for policy in &doc.policies {
        if !seen.contains(&policy.id) {
            results.add(
                MessageLevel::Warning,
                format!("Policy {} is not reachable.", policy.id),
            );
        }
    }
}

fn check_timeout_budget(doc: &ControlLoopPolicy, results: &mut Results) {
    if calculate_timeout(doc) > u64::from(doc.control_loop.timeout) {
        results.add(MessageLevel::Error, TIMEOUT_OVERRUN);
    }
}

fn check_open_loop(doc: &ControlLoopPolicy, results: &mut Results) {
    if doc.control_loop.is_open_loop() && !doc.policies.is_empty() {
        results.add(MessageLevel::Warning, OPEN_LOOP_WITH_POLICIES);
    }
}

// ─── Timeout ─────────────────────────────────────────────────────────

/// Worst-case sum of policy timeouts along any chain starting at the
/// trigger. Edges ending at a sentinel contribute nothing. On a cycle,
/// each policy counts at most once per chain.
///
/// Each policy is expanded once, so the cost is linear in the number of
/// edges. Zero for an open loop.
pub fn calculate_timeout(doc: &ControlLoopPolicy) -> u64 {
    let by_id: HashMap<&PolicyId, &Policy> = doc.policies.iter().map(|p| (&p.id, p)).collect();
    let Some(trigger) = doc.control_loop.trigger_policy.policy_id() else {
        return 0;
    };
    let mut walk = ChainWalk {
        by_id,
        on_path: BTreeSet::new(),
        longest: HashMap::new(),
    };
    walk.longest_chain(trigger)
}

/// Depth-first state for [`calculate_timeout`].
struct ChainWalk<'a> {
    by_id: HashMap<&'a PolicyId, &'a Policy>,
    on_path: BTreeSet<&'a PolicyId>,
    /// Finished policies and the longest chain starting at each.
    longest: HashMap<&'a PolicyId, u64>,
}

impl<'a> ChainWalk<'a> {
    fn longest_chain(&mut self, id: &'a PolicyId) -> u64 {
        if let Some(&done) = self.longest.get(id) {
            return done;
        }
        let Some(policy) = self.by_id.get(id).copied() else {
            return 0;
        };
        // Back edge.
        if !self.on_path.insert(id) {
            return 0;
        }
        let successors: BTreeSet<&'a PolicyId> = policy.successors().collect();
        let downstream = successors
            .into_iter()
            .map(|next| self.longest_chain(next))
            .max()
            .unwrap_or(0);
        self.on_path.remove(id);
        let total = u64::from(policy.timeout) + downstream;
        self.longest.insert(id, total);
        total
    }
}
