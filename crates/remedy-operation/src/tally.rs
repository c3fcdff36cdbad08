//! # Sub-Target Tally
//!
//! Latest classification per expected sub-target, keyed by correlation id.
//! Resolution is a pure function of a tally snapshot, recomputed after
//! every update.
//!
//! ```text
//! any sub-target pending or transient      → pending
//! every sub-target success                 → SUCCESS
//! every sub-target failure                 → FAILURE
//! all authoritative, mixed or an exception → FAILURE_EXCEPTION
//! ```

use std::collections::BTreeMap;

use remedy_core::PolicyResult;

use crate::classify::ResponseClass;

/// Latest classification per expected sub-target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    entries: BTreeMap<String, Option<ResponseClass>>,
}

impl Tally {
    /// A tally expecting exactly these correlation ids, all pending.
    pub fn expecting<I, S>(correlation_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: correlation_ids
                .into_iter()
                .map(|c| (c.into(), None))
                .collect(),
        }
    }

    /// Whether a correlation id belongs to this tally.
    pub fn expects(&self, correlation_id: &str) -> bool {
        self.entries.contains_key(correlation_id)
    }

    /// Overwrite the classification of one sub-target.
    ///
    /// `NoOp` leaves the tally untouched. Returns `false` for a
    /// correlation id that is not expected.
    pub fn record(&mut self, correlation_id: &str, class: ResponseClass) -> bool {
        match self.entries.get_mut(correlation_id) {
            Some(slot) => {
                if class != ResponseClass::NoOp {
                    *slot = Some(class);
                }
                true
            }
            None => false,
        }
    }

    /// Latest classification of one sub-target.
    pub fn get(&self, correlation_id: &str) -> Option<ResponseClass> {
        self.entries.get(correlation_id).copied().flatten()
    }

    /// Number of expected sub-targets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no sub-target is expected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of sub-targets currently holding `class`.
    pub fn count(&self, class: ResponseClass) -> usize {
        self.entries
            .values()
            .filter(|c| **c == Some(class))
            .count()
    }
}

/// Aggregate result of a tally snapshot, or `None` while pending.
pub fn resolve(tally: &Tally) -> Option<PolicyResult> {
    if tally.is_empty() {
        return None;
    }
    let mut successes = 0;
    let mut failures = 0;
    for class in tally.entries.values() {
        match class {
            Some(ResponseClass::Success) => successes += 1,
            Some(ResponseClass::Failure) => failures += 1,
            Some(ResponseClass::Exception) => {}
            _ => return None,
        }
    }
    let n = tally.len();
    Some(if successes == n {
        PolicyResult::Success
    } else if failures == n {
        PolicyResult::Failure
    } else {
        PolicyResult::FailureException
    })
}
