//! # Control-Loop Events
//!
//! An onset event starts a control loop; an abated event for the same
//! request signals that the underlying condition cleared on its own.
//!
//! The inventory attribute map (`aai`) carries flat `entity.attribute`
//! keys such as `generic-vnf.vnf-id` or `vserver.is-closed-loop-disabled`.
//! An event without the map at all is distinct from an event with an
//! empty map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::identity::RequestId;
use crate::target::TargetType;

/// Whether the event raises or clears the condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    /// The condition was detected.
    Onset,
    /// The condition cleared.
    Abated,
}

/// An onset or abatement event delivered to the control loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlLoopEvent {
    /// Name of the control loop the event is addressed to.
    pub closed_loop_control_name: String,
    /// Identifier of the control-loop instance.
    #[serde(default)]
    pub request_id: Option<RequestId>,
    /// Name of the inventory attribute that identifies the target.
    #[serde(default)]
    pub target: Option<String>,
    /// Kind of network function the event is about.
    #[serde(default)]
    pub target_type: Option<TargetType>,
    /// Onset or abated.
    #[serde(rename = "closed_loop_event_status")]
    pub status: EventStatus,
    /// Inventory attribute map, absent when the sender attached none.
    #[serde(default)]
    pub aai: Option<BTreeMap<String, String>>,
}

impl ControlLoopEvent {
    /// An onset event with a fresh request id and no target information.
    pub fn onset(closed_loop_control_name: impl Into<String>) -> Self {
        Self {
            closed_loop_control_name: closed_loop_control_name.into(),
            request_id: Some(RequestId::new()),
            target: None,
            target_type: None,
            status: EventStatus::Onset,
            aai: None,
        }
    }

    /// An abatement for the given onset: same loop, same request id.
    pub fn abatement_of(onset: &ControlLoopEvent) -> Self {
        Self {
            status: EventStatus::Abated,
            ..onset.clone()
        }
    }

    /// Builder: set the target attribute name and type.
    pub fn with_target(mut self, target: impl Into<String>, target_type: TargetType) -> Self {
        self.target = Some(target.into());
        self.target_type = Some(target_type);
        self
    }

    /// Builder: set one inventory attribute, creating the map if needed.
    pub fn with_aai(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.aai
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Builder: replace the request id.
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Look up one inventory attribute.
    pub fn aai_value(&self, key: &str) -> Option<&str> {
        self.aai.as_ref()?.get(key).map(String::as_str)
    }

    /// Value of the attribute named by `target`, if both exist.
    pub fn target_value(&self) -> Option<&str> {
        self.aai_value(self.target.as_deref()?)
    }

    /// Whether this event clears the condition.
    pub fn is_abated(&self) -> bool {
        self.status == EventStatus::Abated
    }
}
