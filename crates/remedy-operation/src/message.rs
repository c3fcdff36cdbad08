//! # Operation Messages
//!
//! What flows into and out of an operation. Transport and wire encoding
//! belong to the surrounding system; an outbound request carries its body
//! as a JSON value ready for whatever bus delivers it.

use serde::{Deserialize, Serialize};

use remedy_core::ControlLoopEvent;

/// One VM-level unit of an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubTarget {
    /// Correlation id of the request addressed to this sub-target.
    pub correlation_id: String,
    /// VNF the VM belongs to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vnf_id: Option<String>,
    /// The VM, when the action is VM-addressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vserver_id: Option<String>,
}

/// A request ready to be handed to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundRequest {
    /// Correlation id the response will carry.
    pub correlation_id: String,
    /// Actor-specific message body.
    pub body: serde_json::Value,
}

/// A remote actor's response, reduced to what classification needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorResponse {
    /// Correlation id of the request this answers.
    pub correlation_id: String,
    /// Protocol status code; `None` when the response carried no status.
    #[serde(default)]
    pub code: Option<i32>,
    /// Status message text.
    #[serde(default)]
    pub message: Option<String>,
    /// Raw response payload, if any.
    #[serde(default)]
    pub payload: Option<String>,
}

impl ActorResponse {
    /// A response with a status code and no message or payload.
    pub fn new(correlation_id: impl Into<String>, code: i32) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            code: Some(code),
            message: None,
            payload: None,
        }
    }

    /// Builder: set the status message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Builder: set the payload.
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

/// A permit/deny decision from the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GuardDecision {
    /// The action may proceed.
    Permit,
    /// The action must not proceed.
    Deny,
}

/// Anything the transport delivers to an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingMessage {
    /// A protocol response from the remote actor.
    Response(ActorResponse),
    /// A control-loop event, typically an abatement.
    Event(ControlLoopEvent),
    /// A guard decision.
    Guard(GuardDecision),
}

impl From<ActorResponse> for IncomingMessage {
    fn from(r: ActorResponse) -> Self {
        Self::Response(r)
    }
}

impl From<ControlLoopEvent> for IncomingMessage {
    fn from(e: ControlLoopEvent) -> Self {
        Self::Event(e)
    }
}

impl From<GuardDecision> for IncomingMessage {
    fn from(g: GuardDecision) -> Self {
        Self::Guard(g)
    }
}
