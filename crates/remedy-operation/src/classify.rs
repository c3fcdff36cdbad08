//! # Response Classification
//!
//! Each actor family encodes outcomes in its own status codes. A
//! [`ResponseClassifier`] reduces one response to a [`ResponseClass`];
//! aggregation only ever sees classes.
//!
//! ## APPC-LCM status codes
//!
//! ```text
//! 100           ACCEPTED         no-op
//! 200           ERROR            exception
//! 300..=316     REJECT           exception
//! 400           SUCCESS          success
//! 401..=406,450 FAILURE          failure
//! 500           PARTIAL_SUCCESS  transient-success
//! 501..=599     PARTIAL_FAILURE  transient-failure
//! other         (unknown)        exception
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::message::ActorResponse;

/// Classification of one sub-target's latest response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseClass {
    /// Informational; never advances resolution.
    NoOp,
    /// Favorable but not yet final for the sub-target.
    TransientSuccess,
    /// Unfavorable but not yet final for the sub-target.
    TransientFailure,
    /// Favorable and final.
    Success,
    /// Unfavorable and final.
    Failure,
    /// Malformed or unexpected response; final.
    Exception,
}

impl ResponseClass {
    /// Whether the class is final for aggregation purposes.
    pub fn is_authoritative(&self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Exception)
    }

    /// Kebab-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoOp => "no-op",
            Self::TransientSuccess => "transient-success",
            Self::TransientFailure => "transient-failure",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Exception => "exception",
        }
    }
}

impl fmt::Display for ResponseClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A class plus the text worth recording with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The class.
    pub class: ResponseClass,
    /// Status message or a description of what was wrong with the response.
    pub detail: Option<String>,
}

impl Classification {
    /// A classification carrying the response's own message.
    pub fn new(class: ResponseClass, detail: Option<String>) -> Self {
        Self { class, detail }
    }
}

/// Reduces one actor response to a class.
pub trait ResponseClassifier: Send + Sync {
    /// Classify one response.
    fn classify(&self, response: &ActorResponse) -> Classification;
}

// ─── APPC-LCM ────────────────────────────────────────────────────────

/// APPC-LCM status code families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppcLcmResponseCode {
    /// Request received.
    Accepted,
    /// Request could not be processed.
    Error,
    /// Request refused.
    Reject,
    /// Action completed.
    Success,
    /// Action failed.
    Failure,
    /// Action completed on part of the target.
    PartialSuccess,
    /// Action failed on part of the target.
    PartialFailure,
}

impl AppcLcmResponseCode {
    /// Family of a numeric status code; `None` for codes outside every family.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            100 => Some(Self::Accepted),
            200 => Some(Self::Error),
            300..=316 => Some(Self::Reject),
            400 => Some(Self::Success),
            401..=406 | 450 => Some(Self::Failure),
            500 => Some(Self::PartialSuccess),
            501..=599 => Some(Self::PartialFailure),
            _ => None,
        }
    }

    /// The aggregation class of this family.
    pub fn class(&self) -> ResponseClass {
        match self {
            Self::Accepted => ResponseClass::NoOp,
            Self::Error | Self::Reject => ResponseClass::Exception,
            Self::Success => ResponseClass::Success,
            Self::Failure => ResponseClass::Failure,
            Self::PartialSuccess => ResponseClass::TransientSuccess,
            Self::PartialFailure => ResponseClass::TransientFailure,
        }
    }
}

pub(crate) const STATUS_MISSING: &str =
    "Policy was unable to parse APP-C response status field (it was null).";
pub(crate) const STATUS_UNKNOWN: &str =
    "Policy was unable to parse APP-C response status code field.";

fn lcm_family(response: &ActorResponse) -> Result<AppcLcmResponseCode, Classification> {
    let code = response.code.ok_or_else(|| {
        Classification::new(ResponseClass::Exception, Some(STATUS_MISSING.to_string()))
    })?;
    AppcLcmResponseCode::from_code(code).ok_or_else(|| {
        Classification::new(ResponseClass::Exception, Some(STATUS_UNKNOWN.to_string()))
    })
}

/// Classifier for APPC-LCM action recipes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppcLcmClassifier;

impl ResponseClassifier for AppcLcmClassifier {
    fn classify(&self, response: &ActorResponse) -> Classification {
        match lcm_family(response) {
            Ok(family) => Classification::new(family.class(), response.message.clone()),
            Err(c) => c,
        }
    }
}

/// Classifier for the APPC-LCM `HealthCheck` recipe.
///
/// A `SUCCESS` status only means the check ran; the payload's `state`
/// field says whether the VNF is healthy.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppcLcmHealthCheckClassifier;

impl ResponseClassifier for AppcLcmHealthCheckClassifier {
    fn classify(&self, response: &ActorResponse) -> Classification {
        let family = match lcm_family(response) {
            Ok(f) => f,
            Err(c) => return c,
        };
        if family != AppcLcmResponseCode::Success {
            return Classification::new(family.class(), response.message.clone());
        }
        let Some(payload) = response.payload.as_deref().filter(|p| !p.is_empty()) else {
            return Classification::new(
                ResponseClass::Exception,
                Some("Policy was unable to parse APP-C response payload because it was null.".into()),
            );
        };
        let state = serde_json::from_str::<serde_json::Value>(payload)
            .ok()
            .and_then(|v| v.get("state").and_then(|s| s.as_str()).map(str::to_string));
        match state.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("healthy") => {
                Classification::new(ResponseClass::Success, Some("VNF is healthy".into()))
            }
            Some(s) if s.eq_ignore_ascii_case("unhealthy") => {
                Classification::new(ResponseClass::Failure, Some("VNF is unhealthy".into()))
            }
            _ => Classification::new(
                ResponseClass::Exception,
                Some(
                    "Error: Could not determine the state of the VNF. \
                     The state field in the APPC response payload was unrecognized or null."
                        .into(),
                ),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_of(code: i32) -> ResponseClass {
        AppcLcmClassifier.classify(&ActorResponse::new("c", code)).class
    }

    #[test]
    fn lcm_code_families() {
        assert_eq!(class_of(100), ResponseClass::NoOp);
        assert_eq!(class_of(200), ResponseClass::Exception);
        assert_eq!(class_of(300), ResponseClass::Exception);
        assert_eq!(class_of(316), ResponseClass::Exception);
        assert_eq!(class_of(400), ResponseClass::Success);
        assert_eq!(class_of(401), ResponseClass::Failure);
        assert_eq!(class_of(406), ResponseClass::Failure);
        assert_eq!(class_of(450), ResponseClass::Failure);
        assert_eq!(class_of(500), ResponseClass::TransientSuccess);
        assert_eq!(class_of(501), ResponseClass::TransientFailure);
        assert_eq!(class_of(599), ResponseClass::TransientFailure);
    }

    #[test]
    fn lcm_unknown_codes_are_exceptions() {
        for code in [0, 99, 317, 407, 449, 600, -1] {
            let c = AppcLcmClassifier.classify(&ActorResponse::new("c", code));
            assert_eq!(c.class, ResponseClass::Exception, "code {code}");
            assert_eq!(c.detail.as_deref(), Some(STATUS_UNKNOWN));
        }
    }

    #[test]
    fn missing_status_is_exception() {
        let mut r = ActorResponse::new("c", 400);
        r.code = None;
        let c = AppcLcmClassifier.classify(&r);
        assert_eq!(c.class, ResponseClass::Exception);
        assert_eq!(c.detail.as_deref(), Some(STATUS_MISSING));
    }

    #[test]
    fn status_message_is_carried() {
        let r = ActorResponse::new("c", 401).with_message("VM did not restart");
        assert_eq!(
            AppcLcmClassifier.classify(&r).detail.as_deref(),
            Some("VM did not restart")
        );
    }

    #[test]
    fn health_check_reads_payload_state() {
        let hc = AppcLcmHealthCheckClassifier;
        let healthy = ActorResponse::new("c", 400).with_payload(r#"{"state":"healthy"}"#);
        assert_eq!(hc.classify(&healthy).class, ResponseClass::Success);
        let sick = ActorResponse::new("c", 400).with_payload(r#"{"state":"UNHEALTHY"}"#);
        assert_eq!(hc.classify(&sick).class, ResponseClass::Failure);
        let empty = ActorResponse::new("c", 400);
        assert_eq!(hc.classify(&empty).class, ResponseClass::Exception);
        let odd = ActorResponse::new("c", 400).with_payload(r#"{"state":"meh"}"#);
        assert_eq!(hc.classify(&odd).class, ResponseClass::Exception);
        assert_eq!(hc.classify(&ActorResponse::new("c", 401)).class, ResponseClass::Failure);
    }

    #[test]
    fn only_final_classes_are_authoritative() {
        assert!(ResponseClass::Exception.is_authoritative());
        assert!(!ResponseClass::TransientSuccess.is_authoritative());
        assert!(!ResponseClass::NoOp.is_authoritative());
    }
}
