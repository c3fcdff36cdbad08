//! # Inventory Preconditions
//!
//! Checks run against the triggering event before any request is sent.
//! A failure is a value: its `Display` text is the notification string the
//! surrounding system forwards as-is.

use thiserror::Error;

use remedy_core::ControlLoopEvent;

use crate::config::OperationConfig;
use crate::error::InventoryError;

/// Why an operation aborted before sending.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionFailure {
    /// The event has no inventory attribute map at all.
    #[error("No A&AI Subtag")]
    NoAaiSubtag,

    /// The closed-loop-disabled attribute is absent.
    #[error("{key} information missing")]
    DisabledFlagMissing {
        /// Attribute name.
        key: String,
    },

    /// Closed-loop action is disabled for the target.
    #[error("{key} is set to true")]
    DisabledFlagSet {
        /// Attribute name.
        key: String,
    },

    /// The event's target attribute has no value in the map.
    #[error("target field invalid - must have corresponding AAI value")]
    TargetMismatch,

    /// An attribute needed to resolve the sub-targets is absent.
    #[error("{0} information missing")]
    MissingAttribute(String),

    /// The inventory collaborator could not resolve the sub-targets.
    #[error("{0}")]
    Inventory(#[from] InventoryError),
}

/// Run the four event checks in order; the first failure wins.
pub fn check(event: &ControlLoopEvent, config: &OperationConfig) -> Result<(), PreconditionFailure> {
    let aai = event.aai.as_ref().ok_or(PreconditionFailure::NoAaiSubtag)?;
    let key = &config.closed_loop_disabled_key;
    let flag = aai
        .get(key)
        .ok_or_else(|| PreconditionFailure::DisabledFlagMissing { key: key.clone() })?;
    if is_disabled(flag) {
        return Err(PreconditionFailure::DisabledFlagSet { key: key.clone() });
    }
    match event.target.as_deref() {
        Some(target) if aai.contains_key(target) => Ok(()),
        _ => Err(PreconditionFailure::TargetMismatch),
    }
}

fn is_disabled(flag: &str) -> bool {
    flag.eq_ignore_ascii_case("true") || flag.eq_ignore_ascii_case("y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use remedy_core::TargetType;

    fn event() -> ControlLoopEvent {
        ControlLoopEvent::onset("cl").with_target("vserver.vserver-name", TargetType::Vm)
    }

    #[test]
    fn no_map_at_all() {
        let err = check(&event(), &OperationConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "No A&AI Subtag");
    }

    #[test]
    fn flag_missing() {
        let e = event().with_aai("vserver.vserver-name", "vm-1");
        let err = check(&e, &OperationConfig::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "vserver.is-closed-loop-disabled information missing"
        );
    }

    #[test]
    fn flag_set_accepts_y_and_true() {
        for v in ["true", "TRUE", "y", "Y"] {
            let e = event()
                .with_aai("vserver.is-closed-loop-disabled", v)
                .with_aai("vserver.vserver-name", "vm-1");
            let err = check(&e, &OperationConfig::default()).unwrap_err();
            assert_eq!(err.to_string(), "vserver.is-closed-loop-disabled is set to true");
        }
    }

    #[test]
    fn target_without_value() {
        let e = event().with_aai("vserver.is-closed-loop-disabled", "false");
        let err = check(&e, &OperationConfig::default()).unwrap_err();
        assert_eq!(err, PreconditionFailure::TargetMismatch);
    }

    #[test]
    fn valid_event_passes() {
        let e = event()
            .with_aai("vserver.is-closed-loop-disabled", "false")
            .with_aai("vserver.vserver-name", "vm-1");
        assert!(check(&e, &OperationConfig::default()).is_ok());
    }

    #[test]
    fn custom_flag_key() {
        let config = OperationConfig {
            closed_loop_disabled_key: "generic-vnf.is-closed-loop-disabled".into(),
            ..OperationConfig::default()
        };
        let e = event().with_aai("vserver.vserver-name", "vm-1");
        assert_eq!(
            check(&e, &config).unwrap_err().to_string(),
            "generic-vnf.is-closed-loop-disabled information missing"
        );
    }
}
