//! Operation configuration.
//!
//! Inventory attribute keys and request header defaults. Defaults match the
//! attribute names emitted by the analytics collectors; override via
//! environment variables or explicit construction.

use crate::error::ConfigError;

/// Attribute keys and request defaults used by every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationConfig {
    /// Attribute that disables closed-loop action on a VM.
    /// Default: `vserver.is-closed-loop-disabled`.
    pub closed_loop_disabled_key: String,
    /// Attribute carrying the VNF id. Default: `generic-vnf.vnf-id`.
    pub vnf_id_key: String,
    /// Attribute carrying the VNF name. Default: `generic-vnf.vnf-name`.
    pub vnf_name_key: String,
    /// Attribute carrying the VM id. Default: `vserver.vserver-id`.
    pub vserver_id_key: String,
    /// Time-to-live flag sent with each request, in seconds. Default: 600.
    pub request_ttl_secs: u32,
    /// Originator id sent with each request. Default: `POLICY`.
    pub originator_id: String,
}

impl Default for OperationConfig {
    fn default() -> Self {
        Self {
            closed_loop_disabled_key: "vserver.is-closed-loop-disabled".to_string(),
            vnf_id_key: "generic-vnf.vnf-id".to_string(),
            vnf_name_key: "generic-vnf.vnf-name".to_string(),
            vserver_id_key: "vserver.vserver-id".to_string(),
            request_ttl_secs: 600,
            originator_id: "POLICY".to_string(),
        }
    }
}

impl OperationConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `REMEDY_CLOSED_LOOP_DISABLED_KEY` (default: `vserver.is-closed-loop-disabled`)
    /// - `REMEDY_REQUEST_TTL_SECS` (default: 600)
    /// - `REMEDY_ORIGINATOR_ID` (default: `POLICY`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(key) = lookup("REMEDY_CLOSED_LOOP_DISABLED_KEY") {
            config.closed_loop_disabled_key = key;
        }
        if let Some(raw) = lookup("REMEDY_REQUEST_TTL_SECS") {
            config.request_ttl_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "REMEDY_REQUEST_TTL_SECS".to_string(),
                value: raw.clone(),
            })?;
        }
        if let Some(id) = lookup("REMEDY_ORIGINATOR_ID") {
            config.originator_id = id;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        let cfg = OperationConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, OperationConfig::default());
        assert_eq!(cfg.request_ttl_secs, 600);
        assert_eq!(cfg.originator_id, "POLICY");
    }

    #[test]
    fn overrides_apply() {
        let vars: HashMap<&str, &str> = [
            ("REMEDY_REQUEST_TTL_SECS", "120"),
            ("REMEDY_ORIGINATOR_ID", "REMEDY"),
        ]
        .into_iter()
        .collect();
        let cfg = OperationConfig::from_lookup(|v| vars.get(v).map(|s| s.to_string())).unwrap();
        assert_eq!(cfg.request_ttl_secs, 120);
        assert_eq!(cfg.originator_id, "REMEDY");
        assert_eq!(cfg.vnf_id_key, "generic-vnf.vnf-id");
    }

    #[test]
    fn bad_ttl_is_rejected() {
        let err = OperationConfig::from_lookup(|v| {
            (v == "REMEDY_REQUEST_TTL_SECS").then(|| "ten minutes".to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("REMEDY_REQUEST_TTL_SECS"));
    }
}
