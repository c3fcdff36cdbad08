//! # Remediation Targets
//!
//! The scope a policy's remote action applies to. A VM-scoped action has
//! exactly one sub-target; a VNF-scoped action fans out to every VM of
//! the VNF; a PNF-scoped action addresses the physical function itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RemedyError;

/// Kind of network function an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetType {
    /// A single virtual machine.
    Vm,
    /// A virtual network function, made of one or more VMs.
    Vnf,
    /// A physical network function.
    Pnf,
}

impl TargetType {
    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vm => "VM",
            Self::Vnf => "VNF",
            Self::Pnf => "PNF",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = RemedyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "VM" => Ok(Self::Vm),
            "VNF" => Ok(Self::Vnf),
            "PNF" => Ok(Self::Pnf),
            _ => Err(RemedyError::UnknownTargetType(s.to_string())),
        }
    }
}

/// Target of a policy: its type plus an optional catalog resource id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Kind of network function.
    #[serde(rename = "type")]
    pub target_type: TargetType,
    /// Catalog resource the target is scoped to, if any.
    #[serde(default, rename = "resourceID", skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

impl Target {
    /// A target of the given type with no resource scoping.
    pub fn new(target_type: TargetType) -> Self {
        Self {
            target_type,
            resource_id: None,
        }
    }
}

impl From<TargetType> for Target {
    fn from(t: TargetType) -> Self {
        Self::new(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_type_parse_is_case_insensitive() {
        assert_eq!("vnf".parse::<TargetType>().unwrap(), TargetType::Vnf);
        assert!("VFC".parse::<TargetType>().is_err());
    }

    #[test]
    fn target_yaml_shape() {
        let t: Target = serde_yaml::from_str("type: VM\n").unwrap();
        assert_eq!(t, Target::new(TargetType::Vm));
        let yaml = serde_yaml::to_string(&Target::new(TargetType::Pnf)).unwrap();
        assert_eq!(yaml.trim(), "type: PNF");
    }
}
