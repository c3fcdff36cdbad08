//! # APPC-LCM Actor
//!
//! Lifecycle-management requests to the application controller. One
//! request per sub-target; the response status code is classified by
//! [`AppcLcmClassifier`], except `HealthCheck`, whose verdict is in the
//! response payload.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use remedy_core::TargetType;

use crate::actor::{Actor, RequestContext};
use crate::classify::{AppcLcmClassifier, AppcLcmHealthCheckClassifier, ResponseClassifier};
use crate::error::OperationError;
use crate::message::{OutboundRequest, SubTarget};

/// Recipes in canonical casing. Matching against policies ignores case.
pub const RECIPES: [&str; 9] = [
    "Restart",
    "Rebuild",
    "Migrate",
    "Evacuate",
    "HealthCheck",
    "Reboot",
    "Start",
    "Stop",
    "ConfigModify",
];

/// Recipes that act on the VNF as a whole and never on a single VM.
const VNF_ONLY: [&str; 1] = ["ConfigModify"];

const VSERVER_SELF_LINK: &str = "vserver.selflink";
const IDENTITY_URL: &str = "cloud-region.identity-url";
const TENANT_ID: &str = "tenant.tenant-id";
const IPV4_ADDRESS: &str =
    "vserver.l-interface.l3-interface-ipv4-address-list.l3-inteface-ipv4-address";

// ─── Wire shape ──────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct Wrapper<'a> {
    version: &'static str,
    rpc_name: String,
    correlation_id: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    body: Body<'a>,
}

#[derive(Debug, Serialize)]
struct Body<'a> {
    input: Input<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct Input<'a> {
    common_header: CommonHeader<'a>,
    action: &'static str,
    action_identifiers: BTreeMap<&'static str, &'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct CommonHeader<'a> {
    timestamp: String,
    api_ver: &'static str,
    originator_id: &'a str,
    request_id: String,
    sub_request_id: String,
    flags: BTreeMap<&'static str, String>,
}

// ─── Actor ───────────────────────────────────────────────────────────

/// The APPC-LCM actor.
#[derive(Debug, Clone, Default)]
pub struct AppcLcmActor {
    classifier: AppcLcmClassifier,
    health_check: AppcLcmHealthCheckClassifier,
}

impl AppcLcmActor {
    /// Name as authored in policies.
    pub const NAME: &'static str = "APPC-LCM";

    /// Create the actor.
    pub fn new() -> Self {
        Self::default()
    }

    /// The canonical spelling of a recipe, matched ignoring case.
    pub fn canonical_recipe(recipe: &str) -> Option<&'static str> {
        RECIPES.into_iter().find(|r| r.eq_ignore_ascii_case(recipe))
    }

    /// The rpc name for an action: lower-case, one hyphen between words
    /// (`ConfigModify` → `config-modify`).
    pub fn rpc_name(action: &str) -> String {
        let mut rpc = String::with_capacity(action.len() + 2);
        for (i, c) in action.chars().enumerate() {
            if i > 0 && c.is_ascii_uppercase() {
                rpc.push('-');
            }
            rpc.push(c.to_ascii_lowercase());
        }
        rpc
    }

    fn payload(
        &self,
        ctx: &RequestContext<'_>,
        action: &str,
        target: TargetType,
    ) -> Result<Option<String>, OperationError> {
        let aai = ctx.event.aai.as_ref();
        let attr = |key: &str| aai.and_then(|m| m.get(key)).cloned();

        let mut payload: BTreeMap<String, String> =
            ctx.policy.payload.clone().unwrap_or_default();

        match action {
            "Restart" | "Rebuild" | "Migrate" | "Evacuate" | "Start" | "Stop" => {
                if target == TargetType::Vm {
                    common_payload(&mut payload, &attr, true);
                }
            }
            "Reboot" => {
                if target == TargetType::Vm {
                    common_payload(&mut payload, &attr, false);
                }
                let kind = ctx
                    .policy
                    .payload
                    .as_ref()
                    .and_then(|p| p.get("type"))
                    .ok_or_else(|| {
                        OperationError::Request("Error - reboot payload has no type".into())
                    })?;
                payload.insert("type".into(), kind.to_ascii_uppercase());
            }
            "HealthCheck" => {
                let ip = attr(IPV4_ADDRESS).ok_or_else(|| {
                    OperationError::Request("Error - IPv4 Address not found in the onset".into())
                })?;
                payload.insert("host-ip-address".into(), ip);
            }
            _ => {}
        }

        if payload.is_empty() {
            return Ok(None);
        }
        serde_json::to_string(&payload)
            .map(Some)
            .map_err(|e| OperationError::Request(e.to_string()))
    }
}

fn common_payload(
    payload: &mut BTreeMap<String, String>,
    attr: &impl Fn(&str) -> Option<String>,
    with_tenant: bool,
) {
    if let Some(v) = attr(VSERVER_SELF_LINK) {
        payload.insert("vm-id".into(), v);
    }
    if let Some(v) = attr(IDENTITY_URL) {
        payload.insert("identity-url".into(), v);
    }
    if with_tenant {
        if let Some(v) = attr(TENANT_ID) {
            payload.insert("tenant-id".into(), v);
        }
    }
}

impl Actor for AppcLcmActor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn recipes(&self) -> Vec<String> {
        RECIPES.iter().map(|r| r.to_string()).collect()
    }

    fn supports(&self, recipe: &str, target: Option<TargetType>) -> bool {
        let Some(recipe) = Self::canonical_recipe(recipe) else {
            return false;
        };
        match target {
            None | Some(TargetType::Vnf) => true,
            Some(TargetType::Vm) => !VNF_ONLY.contains(&recipe),
            Some(TargetType::Pnf) => false,
        }
    }

    fn classifier(&self, recipe: &str) -> &dyn ResponseClassifier {
        match Self::canonical_recipe(recipe) {
            Some("HealthCheck") => &self.health_check,
            _ => &self.classifier,
        }
    }

    fn build_request(
        &self,
        ctx: &RequestContext<'_>,
        sub_target: &SubTarget,
    ) -> Result<OutboundRequest, OperationError> {
        let recipe = ctx.policy.recipe.as_deref().unwrap_or_default();
        let action = Self::canonical_recipe(recipe)
            .ok_or_else(|| OperationError::Request("Error - invalid recipe".into()))?;
        let target = ctx
            .policy
            .target
            .as_ref()
            .map(|t| t.target_type)
            .ok_or_else(|| OperationError::MissingTarget(ctx.policy.id.to_string()))?;

        let mut identifiers = BTreeMap::new();
        let vnf_id = sub_target
            .vnf_id
            .as_deref()
            .ok_or_else(|| OperationError::Request("Error - no VNF ID key in the onset".into()))?;
        identifiers.insert("vnf-id", vnf_id);
        match (&sub_target.vserver_id, target) {
            (Some(vserver), _) => {
                identifiers.insert("vserver-id", vserver.as_str());
            }
            (None, TargetType::Vm) => {
                return Err(OperationError::Request(
                    "Error - no VSERVER ID key in the onset".into(),
                ))
            }
            (None, _) => {}
        }

        let mut flags = BTreeMap::new();
        flags.insert("ttl", ctx.config.request_ttl_secs.to_string());

        let wrapper = Wrapper {
            version: "2.0",
            rpc_name: Self::rpc_name(action),
            correlation_id: &sub_target.correlation_id,
            kind: "request",
            body: Body {
                input: Input {
                    common_header: CommonHeader {
                        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                        api_ver: "2.00",
                        originator_id: &ctx.config.originator_id,
                        request_id: ctx.request_id.to_string(),
                        sub_request_id: ctx.attempt.to_string(),
                        flags,
                    },
                    action,
                    action_identifiers: identifiers,
                    payload: self.payload(ctx, action, target)?,
                },
            },
        };
        let body =
            serde_json::to_value(&wrapper).map_err(|e| OperationError::Request(e.to_string()))?;
        Ok(OutboundRequest {
            correlation_id: sub_target.correlation_id.clone(),
            body,
        })
    }
}
