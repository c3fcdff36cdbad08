//! # Inventory Resolver
//!
//! The external collaborator that knows which VMs make up a VNF. Calls are
//! synchronous and may fail; a failure aborts the operation before send.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use crate::error::InventoryError;

/// Resolves VNF membership and event attribute values.
pub trait InventoryResolver: Send + Sync {
    /// VM (vserver) ids of every instance belonging to the VNF.
    fn vnf_members(&self, vnf_id: &str) -> Result<Vec<String>, InventoryError>;

    /// Value of one attribute from an event's attribute map.
    fn attribute<'a>(&self, aai: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
        aai.get(key).map(String::as_str)
    }
}

/// In-memory inventory, populated by the caller.
#[derive(Debug, Default)]
pub struct StaticInventory {
    vnfs: RwLock<HashMap<String, Vec<String>>>,
}

impl StaticInventory {
    /// An empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: register a VNF and its VM ids.
    pub fn with_vnf<I, S>(self, vnf_id: impl Into<String>, vservers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert_vnf(vnf_id, vservers);
        self
    }

    /// Register or replace a VNF and its VM ids.
    pub fn insert_vnf<I, S>(&self, vnf_id: impl Into<String>, vservers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vnfs.write().insert(
            vnf_id.into(),
            vservers.into_iter().map(Into::into).collect(),
        );
    }
}

impl InventoryResolver for StaticInventory {
    fn vnf_members(&self, vnf_id: &str) -> Result<Vec<String>, InventoryError> {
        let vnfs = self.vnfs.read();
        let members = vnfs
            .get(vnf_id)
            .ok_or_else(|| InventoryError::UnknownVnf(vnf_id.to_string()))?;
        if members.is_empty() {
            return Err(InventoryError::EmptyVnf(vnf_id.to_string()));
        }
        Ok(members.clone())
    }
}
