use crate::domain::ports::RemoteProductStore;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    #[default]
    Simple,
    /// Carries SKUs/variants generated after creation.
    Variable,
}

impl ProductKind {
    pub fn has_variants(&self) -> bool {
        *self != ProductKind::Simple
    }
}

/// The marketplace product as seen by gateway sync.
///
/// The product itself lives elsewhere; sync only reads it and updates the
/// per-gateway remote identifiers.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub kind: ProductKind,
    /// Gateway identifier -> remote product identifier.
    #[serde(default)]
    pub integration_ids: BTreeMap<String, String>,
}

impl Product {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ProductKind::Simple,
            integration_ids: BTreeMap::new(),
        }
    }

    pub fn integration_id(&self, gateway: &str) -> Option<&str> {
        self.integration_ids.get(gateway).map(String::as_str)
    }

    pub fn set_integration_id(&mut self, gateway: impl Into<String>, remote_id: impl Into<String>) {
        self.integration_ids.insert(gateway.into(), remote_id.into());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Created { remote_id: String },
    Updated { remote_id: String },
    /// The gateway does not manage remote products.
    Skipped,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySyncResult {
    pub gateway: String,
    pub outcome: SyncOutcome,
}

/// Per-gateway outcomes of one sync call, in the order gateways were attempted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncReport {
    pub product_id: u64,
    pub results: Vec<GatewaySyncResult>,
}

impl SyncReport {
    pub fn new(product_id: u64) -> Self {
        Self {
            product_id,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, gateway: impl Into<String>, outcome: SyncOutcome) {
        self.results.push(GatewaySyncResult {
            gateway: gateway.into(),
            outcome,
        });
    }

    pub fn outcome(&self, gateway: &str) -> Option<&SyncOutcome> {
        self.results
            .iter()
            .find(|r| r.gateway == gateway)
            .map(|r| &r.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results.iter().filter_map(|r| match &r.outcome {
            SyncOutcome::Failed { message } => Some((r.gateway.as_str(), message.as_str())),
            _ => None,
        })
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Writes the remote identifiers confirmed by this sync, one at a time.
    pub async fn persist(&self, store: &dyn RemoteProductStore) -> Result<()> {
        for (gateway, remote_id) in self.remote_ids() {
            store.store(self.product_id, gateway, remote_id).await?;
        }
        Ok(())
    }

    /// Remote identifiers confirmed by this sync, for persisting.
    pub fn remote_ids(&self) -> impl Iterator<Item = (&str, &str)> {
        self.results.iter().filter_map(|r| match &r.outcome {
            SyncOutcome::Created { remote_id } | SyncOutcome::Updated { remote_id } => {
                Some((r.gateway.as_str(), remote_id.as_str()))
            }
            _ => None,
        })
    }
}
