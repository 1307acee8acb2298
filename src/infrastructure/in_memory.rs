use crate::domain::gateway::GatewayConfigFile;
use crate::domain::module::GatewayModule;
use crate::domain::ports::{ConfigSource, ModuleSource, RemoteProductStore};
use crate::error::{HubError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory table of module records.
///
/// Keeps records in insertion order, which is the tie-breaker between modules
/// sharing a load order.
#[derive(Default, Clone)]
pub struct InMemoryModuleSource {
    modules: Arc<RwLock<Vec<GatewayModule>>>,
}

impl InMemoryModuleSource {
    /// Creates a new, empty in-memory module source.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_modules(modules: Vec<GatewayModule>) -> Self {
        Self {
            modules: Arc::new(RwLock::new(modules)),
        }
    }

    pub async fn get(&self, code: &str) -> Option<GatewayModule> {
        let modules = self.modules.read().await;
        modules.iter().find(|m| m.code == code).cloned()
    }
}

#[async_trait]
impl ModuleSource for InMemoryModuleSource {
    async fn payment_modules(&self) -> Result<Vec<GatewayModule>> {
        let modules = self.modules.read().await;
        let mut payment: Vec<GatewayModule> = modules
            .iter()
            .filter(|m| m.is_loadable_payment())
            .cloned()
            .collect();
        payment.sort_by_key(|m| m.load_order);
        Ok(payment)
    }

    async fn save(&self, module: GatewayModule) -> Result<()> {
        let mut modules = self.modules.write().await;
        match modules.iter_mut().find(|m| m.id == module.id) {
            Some(existing) => *existing = module,
            None => modules.push(module),
        }
        Ok(())
    }

    async fn all(&self) -> Result<Vec<GatewayModule>> {
        Ok(self.modules.read().await.clone())
    }
}

/// Gateway configuration files held in memory, keyed by module folder.
#[derive(Default, Clone)]
pub struct InMemoryConfigSource {
    folders: Arc<RwLock<HashMap<String, Vec<GatewayConfigFile>>>>,
}

impl InMemoryConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, folder: impl Into<String>, file: GatewayConfigFile) {
        let mut folders = self.folders.write().await;
        folders.entry(folder.into()).or_default().push(file);
    }
}

#[async_trait]
impl ConfigSource for InMemoryConfigSource {
    async fn load(&self, folder: &str) -> Result<Vec<GatewayConfigFile>> {
        let folders = self.folders.read().await;
        folders.get(folder).cloned().ok_or_else(|| {
            HubError::IoError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no configuration directory for module folder `{folder}`"),
            ))
        })
    }
}

/// A thread-safe in-memory store for remote product identifiers.
#[derive(Default, Clone)]
pub struct InMemoryRemoteProductStore {
    ids: Arc<RwLock<HashMap<u64, BTreeMap<String, String>>>>,
}

impl InMemoryRemoteProductStore {
    /// Creates a new, empty in-memory remote product store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RemoteProductStore for InMemoryRemoteProductStore {
    async fn store(&self, product_id: u64, gateway: &str, remote_id: &str) -> Result<()> {
        let mut ids = self.ids.write().await;
        ids.entry(product_id)
            .or_default()
            .insert(gateway.to_string(), remote_id.to_string());
        Ok(())
    }

    async fn get(&self, product_id: u64, gateway: &str) -> Result<Option<String>> {
        let ids = self.ids.read().await;
        Ok(ids.get(&product_id).and_then(|m| m.get(gateway)).cloned())
    }

    async fn all_for(&self, product_id: u64) -> Result<BTreeMap<String, String>> {
        let ids = self.ids.read().await;
        Ok(ids.get(&product_id).cloned().unwrap_or_default())
    }
}
