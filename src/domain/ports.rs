use super::gateway::GatewayConfigFile;
use super::module::GatewayModule;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Persistent module records.
#[async_trait]
pub trait ModuleSource: Send + Sync {
    /// Enabled, installed payment modules ordered by `load_order` ascending.
    /// Modules sharing a load order keep their source order.
    async fn payment_modules(&self) -> Result<Vec<GatewayModule>>;
    async fn save(&self, module: GatewayModule) -> Result<()>;
    async fn all(&self) -> Result<Vec<GatewayModule>>;
}

/// Gateway configuration files of a module folder.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn load(&self, folder: &str) -> Result<Vec<GatewayConfigFile>>;
}

/// Persists product <-> remote gateway identifier associations.
#[async_trait]
pub trait RemoteProductStore: Send + Sync {
    async fn store(&self, product_id: u64, gateway: &str, remote_id: &str) -> Result<()>;
    async fn get(&self, product_id: u64, gateway: &str) -> Result<Option<String>>;
    async fn all_for(&self, product_id: u64) -> Result<BTreeMap<String, String>>;
}

/// Initialization hook a payment module declares through its `provider` field.
pub trait GatewayModuleDescriptor: Send + Sync {
    fn init(&self, module: &GatewayModule) -> Result<()>;

    /// Configuration compiled into the module, in addition to its config files.
    fn config_namespaces(&self) -> Vec<GatewayConfigFile> {
        Vec::new()
    }

    /// Extra event name -> handler reference pairs for `gateway`.
    fn declared_events(&self, _gateway: &str) -> BTreeMap<String, String> {
        BTreeMap::new()
    }
}

/// Receives the view and translation resources of each loaded gateway.
pub trait ResourceRegistrar: Send + Sync {
    fn load_views(&self, namespace: &str, path: &str) -> Result<()>;
    fn load_translations(&self, namespace: &str, path: &str) -> Result<()>;
}

pub type ModuleSourceBox = Box<dyn ModuleSource>;
pub type ConfigSourceBox = Box<dyn ConfigSource>;
pub type RemoteProductStoreBox = Box<dyn RemoteProductStore>;
pub type ModuleSourceFactory = Box<dyn Fn() -> ModuleSourceBox + Send + Sync>;
