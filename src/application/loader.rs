use crate::application::registry::GatewayRegistry;
use crate::application::sync::GatewayProductSync;
use crate::application::webhooks::{WebhookDispatcher, WebhookEventRegistry};
use crate::domain::gateway::{GatewayAdapterBox, GatewayConfig};
use crate::domain::module::{GatewayModule, ModuleState};
use crate::domain::ports::{
    ConfigSourceBox, GatewayModuleDescriptor, ModuleSource, ModuleSourceBox, ResourceRegistrar,
};
use crate::domain::webhook::WebhookEventKey;
use crate::error::{HubError, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What happens to the remaining modules once one fails to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Disable the failing module and load nothing after it.
    #[default]
    HaltRemaining,
    /// Disable the failing module and carry on with the next one.
    IsolateModule,
}

/// Configuration namespaces (`payment_<gateway>`) published by loaded modules.
#[derive(Debug, Default, Clone)]
pub struct ConfigRepository {
    namespaces: BTreeMap<String, GatewayConfig>,
}

impl ConfigRepository {
    pub fn get(&self, namespace: &str) -> Option<&GatewayConfig> {
        self.namespaces.get(namespace)
    }

    pub fn value(&self, namespace: &str, key: &str) -> Option<Value> {
        self.get(namespace).and_then(|config| config.get(key))
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.keys().map(String::as_str)
    }

    fn insert(&mut self, namespace: String, config: GatewayConfig) {
        self.namespaces.insert(namespace, config);
    }
}

/// Final state of one module the loader fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleOutcome {
    pub id: u32,
    pub code: String,
    pub state: ModuleState,
}

/// Final state of every module the loader fetched, in load order.
///
/// Keyed by module id; codes are not required to be unique.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoadReport {
    modules: Vec<ModuleOutcome>,
}

impl LoadReport {
    fn set(&mut self, id: u32, state: ModuleState) {
        if let Some(entry) = self.modules.iter_mut().find(|m| m.id == id) {
            entry.state = state;
        }
    }

    pub fn state(&self, id: u32) -> Option<&ModuleState> {
        self.modules.iter().find(|m| m.id == id).map(|m| &m.state)
    }

    pub fn modules(&self) -> &[ModuleOutcome] {
        &self.modules
    }

    pub fn loaded(&self) -> Vec<&str> {
        self.modules
            .iter()
            .filter(|m| m.state == ModuleState::Loaded)
            .map(|m| m.code.as_str())
            .collect()
    }

    pub fn disabled(&self) -> Vec<(&str, &str)> {
        self.modules
            .iter()
            .filter_map(|m| match &m.state {
                ModuleState::Disabled { reason } => Some((m.code.as_str(), reason.as_str())),
                _ => None,
            })
            .collect()
    }
}

/// Everything the payment modules contributed at startup.
///
/// Frozen once built; share it freely.
#[derive(Clone)]
pub struct PaymentRuntime {
    pub gateways: Arc<GatewayRegistry>,
    pub webhooks: Arc<WebhookEventRegistry>,
    pub configs: Arc<ConfigRepository>,
}

impl PaymentRuntime {
    pub fn product_sync(&self) -> GatewayProductSync {
        GatewayProductSync::new(self.gateways.clone())
    }

    pub fn dispatcher(&self) -> WebhookDispatcher {
        WebhookDispatcher::new(self.webhooks.clone())
    }
}

/// Resource registrar that only records what would be loaded.
pub struct LoggingRegistrar;

impl ResourceRegistrar for LoggingRegistrar {
    fn load_views(&self, namespace: &str, path: &str) -> Result<()> {
        debug!(namespace, path, "views registered");
        Ok(())
    }

    fn load_translations(&self, namespace: &str, path: &str) -> Result<()> {
        debug!(namespace, path, "translations registered");
        Ok(())
    }
}

/// Registrations of one module, applied only once the whole module loaded.
#[derive(Default)]
struct Contribution {
    configs: Vec<(String, GatewayConfig)>,
    events: Vec<(WebhookEventKey, String)>,
    adapters: Vec<GatewayAdapterBox>,
}

/// Boots the payment modules: runs each module's initialization hook, loads
/// its gateway configuration, and registers gateways and webhook events.
///
/// Runs once, before anything is served. Modules load strictly in ascending
/// `load_order`.
pub struct ModuleLoader {
    modules: ModuleSourceBox,
    configs: ConfigSourceBox,
    descriptors: HashMap<String, Box<dyn GatewayModuleDescriptor>>,
    resources: Box<dyn ResourceRegistrar>,
    policy: FailurePolicy,
}

impl ModuleLoader {
    pub fn new(modules: ModuleSourceBox, configs: ConfigSourceBox) -> Self {
        Self {
            modules,
            configs,
            descriptors: HashMap::new(),
            resources: Box::new(LoggingRegistrar),
            policy: FailurePolicy::default(),
        }
    }

    /// Makes the initialization hook named `provider` available to modules.
    pub fn with_descriptor(
        mut self,
        provider: impl Into<String>,
        descriptor: Box<dyn GatewayModuleDescriptor>,
    ) -> Self {
        self.descriptors.insert(provider.into(), descriptor);
        self
    }

    pub fn with_resources(mut self, resources: Box<dyn ResourceRegistrar>) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The module source records are read from and written back to.
    pub fn modules(&self) -> &dyn ModuleSource {
        self.modules.as_ref()
    }

    /// Loads every enabled payment module into `gateways` and fresh webhook and
    /// configuration registries.
    ///
    /// A module that fails is disabled in the module source with the error as
    /// its note; that failure is reported through the [`LoadReport`], not as an
    /// error. Only module source failures are returned as errors.
    pub async fn load_all(
        &self,
        mut gateways: GatewayRegistry,
    ) -> Result<(PaymentRuntime, LoadReport)> {
        let modules = self.modules.payment_modules().await?;
        let mut webhooks = WebhookEventRegistry::new();
        let mut configs = ConfigRepository::default();
        let mut report = LoadReport {
            modules: modules
                .iter()
                .map(|m| ModuleOutcome {
                    id: m.id,
                    code: m.code.clone(),
                    state: ModuleState::Pending,
                })
                .collect(),
        };

        for module in &modules {
            report.set(module.id, ModuleState::Loading);
            info!(module = %module.code, load_order = module.load_order, "loading payment module");

            match self.load_module(module, &gateways).await {
                Ok(contribution) => {
                    for (namespace, config) in contribution.configs {
                        configs.insert(namespace, config);
                    }
                    for (key, handler) in contribution.events {
                        webhooks.register_key(key, handler);
                    }
                    for adapter in contribution.adapters {
                        gateways.insert(adapter);
                    }
                    report.set(module.id, ModuleState::Loaded);
                }
                Err(err) => {
                    let mut reason = err.to_string();
                    if reason.is_empty() {
                        reason = format!("module `{}` failed to load", module.code);
                    }
                    warn!(
                        module = %module.code,
                        error = %reason,
                        "payment module failed to load, disabling it"
                    );

                    let mut disabled = module.clone();
                    disabled.disable(reason.clone());
                    self.modules.save(disabled).await?;
                    report.set(module.id, ModuleState::Disabled { reason });

                    if self.policy == FailurePolicy::HaltRemaining {
                        break;
                    }
                }
            }
        }

        info!(
            gateways = gateways.len(),
            events = webhooks.len(),
            loaded = report.loaded().len(),
            "payment modules loaded"
        );

        let runtime = PaymentRuntime {
            gateways: Arc::new(gateways),
            webhooks: Arc::new(webhooks),
            configs: Arc::new(configs),
        };
        Ok((runtime, report))
    }

    async fn load_module(
        &self,
        module: &GatewayModule,
        gateways: &GatewayRegistry,
    ) -> Result<Contribution> {
        let descriptor = match &module.provider {
            Some(provider) => Some(self.descriptors.get(provider).ok_or_else(|| {
                HubError::module_load(
                    &module.code,
                    format!("provider `{provider}` is not registered"),
                )
            })?),
            None => None,
        };

        if let Some(descriptor) = descriptor {
            descriptor.init(module)?;
        }

        let mut files = self.configs.load(&module.folder).await?;
        if let Some(descriptor) = descriptor {
            files.extend(descriptor.config_namespaces());
        }

        let mut contribution = Contribution::default();
        for file in files {
            let name = &file.config.name;
            self.resources
                .load_views(name, &format!("{name}/resources/views"))?;
            self.resources
                .load_translations(name, &format!("{name}/resources/lang"))?;

            let mut events = file.config.events.clone();
            if let Some(descriptor) = descriptor {
                events.extend(descriptor.declared_events(&file.gateway));
            }
            for (event, handler) in events {
                contribution
                    .events
                    .push((WebhookEventKey::new(&file.gateway, event), handler));
            }

            if gateways.has_factory(&file.gateway) {
                let adapter = gateways.build(&file.gateway, file.config.clone())?;
                contribution.adapters.push(adapter);
            } else {
                warn!(
                    module = %module.code,
                    gateway = %file.gateway,
                    "no adapter available for gateway, registering configuration only"
                );
            }

            debug!(
                module = %module.code,
                namespace = %file.namespace(),
                "gateway configuration loaded"
            );
            contribution.configs.push((file.namespace(), file.config));
        }

        Ok(contribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gateway::GatewayConfigFile;
    use crate::infrastructure::in_memory::{InMemoryConfigSource, InMemoryModuleSource};
    use crate::infrastructure::stub::StubGateway;
    use std::sync::Mutex;

    struct RecordingDescriptor {
        calls: Arc<Mutex<Vec<String>>>,
        fail: bool,
    }

    impl GatewayModuleDescriptor for RecordingDescriptor {
        fn init(&self, module: &GatewayModule) -> Result<()> {
            if self.fail {
                return Err(HubError::module_load(&module.code, "init hook exploded"));
            }
            self.calls.lock().unwrap().push(module.code.clone());
            Ok(())
        }

        fn declared_events(&self, gateway: &str) -> BTreeMap<String, String> {
            BTreeMap::from([("refund".to_string(), format!("{gateway}.RefundJob"))])
        }
    }

    fn stub_registry() -> GatewayRegistry {
        GatewayRegistry::new().with_fallback(Box::new(|gateway: &str, config: GatewayConfig| {
            Ok(Box::new(StubGateway::new(gateway, config)) as GatewayAdapterBox)
        }))
    }

    async fn configs_for(folders: &[(&str, &str)]) -> InMemoryConfigSource {
        let source = InMemoryConfigSource::new();
        for (folder, gateway) in folders {
            let config = GatewayConfig::new(gateway.to_uppercase())
                .with_remote_products(true)
                .with_event("paid", format!("{gateway}.PaidJob"));
            source
                .insert(*folder, GatewayConfigFile::new(*gateway, config))
                .await;
        }
        source
    }

    #[tokio::test]
    async fn test_load_registers_configs_events_and_adapters() {
        let modules =
            InMemoryModuleSource::with_modules(vec![GatewayModule::payment(1, "stripe", 1)]);
        let configs = configs_for(&[("stripe", "stripe")]).await;

        let loader = ModuleLoader::new(Box::new(modules), Box::new(configs));
        let (runtime, report) = loader.load_all(stub_registry()).await.unwrap();

        assert_eq!(report.state(1), Some(&ModuleState::Loaded));
        assert_eq!(runtime.gateways.names(), vec!["stripe"]);
        assert_eq!(
            runtime.webhooks.resolve("stripe", "paid").unwrap().as_str(),
            "stripe.PaidJob"
        );
        assert_eq!(
            runtime.configs.value("payment_stripe", "name"),
            Some(Value::String("STRIPE".into()))
        );
    }

    #[tokio::test]
    async fn test_provider_hook_runs_and_declares_events() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let modules = InMemoryModuleSource::with_modules(vec![
            GatewayModule::payment(1, "paypal", 1).with_provider("PayPalProvider"),
        ]);
        let configs = configs_for(&[("paypal", "paypal")]).await;

        let loader = ModuleLoader::new(Box::new(modules), Box::new(configs)).with_descriptor(
            "PayPalProvider",
            Box::new(RecordingDescriptor {
                calls: calls.clone(),
                fail: false,
            }),
        );
        let (runtime, _) = loader.load_all(stub_registry()).await.unwrap();

        assert_eq!(*calls.lock().unwrap(), vec!["paypal"]);
        assert_eq!(runtime.webhooks.keys(), vec!["paypal.paid", "paypal.refund"]);
    }

    #[tokio::test]
    async fn test_unknown_provider_disables_module() {
        let modules = InMemoryModuleSource::with_modules(vec![
            GatewayModule::payment(1, "paypal", 1).with_provider("Missing"),
        ]);
        let configs = configs_for(&[("paypal", "paypal")]).await;

        let loader = ModuleLoader::new(Box::new(modules.clone()), Box::new(configs));
        let (runtime, report) = loader.load_all(stub_registry()).await.unwrap();

        assert!(matches!(
            report.state(1),
            Some(ModuleState::Disabled { reason }) if reason.contains("Missing")
        ));
        assert!(runtime.gateways.is_empty());
        let saved = modules.get("paypal").await.unwrap();
        assert!(!saved.enabled);
        assert!(saved.notes.unwrap().contains("Missing"));
    }

    #[tokio::test]
    async fn test_failing_module_registers_nothing() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let modules = InMemoryModuleSource::with_modules(vec![
            GatewayModule::payment(1, "stripe", 1).with_provider("Broken"),
        ]);
        let configs = configs_for(&[("stripe", "stripe")]).await;

        let loader = ModuleLoader::new(Box::new(modules), Box::new(configs)).with_descriptor(
            "Broken",
            Box::new(RecordingDescriptor { calls, fail: true }),
        );
        let (runtime, report) = loader.load_all(stub_registry()).await.unwrap();

        assert_eq!(report.disabled().len(), 1);
        assert!(runtime.webhooks.is_empty());
        assert_eq!(runtime.configs.namespaces().count(), 0);
    }

    #[tokio::test]
    async fn test_gateway_without_factory_keeps_config_only() {
        let modules =
            InMemoryModuleSource::with_modules(vec![GatewayModule::payment(1, "cash", 1)]);
        let configs = configs_for(&[("cash", "cash")]).await;

        let loader = ModuleLoader::new(Box::new(modules), Box::new(configs));
        let (runtime, report) = loader.load_all(GatewayRegistry::new()).await.unwrap();

        assert_eq!(report.loaded(), vec!["cash"]);
        assert!(runtime.gateways.is_empty());
        assert!(runtime.configs.get("payment_cash").is_some());
        assert!(runtime.webhooks.resolve("cash", "paid").is_ok());
    }
}
