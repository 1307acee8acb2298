use crate::domain::gateway::{AdapterFactory, GatewayAdapter, GatewayAdapterBox, GatewayConfig};
use crate::error::{HubError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// The configured payment-gateway adapters of this process.
///
/// Populated during startup and shared behind an `Arc` afterwards, so lookups
/// never lock. Adapters keep the position of their first registration;
/// registering a name again replaces the adapter in place.
#[derive(Default)]
pub struct GatewayRegistry {
    adapters: Vec<Arc<dyn GatewayAdapter>>,
    index: HashMap<String, usize>,
    factories: HashMap<String, AdapterFactory>,
    fallback: Option<AdapterFactory>,
}

impl GatewayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the factory used to build adapters for `gateway`.
    pub fn with_factory(mut self, gateway: impl Into<String>, factory: AdapterFactory) -> Self {
        self.factories.insert(gateway.into(), factory);
        self
    }

    /// Adds the factory used for gateways without a dedicated one.
    pub fn with_fallback(mut self, factory: AdapterFactory) -> Self {
        self.fallback = Some(factory);
        self
    }

    pub fn has_factory(&self, gateway: &str) -> bool {
        self.factories.contains_key(gateway) || self.fallback.is_some()
    }

    /// Builds an adapter for `gateway` without registering it.
    pub fn build(&self, gateway: &str, config: GatewayConfig) -> Result<GatewayAdapterBox> {
        let factory = self
            .factories
            .get(gateway)
            .or(self.fallback.as_ref())
            .ok_or_else(|| HubError::NoAdapterFactory(gateway.to_string()))?;
        factory(gateway, config)
    }

    /// Builds an adapter for `gateway` from its configuration and registers it.
    pub fn register(
        &mut self,
        gateway: &str,
        config: GatewayConfig,
    ) -> Result<Arc<dyn GatewayAdapter>> {
        let adapter = self.build(gateway, config)?;
        Ok(self.insert(adapter))
    }

    /// Registers an already built adapter under its own identifier.
    pub fn insert(&mut self, adapter: GatewayAdapterBox) -> Arc<dyn GatewayAdapter> {
        let adapter: Arc<dyn GatewayAdapter> = Arc::from(adapter);
        let id = adapter.id().to_string();
        match self.index.get(&id) {
            Some(&position) => self.adapters[position] = adapter.clone(),
            None => {
                self.index.insert(id, self.adapters.len());
                self.adapters.push(adapter.clone());
            }
        }
        adapter
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn GatewayAdapter>> {
        self.index
            .get(name)
            .map(|&position| self.adapters[position].clone())
            .ok_or_else(|| HubError::GatewayNotFound(name.to_string()))
    }

    pub fn all(&self) -> &[Arc<dyn GatewayAdapter>] {
        &self.adapters
    }

    pub fn names(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.id().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
