use crate::domain::cart::is_empty_value;
use crate::domain::product::Product;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Configuration of a single gateway, as declared in one configuration file of
/// a payment module.
///
/// Only `name` is required. Unknown keys are preserved in `settings` so that
/// adapters can read gateway-specific options (API keys, sandbox flags, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Display name of the gateway. Also the namespace of its resources.
    pub name: String,
    /// Webhook event name -> handler reference. `null` reads as no events.
    #[serde(default, deserialize_with = "null_as_default")]
    pub events: BTreeMap<String, String>,
    /// Whether products are mirrored in the gateway's remote catalog. Any
    /// non-empty value (`true`, `1`, `"yes"`) turns it on.
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub manage_remote_product: bool,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl GatewayConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: BTreeMap::new(),
            manage_remote_product: false,
            settings: Map::new(),
        }
    }

    pub fn with_remote_products(mut self, enabled: bool) -> Self {
        self.manage_remote_product = enabled;
        self
    }

    pub fn with_event(mut self, event: impl Into<String>, handler: impl Into<String>) -> Self {
        self.events.insert(event.into(), handler.into());
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    /// Reads a configuration value by key, covering both the typed fields and
    /// the free-form settings.
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            "name" => Some(Value::String(self.name.clone())),
            "manage_remote_product" => Some(Value::Bool(self.manage_remote_product)),
            "events" => serde_json::to_value(&self.events).ok(),
            _ => self.settings.get(key).cloned(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_truthy<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(!is_empty_value(&value))
}

/// A gateway configuration file resolved from a module folder.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfigFile {
    /// File basename without extension, used as the gateway identifier.
    pub gateway: String,
    pub config: GatewayConfig,
}

impl GatewayConfigFile {
    pub fn new(gateway: impl Into<String>, config: GatewayConfig) -> Self {
        Self {
            gateway: gateway.into(),
            config,
        }
    }

    /// Configuration namespace the file is published under.
    pub fn namespace(&self) -> String {
        config_namespace(&self.gateway)
    }
}

pub fn config_namespace(gateway: &str) -> String {
    format!("payment_{gateway}")
}

/// In-process adapter for a remote payment gateway.
///
/// Adapters are built once during startup and shared immutably afterwards, so
/// every operation takes `&self`.
#[async_trait]
pub trait GatewayAdapter: Send + Sync {
    /// Identifier the adapter is registered under.
    fn id(&self) -> &str;

    fn config(&self) -> &GatewayConfig;

    fn get_config(&self, key: &str) -> Option<Value> {
        self.config().get(key)
    }

    fn manages_remote_product(&self) -> bool {
        self.config().manage_remote_product
    }

    /// Remote identifier of `product` in this gateway, if one is known.
    fn gateway_integration_id(&self, product: &Product) -> Option<String> {
        product.integration_id(self.id()).map(str::to_string)
    }

    /// Creates the product remotely and returns its remote identifier.
    async fn create_product(&self, product: &Product) -> Result<String>;

    /// Updates the remote representation identified by `remote_id`.
    async fn update_product(&self, product: &Product, remote_id: &str) -> Result<()>;
}

pub type GatewayAdapterBox = Box<dyn GatewayAdapter>;

/// Builds an adapter for a gateway identifier from its configuration.
pub type AdapterFactory =
    Box<dyn Fn(&str, GatewayConfig) -> Result<GatewayAdapterBox> + Send + Sync>;
