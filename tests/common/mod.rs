#![allow(dead_code)]

use async_trait::async_trait;
use payhub::domain::gateway::{GatewayAdapter, GatewayConfig};
use payhub::domain::product::Product;
use payhub::error::{HubError, Result};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Call counters shared between a test and the adapter it registered.
#[derive(Default, Clone)]
pub struct Calls {
    creates: Arc<AtomicUsize>,
    updates: Arc<AtomicUsize>,
}

impl Calls {
    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

pub struct RecordingGateway {
    id: String,
    config: GatewayConfig,
    calls: Calls,
    failure: Option<String>,
    delay: Option<Duration>,
}

impl RecordingGateway {
    pub fn managed(id: &str) -> (Self, Calls) {
        Self::with_config(id, GatewayConfig::new(id).with_remote_products(true))
    }

    pub fn unmanaged(id: &str) -> (Self, Calls) {
        Self::with_config(id, GatewayConfig::new(id))
    }

    fn with_config(id: &str, config: GatewayConfig) -> (Self, Calls) {
        let calls = Calls::default();
        let gateway = Self {
            id: id.to_string(),
            config,
            calls: calls.clone(),
            failure: None,
            delay: None,
        };
        (gateway, calls)
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn outcome(&self) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.failure {
            Some(message) => Err(HubError::gateway(&self.id, message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GatewayAdapter for RecordingGateway {
    fn id(&self) -> &str {
        &self.id
    }

    fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn create_product(&self, product: &Product) -> Result<String> {
        self.calls.creates.fetch_add(1, Ordering::SeqCst);
        self.outcome().await?;
        Ok(format!("{}_{}", self.id, product.id))
    }

    async fn update_product(&self, _product: &Product, _remote_id: &str) -> Result<()> {
        self.calls.updates.fetch_add(1, Ordering::SeqCst);
        self.outcome().await
    }
}

pub const MODULES_HEADER: &str = "id,type,enabled,installed,load_order,provider,folder,code,notes";

/// Writes `<root>/<folder>/config/<gateway>.json`.
pub fn write_gateway_config(root: &Path, folder: &str, gateway: &str, json: &str) {
    let dir = root.join(folder).join("config");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{gateway}.json")), json).unwrap();
}

/// Writes a module table with the given data rows.
pub fn write_modules_csv(path: &Path, rows: &[&str]) {
    let mut content = String::from(MODULES_HEADER);
    content.push('\n');
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(path, content).unwrap();
}
