use crate::domain::gateway::{GatewayAdapter, GatewayConfig};
use crate::domain::product::Product;
use crate::error::{HubError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Gateway adapter that never leaves the process.
///
/// Remote identifiers are derived as `<gateway>-<product id>`. Used by the
/// binary for gateways without a real integration, and by tests.
pub struct StubGateway {
    id: String,
    config: GatewayConfig,
    failure: Option<String>,
    creates: AtomicUsize,
    updates: AtomicUsize,
}

impl StubGateway {
    pub fn new(id: impl Into<String>, config: GatewayConfig) -> Self {
        Self {
            id: id.into(),
            config,
            failure: None,
            creates: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }

    /// Makes every create/update call fail with `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(HubError::gateway(&self.id, message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl GatewayAdapter for StubGateway {
    fn id(&self) -> &str {
        &self.id
    }

    fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn create_product(&self, product: &Product) -> Result<String> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(format!("{}-{}", self.id, product.id))
    }

    async fn update_product(&self, _product: &Product, _remote_id: &str) -> Result<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.check()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_counts_and_fails() {
        let product = Product::new(3, "Pen");

        let ok = StubGateway::new("a", GatewayConfig::new("A"));
        assert_eq!(ok.create_product(&product).await.unwrap(), "a-3");
        ok.update_product(&product, "a-3").await.unwrap();
        assert_eq!((ok.creates(), ok.updates()), (1, 1));

        let bad = StubGateway::new("b", GatewayConfig::new("B")).failing("card declined");
        let err = bad.create_product(&product).await.unwrap_err();
        assert_eq!(err.to_string(), "Gateway `b` failed: card declined");
        assert_eq!(bad.creates(), 1);
    }
}
