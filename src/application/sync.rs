use crate::application::registry::GatewayRegistry;
use crate::domain::gateway::GatewayAdapter;
use crate::domain::product::{Product, SyncOutcome, SyncReport};
use crate::error::{HubError, Result, SyncFailure};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Mirrors products into the remote catalogs of the registered gateways.
///
/// Gateways are attempted one at a time in registry order. A failing gateway
/// never stops the remaining ones; failures are collected and reported
/// together once every gateway was attempted.
pub struct GatewayProductSync {
    gateways: Arc<GatewayRegistry>,
    timeout: Option<Duration>,
}

impl GatewayProductSync {
    pub fn new(gateways: Arc<GatewayRegistry>) -> Self {
        Self {
            gateways,
            timeout: None,
        }
    }

    /// Bounds every individual gateway call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Creates or updates `product` in one gateway, or in all of them when
    /// `gateway` is `None`.
    ///
    /// New remote identifiers are written into `product`; persisting them is
    /// up to the caller (see [`SyncReport::persist`]).
    ///
    /// # Errors
    ///
    /// * `ValidationError` if `gateway` is given but blank.
    /// * `GatewayNotFound` if `gateway` names an unregistered gateway.
    /// * `SyncFailed` if at least one gateway failed; it carries the full report.
    pub async fn sync(&self, product: &mut Product, gateway: Option<&str>) -> Result<SyncReport> {
        let targets = match gateway {
            Some(name) if name.trim().is_empty() => {
                return Err(HubError::ValidationError(
                    "sync target gateway must not be empty".to_string(),
                ));
            }
            Some(name) => vec![self.gateways.resolve(name)?],
            None => self.gateways.all().to_vec(),
        };

        let mut report = SyncReport::new(product.id);
        for adapter in targets {
            let outcome = self.sync_one(adapter.as_ref(), product).await;
            if let SyncOutcome::Created { remote_id } = &outcome {
                product.set_integration_id(adapter.id(), remote_id.clone());
            }
            report.push(adapter.id(), outcome);
        }

        if report.has_failures() {
            let message = report
                .failures()
                .map(|(gateway, message)| format!("{gateway}: {message}"))
                .collect::<Vec<_>>()
                .join("; ");
            warn!(product = product.id, %message, "product sync finished with failures");
            return Err(HubError::SyncFailed(Box::new(SyncFailure { message, report })));
        }

        info!(product = product.id, gateways = report.results.len(), "product synced");
        Ok(report)
    }

    async fn sync_one(&self, adapter: &dyn GatewayAdapter, product: &Product) -> SyncOutcome {
        if !adapter.manages_remote_product() {
            debug!(gateway = adapter.id(), "gateway does not manage remote products, skipping");
            return SyncOutcome::Skipped;
        }

        let result = match adapter.gateway_integration_id(product) {
            Some(remote_id) => {
                let updated = self
                    .bounded(adapter.id(), adapter.update_product(product, &remote_id))
                    .await;
                updated.map(|()| SyncOutcome::Updated { remote_id })
            }
            None => self
                .bounded(adapter.id(), adapter.create_product(product))
                .await
                .map(|remote_id| SyncOutcome::Created { remote_id }),
        };

        result.unwrap_or_else(|err| {
            warn!(
                gateway = adapter.id(),
                product = product.id,
                error = %err,
                "gateway sync failed"
            );
            SyncOutcome::Failed {
                message: failure_message(err),
            }
        })
    }

    async fn bounded<T>(&self, gateway: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| HubError::TimeoutError {
                    gateway: gateway.to_string(),
                })?,
            None => call.await,
        }
    }
}

fn failure_message(err: HubError) -> String {
    match err {
        HubError::GatewayOperationError { message, .. } => message,
        other => other.to_string(),
    }
}
