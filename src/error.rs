use crate::domain::product::SyncReport;
use crate::domain::webhook::WebhookEventKey;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("RocksDB error: {0}")]
    RocksDbError(#[from] rocksdb::Error),
    #[error("Invalid configuration file {}: {reason}", path.display())]
    ConfigError { path: PathBuf, reason: String },
    #[error("Module `{module}` failed to load: {reason}")]
    ModuleLoadError { module: String, reason: String },
    #[error("Gateway `{gateway}` failed: {message}")]
    GatewayOperationError { gateway: String, message: String },
    #[error("Gateway `{gateway}` timed out")]
    TimeoutError { gateway: String },
    #[error("{0}")]
    SyncFailed(Box<SyncFailure>),
    #[error("No handler registered for webhook event `{0}`")]
    UnregisteredEvent(WebhookEventKey),
    #[error("Handler `{0}` is registered but has no implementation bound")]
    HandlerNotBound(String),
    #[error("Gateway `{0}` is not registered")]
    GatewayNotFound(String),
    #[error("No adapter factory available for gateway `{0}`")]
    NoAdapterFactory(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid price: {0}")]
    InvalidPrice(String),
    #[error("Invalid taxable value: {0}")]
    InvalidTaxable(String),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

/// Aggregated result of a product sync where at least one gateway failed.
///
/// Carries the complete report so callers can still record the gateways that
/// succeeded.
#[derive(Debug)]
pub struct SyncFailure {
    pub message: String,
    pub report: SyncReport,
}

impl std::fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Product sync failed: {}", self.message)
    }
}

impl HubError {
    pub fn gateway(gateway: impl Into<String>, message: impl ToString) -> Self {
        Self::GatewayOperationError {
            gateway: gateway.into(),
            message: message.to_string(),
        }
    }

    pub fn module_load(module: impl Into<String>, reason: impl ToString) -> Self {
        Self::ModuleLoadError {
            module: module.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HubError>;
