use crate::error::{HubError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Identifies an inbound gateway notification: `<gateway>.<event>`.
///
/// Event names may themselves contain dots (`invoice.payment_failed`), so the
/// gateway is everything before the first dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WebhookEventKey {
    pub gateway: String,
    pub event: String,
}

impl WebhookEventKey {
    pub fn new(gateway: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            gateway: gateway.into(),
            event: event.into(),
        }
    }
}

impl fmt::Display for WebhookEventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.gateway, self.event)
    }
}

impl FromStr for WebhookEventKey {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('.') {
            Some((gateway, event)) if !gateway.is_empty() && !event.is_empty() => {
                Ok(Self::new(gateway, event))
            }
            _ => Err(HubError::ValidationError(format!(
                "webhook event key `{s}` must look like `<gateway>.<event>`"
            ))),
        }
    }
}

/// Opaque reference to the job/handler that processes an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerRef(pub String);

impl HandlerRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HandlerRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for HandlerRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Processes one delivered webhook payload.
#[async_trait]
pub trait WebhookHandler: Send + Sync {
    async fn handle(&self, key: &WebhookEventKey, payload: &Value) -> Result<()>;
}
