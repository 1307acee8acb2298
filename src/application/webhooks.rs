use crate::domain::webhook::{HandlerRef, WebhookEventKey, WebhookHandler};
use crate::error::{HubError, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Maps `(gateway, event)` pairs to handler references.
///
/// Written only while modules load; a later registration of the same key
/// replaces the earlier handler.
#[derive(Debug, Default, Clone)]
pub struct WebhookEventRegistry {
    events: BTreeMap<WebhookEventKey, HandlerRef>,
}

impl WebhookEventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_event(
        &mut self,
        gateway: impl Into<String>,
        event: impl Into<String>,
        handler: impl Into<HandlerRef>,
    ) {
        self.register_key(WebhookEventKey::new(gateway, event), handler);
    }

    pub fn register_key(&mut self, key: WebhookEventKey, handler: impl Into<HandlerRef>) {
        let handler = handler.into();
        debug!(event = %key, handler = %handler, "registering webhook event");
        if let Some(previous) = self.events.insert(key.clone(), handler) {
            debug!(event = %key, previous = %previous, "webhook handler replaced");
        }
    }

    pub fn resolve(&self, gateway: &str, event: &str) -> Result<&HandlerRef> {
        let key = WebhookEventKey::new(gateway, event);
        match self.events.get(&key) {
            Some(handler) => Ok(handler),
            None => Err(HubError::UnregisteredEvent(key)),
        }
    }

    /// Registered keys with their handlers, sorted by key.
    pub fn entries(&self) -> impl Iterator<Item = (&WebhookEventKey, &HandlerRef)> {
        self.events.iter()
    }

    pub fn keys(&self) -> Vec<String> {
        self.events.keys().map(|k| k.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Routes delivered webhook payloads to handler implementations.
///
/// Lookup misses come back as errors for the delivery pipeline to report;
/// nothing here panics on unknown input.
pub struct WebhookDispatcher {
    events: Arc<WebhookEventRegistry>,
    handlers: HashMap<HandlerRef, Arc<dyn WebhookHandler>>,
}

impl WebhookDispatcher {
    pub fn new(events: Arc<WebhookEventRegistry>) -> Self {
        Self {
            events,
            handlers: HashMap::new(),
        }
    }

    pub fn bind(
        mut self,
        handler: impl Into<HandlerRef>,
        implementation: Arc<dyn WebhookHandler>,
    ) -> Self {
        self.handlers.insert(handler.into(), implementation);
        self
    }

    pub async fn dispatch(&self, gateway: &str, event: &str, payload: &Value) -> Result<()> {
        let handler_ref = self.events.resolve(gateway, event).inspect_err(|err| {
            warn!(gateway, event, error = %err, "dropping webhook for unregistered event");
        })?;
        let handler = self
            .handlers
            .get(handler_ref)
            .ok_or_else(|| HubError::HandlerNotBound(handler_ref.to_string()))?;

        let key = WebhookEventKey::new(gateway, event);
        debug!(event = %key, handler = %handler_ref, "dispatching webhook");
        handler.handle(&key, payload).await
    }
}
