//! Application layer wiring gateway modules, adapters and webhook events together.
//!
//! `ModuleLoader` runs once at startup and produces a `PaymentRuntime`: the
//! frozen `GatewayRegistry`, `WebhookEventRegistry` and configuration
//! namespaces. `GatewayProductSync` and `WebhookDispatcher` read from it.

pub mod loader;
pub mod registry;
pub mod sync;
pub mod webhooks;
