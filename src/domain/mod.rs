//! Domain types and the ports the application layer depends on.

pub mod cart;
pub mod gateway;
pub mod module;
pub mod ports;
pub mod product;
pub mod webhook;
