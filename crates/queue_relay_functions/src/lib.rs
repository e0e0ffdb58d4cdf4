//! Azure-oriented adapters, handlers and producers for the queue relay.
//!
//! This crate owns runtime integration details (the custom handler host,
//! queue sends and console-facing producers) on top of the contract,
//! encoding and fixture primitives in `queue_relay_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod host;
pub mod producers;
pub mod telemetry;
