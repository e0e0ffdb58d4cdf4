//! Shared queue relay primitives.
//!
//! This crate owns the invocation envelope, transport encodings, binding
//! manifests and sample payload generation. The Azure SDK, the HTTP host and
//! console output live in `queue_relay_functions`.

pub mod bindings;
pub mod contract;
pub mod encoding;
pub mod error;
pub mod fixtures;
pub mod storage_keys;

pub use error::RelayError;
