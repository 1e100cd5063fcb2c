//! HTTP surface for subhound.
//!
//! The binary in `main.rs` only wires configuration, logging and shutdown;
//! everything routable lives here so integration tests can drive the router
//! in-process.

pub mod api;
pub mod metrics;
pub mod state;
