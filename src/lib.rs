#![deny(missing_docs)]

//! Core library for the inventory registration service.

/// HTTP routing and REST handlers.
pub mod api;
/// Startup directory preparation and listener binding.
pub mod bootstrap;
/// Command-line and environment configuration.
pub mod config;
/// Generated API documentation.
pub mod docs;
/// Item records, the in-memory store, and the inventory service.
pub mod inventory;
/// Structured logging and tracing setup.
pub mod logging;
/// Inventory activity counters.
pub mod metrics;
/// Filesystem-backed photo storage.
pub mod photos;
