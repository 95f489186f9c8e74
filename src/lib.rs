#![deny(missing_docs)]

//! Core library for the student records service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Request counters exposed over HTTP.
pub mod metrics;
/// In-memory student record storage.
pub mod store;
/// Profile summaries generated by an external text-generation service.
pub mod summarization;
