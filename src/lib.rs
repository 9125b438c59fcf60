//! Market relay is a local CORS relay and static file server.
//!
//! It serves the browser tool's assets from a directory and forwards two
//! market API calls (`GET /api/market/item/{id}` and
//! `POST /api/market/prices/bulk`) to a single upstream host. Every
//! response carries permissive CORS headers so the page can read the
//! upstream's JSON.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`config`] -- Validated runtime configuration built from the CLI.
//! - [`error`] -- Process-level error type using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`relay`] -- Request classification, upstream forwarding, outcome
//!   mapping, and CORS headers.
//! - [`run`] -- Startup and serve loop.
//! - [`server`] -- Axum router, shared state, HTTP client, and graceful
//!   shutdown.

// Binary crate - public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod relay;
pub mod run;
pub mod server;
