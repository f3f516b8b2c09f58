//! # Loyalty Points Gateway server
//!
//! This crate hosts the HTTP shell around the loyalty engine. It is responsible for:
//! * serving the user-facing API (registration, login, order upload, balances, withdrawals),
//! * translating engine errors into HTTP status codes,
//! * running the background reconciliation worker against the external accrual service.
//!
//! ## Configuration
//! The server is configured via `LPG_*` environment variables. See [config](config/index.html) for details.
pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod reconcile_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
