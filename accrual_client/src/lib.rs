//! Client for the external accrual scoring service.
//!
//! The accrual service is a read-only HTTP endpoint addressed by order number. It either knows a verdict for the
//! order, has not registered the order yet, or is shedding load. This crate performs exactly one outbound request per
//! call and maps every response shape onto [`PollOutcome`]; retry policy belongs to the caller, because a rate-limit
//! signal must suspend *all* polling, not just the request that observed it.

mod api;
mod config;
mod data_objects;
mod error;

pub use api::AccrualApi;
pub use config::AccrualConfig;
pub use data_objects::{AccrualOrderStatus, OrderVerdict, PollOutcome};
pub use error::AccrualApiError;
