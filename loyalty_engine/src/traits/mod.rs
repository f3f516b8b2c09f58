//! The traits that a storage backend must implement to act as the ledger for the loyalty points gateway.
//!
//! The engine never talks to a database directly; everything goes through these traits so that the API layer, the
//! reconciliation engine and the endpoint tests can all run against the same contract.
mod auth_management;
mod ledger;

pub use auth_management::{AuthApiError, AuthManagement};
pub use ledger::{BalanceManagement, LedgerError, OrderManagement};
