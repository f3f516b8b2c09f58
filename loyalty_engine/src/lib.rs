//! Loyalty Points Engine
//!
//! The engine owns the full lifecycle of loyalty orders: accepting uploads, reconciling them against the external
//! accrual scoring service, and keeping the balance arithmetic consistent with what has actually been confirmed.
//! It is transport-agnostic; the HTTP server crate is a thin shell over the APIs exported here.
//!
//! The crate is divided into three main sections:
//! 1. Database management and control ([`mod@traits`] and the SQLite backend). You should never need to access the
//!    database directly; use the public API layer instead. The exception is the data types used in the database,
//!    which are defined in the `db_types` module and are public.
//! 2. The public API layer ([`OrderFlowApi`], [`AccountApi`], [`AuthApi`]). This is where the domain rules live:
//!    order-number validation, withdrawal guards and credential handling.
//! 3. The reconciliation engine ([`mod@reconciliation`]). A single background sweep drives every non-terminal order
//!    towards its final verdict, honouring the accrual service's backpressure signal globally.
mod lpe_api;
#[cfg(feature = "sqlite")]
mod sqlite;

pub mod db_types;
pub mod helpers;
pub mod reconciliation;
pub mod traits;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

pub use lpe_api::{
    accounts_api::AccountApi,
    auth_api::AuthApi,
    errors::{OrderFlowError, WithdrawError},
    order_flow_api::{OrderFlowApi, SubmitOutcome},
};
