//! The order reconciliation engine.
//!
//! A single background task sweeps over every non-terminal order on a fixed cadence, asks the accrual service for a
//! verdict, and commits terminal verdicts to the ledger atomically. One shared schedule drives all orders (rather
//! than one timer per order) so the number of outstanding external calls stays bounded, and a rate-limit response
//! from the service suspends the whole schedule, not just the order that observed it.
mod engine;
mod verdict;

pub use engine::{ReconcileConfig, ReconcileHandle, ReconciliationEngine, SweepOutcome};
pub use verdict::{AccrualVerdict, PollResult, VerdictSource, VerdictStatus};
