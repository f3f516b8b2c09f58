use std::{fmt::Display, time::Duration};

use lpg_common::Points;

use crate::db_types::{OrderNumber, OrderStatus};

/// The states the accrual service can report for an order. Only `Invalid` and `Processed` are final; the other two
/// mean "ask again later".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}

impl VerdictStatus {
    /// The terminal order status this verdict maps to, or `None` while the service is still working.
    pub fn final_order_status(&self) -> Option<OrderStatus> {
        match self {
            VerdictStatus::Invalid => Some(OrderStatus::Invalid),
            VerdictStatus::Processed => Some(OrderStatus::Processed),
            VerdictStatus::Registered | VerdictStatus::Processing => None,
        }
    }
}

impl Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerdictStatus::Registered => write!(f, "REGISTERED"),
            VerdictStatus::Processing => write!(f, "PROCESSING"),
            VerdictStatus::Invalid => write!(f, "INVALID"),
            VerdictStatus::Processed => write!(f, "PROCESSED"),
        }
    }
}

/// One verdict for one order, as reported by a single poll.
#[derive(Debug, Clone, PartialEq)]
pub struct AccrualVerdict {
    pub status: VerdictStatus,
    /// Awarded points; only populated when `status` is `Processed`.
    pub accrual: Option<Points>,
}

/// Everything a single poll of the verdict source can tell the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum PollResult {
    Verdict(AccrualVerdict),
    /// The service has not registered the order yet. Not an error; retried on the next sweep.
    NotRegistered,
    /// The service asked us to back off. Suspends the entire schedule for the given duration.
    RateLimited(Duration),
    /// Transport failure, deadline overrun or malformed response. Retried on the next sweep.
    Unavailable,
}

/// Where verdicts come from. The production implementation wraps the accrual service HTTP client; tests script one.
///
/// A source issues at most one outbound call per invocation and must apply its own per-call deadline, reporting an
/// overrun as [`PollResult::Unavailable`]. Retry policy belongs to the engine.
#[allow(async_fn_in_trait)]
pub trait VerdictSource {
    async fn fetch_verdict(&self, number: &OrderNumber) -> PollResult;
}
