use std::{fmt::Display, time::Duration};

use lpg_common::Points;
use serde::{Deserialize, Serialize};

/// The verdict states the accrual service reports for an order. `Registered` and `Processing` mean the service is
/// still working; `Invalid` and `Processed` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccrualOrderStatus {
    Registered,
    Processing,
    Invalid,
    Processed,
}

impl AccrualOrderStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, AccrualOrderStatus::Invalid | AccrualOrderStatus::Processed)
    }
}

impl Display for AccrualOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccrualOrderStatus::Registered => write!(f, "REGISTERED"),
            AccrualOrderStatus::Processing => write!(f, "PROCESSING"),
            AccrualOrderStatus::Invalid => write!(f, "INVALID"),
            AccrualOrderStatus::Processed => write!(f, "PROCESSED"),
        }
    }
}

/// One verdict body, as returned by `GET /api/orders/{number}`. The `accrual` field is only present once the order
/// has been processed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OrderVerdict {
    pub order: String,
    pub status: AccrualOrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Points>,
}

/// Everything a single poll of the accrual service can tell us.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The service returned a verdict body. It may still be non-final.
    Verdict(OrderVerdict),
    /// The service does not know the order yet (it has not been queued upstream). Not an error.
    NotRegistered,
    /// The service is shedding load and asks us to back off for the given duration.
    RateLimited(Duration),
    /// Transport failure, deadline overrun, unexpected status code or malformed body. Safe to retry later.
    Unavailable,
}
