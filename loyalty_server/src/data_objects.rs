use chrono::{DateTime, Utc};
use lpg_common::Points;
use loyalty_engine::db_types::{Order, OrderStatus, Withdrawal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawalRequest {
    /// The order number the user spends points against. Validated like an upload, but never resolved.
    pub order: String,
    pub sum: Points,
}

/// The wire shape of an order in the listing endpoint. `accrual` is only present once the order is PROCESSED.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub number: String,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Points>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Order> for OrderSummary {
    fn from(order: Order) -> Self {
        let accrual = match order.status {
            OrderStatus::Processed => order.accrual,
            _ => None,
        };
        Self { number: order.number.0, status: order.status, accrual, uploaded_at: order.uploaded_at }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalSummary {
    pub order: String,
    pub sum: Points,
    pub processed_at: DateTime<Utc>,
}

impl From<Withdrawal> for WithdrawalSummary {
    fn from(withdrawal: Withdrawal) -> Self {
        Self { order: withdrawal.order_number.0, sum: withdrawal.amount, processed_at: withdrawal.processed_at }
    }
}
