use lpg_common::Points;
use thiserror::Error;

use crate::db_types::{Balance, NewOrder, Order, OrderNumber, OrderStatus, Withdrawal};

/// Order lifecycle storage, as consumed by the submission path and the reconciliation engine.
///
/// Every mutation is keyed on the order number and must be safely re-appliable: the engine retries freely after
/// partial failures, and a restart mid-sweep must never double-charge an order.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a new order, or returns the existing row when the number is already known.
    ///
    /// The boolean is `true` when the order was inserted by this call. Callers distinguish "already uploaded by me"
    /// from "owned by someone else" by inspecting the returned order's `user_id`.
    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), LedgerError>;

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, LedgerError>;

    /// All orders for the given user, newest upload first. This is the display ordering.
    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, LedgerError>;

    /// All orders that still need reconciling (`NEW` or `PROCESSING`), oldest upload first, so that the sweep bounds
    /// worst-case staleness.
    async fn fetch_unreconciled_orders(&self) -> Result<Vec<Order>, LedgerError>;

    /// Durably moves a `NEW` order into `PROCESSING`. Idempotent: an order already past `NEW` is returned unchanged.
    async fn mark_order_processing(&self, number: &OrderNumber) -> Result<Order, LedgerError>;

    /// Commits the final verdict for an order in a single atomic write. This is the only place accrual enters the
    /// balance computation.
    ///
    /// `status` must be terminal. Re-applying an identical write is a no-op and returns the stored row; a terminal
    /// re-write with *different* values is refused with [`LedgerError::TerminalWriteConflict`].
    async fn finalize_order(
        &self,
        number: &OrderNumber,
        status: OrderStatus,
        accrual: Option<Points>,
    ) -> Result<Order, LedgerError>;
}

/// Balance arithmetic and the withdrawal guard.
#[allow(async_fn_in_trait)]
pub trait BalanceManagement {
    /// The derived balance: confirmed accruals minus withdrawals, plus the lifetime withdrawn total.
    async fn fetch_balance(&self, user_id: i64) -> Result<Balance, LedgerError>;

    /// The balance check and the withdrawal insert, executed as one serializable unit. Two concurrent withdrawals
    /// against the same near-zero balance must never both succeed.
    ///
    /// Returns [`LedgerError::InsufficientFunds`] without creating a record when the balance does not cover `amount`.
    async fn insert_withdrawal_if_sufficient(
        &self,
        user_id: i64,
        number: &OrderNumber,
        amount: Points,
    ) -> Result<Withdrawal, LedgerError>;

    /// All withdrawals for the given user, newest first.
    async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, LedgerError>;
}

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderNumber),
    #[error("Conflicting terminal write for order {number}: stored {existing}, attempted {attempted}")]
    TerminalWriteConflict { number: OrderNumber, existing: String, attempted: String },
    #[error("Order {0} cannot be finalized with non-terminal status {1}")]
    NonTerminalWrite(OrderNumber, OrderStatus),
    #[error("Insufficient balance to withdraw {0}")]
    InsufficientFunds(Points),
}

impl From<sqlx::Error> for LedgerError {
    fn from(e: sqlx::Error) -> Self {
        LedgerError::DatabaseError(e.to_string())
    }
}
