use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderNumber},
    helpers::luhn,
    lpe_api::errors::OrderFlowError,
    traits::OrderManagement,
};

/// The result of an order upload. Re-uploading a number you already own is not an error, so the caller can report
/// the two success shapes differently.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// The order is new and has been queued for reconciliation.
    Accepted(Order),
    /// The same user uploaded this number before; the stored order is returned unchanged.
    AlreadyUploaded(Order),
}

/// `OrderFlowApi` handles the submission side of the order lifecycle. Once an order is accepted here, the
/// reconciliation engine is its only mutator.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderFlowApi<B>
where B: OrderManagement
{
    /// Validates and stores a new order for `user_id`.
    ///
    /// The number must pass the Luhn check before the ledger is touched. Duplicate uploads by the same user are
    /// reported as [`SubmitOutcome::AlreadyUploaded`]; a number claimed by another user is an error.
    pub async fn submit_order(&self, user_id: i64, number: &str) -> Result<SubmitOutcome, OrderFlowError> {
        if !luhn::is_valid(number) {
            debug!("📦️ Rejecting order upload with invalid number for user #{user_id}");
            return Err(OrderFlowError::InvalidOrderNumber(number.to_string()));
        }
        let order = NewOrder::new(user_id, OrderNumber::from(number));
        let (order, inserted) = self.db.insert_order(order).await?;
        if inserted {
            debug!("📦️ Order {} accepted for user #{user_id}", order.number);
            return Ok(SubmitOutcome::Accepted(order));
        }
        if order.user_id == user_id {
            trace!("📦️ Order {} was already uploaded by user #{user_id}", order.number);
            Ok(SubmitOutcome::AlreadyUploaded(order))
        } else {
            debug!("📦️ Order {} belongs to user #{}; rejecting upload by user #{user_id}", order.number, order.user_id);
            Err(OrderFlowError::OwnedByAnotherUser(order.number))
        }
    }

    /// All orders for the user, newest upload first. An empty list is a perfectly good answer.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        trace!("📦️ Fetched {} orders for user #{user_id}", orders.len());
        Ok(orders)
    }
}
