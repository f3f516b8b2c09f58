use std::fmt::Debug;

use log::*;
use lpg_common::Points;

use crate::{
    db_types::{Balance, OrderNumber, Withdrawal},
    helpers::luhn,
    lpe_api::errors::WithdrawError,
    traits::{BalanceManagement, LedgerError},
};

/// `AccountApi` serves balance queries and enforces the withdrawal invariant: a user can never spend points that
/// have not been durably confirmed.
pub struct AccountApi<B> {
    db: B,
}

impl<B> Debug for AccountApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountApi")
    }
}

impl<B> AccountApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AccountApi<B>
where B: BalanceManagement
{
    pub async fn balance(&self, user_id: i64) -> Result<Balance, LedgerError> {
        self.db.fetch_balance(user_id).await
    }

    /// Spends `amount` points against the order-number label.
    ///
    /// The amount must be strictly positive and the label must pass the same Luhn check as an order upload, even
    /// though it is never resolved against the orders table. The balance check and the insert run as one
    /// serializable unit in the ledger, so concurrent withdrawals cannot jointly overdraw an account.
    pub async fn withdraw(&self, user_id: i64, number: &str, amount: Points) -> Result<Withdrawal, WithdrawError> {
        if !luhn::is_valid(number) {
            debug!("💸️ Rejecting withdrawal with invalid order number for user #{user_id}");
            return Err(WithdrawError::InvalidOrderNumber(number.to_string()));
        }
        if !amount.is_positive() {
            debug!("💸️ Rejecting non-positive withdrawal of {amount} for user #{user_id}");
            return Err(WithdrawError::NonPositiveAmount);
        }
        let number = OrderNumber::from(number);
        let withdrawal = self.db.insert_withdrawal_if_sufficient(user_id, &number, amount).await?;
        debug!("💸️ User #{user_id} withdrew {amount} against order {number}");
        Ok(withdrawal)
    }

    /// All withdrawals for the user, newest first.
    pub async fn withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, LedgerError> {
        self.db.fetch_withdrawals_for_user(user_id).await
    }
}
