use thiserror::Error;

use crate::{db_types::OrderNumber, traits::LedgerError};

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Order number failed validation: {0}")]
    InvalidOrderNumber(String),
    #[error("Order {0} has already been uploaded by another user")]
    OwnedByAnotherUser(OrderNumber),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, Error)]
pub enum WithdrawError {
    #[error("Order number failed validation: {0}")]
    InvalidOrderNumber(String),
    #[error("Withdrawal amount must be positive")]
    NonPositiveAmount,
    #[error("Insufficient balance for the requested withdrawal")]
    InsufficientFunds,
    #[error(transparent)]
    Ledger(LedgerError),
}

impl From<LedgerError> for WithdrawError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientFunds(_) => WithdrawError::InsufficientFunds,
            other => WithdrawError::Ledger(other),
        }
    }
}
