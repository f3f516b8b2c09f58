use lpg_common::Points;
use loyalty_engine::{
    db_types::{Balance, NewOrder, Order, OrderNumber, OrderStatus, User, Withdrawal},
    traits::{AuthApiError, AuthManagement, BalanceManagement, LedgerError, OrderManagement},
};
use mockall::mock;

mock! {
    pub OrderManager {}
    impl OrderManagement for OrderManager {
        async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), LedgerError>;
        async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, LedgerError>;
        async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, LedgerError>;
        async fn fetch_unreconciled_orders(&self) -> Result<Vec<Order>, LedgerError>;
        async fn mark_order_processing(&self, number: &OrderNumber) -> Result<Order, LedgerError>;
        async fn finalize_order(&self, number: &OrderNumber, status: OrderStatus, accrual: Option<Points>) -> Result<Order, LedgerError>;
    }
}

mock! {
    pub BalanceManager {}
    impl BalanceManagement for BalanceManager {
        async fn fetch_balance(&self, user_id: i64) -> Result<Balance, LedgerError>;
        async fn insert_withdrawal_if_sufficient(&self, user_id: i64, number: &OrderNumber, amount: Points) -> Result<Withdrawal, LedgerError>;
        async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, LedgerError>;
    }
}

mock! {
    pub AuthManager {}
    impl AuthManagement for AuthManager {
        async fn create_user(&self, login: &str, password_hash: &str) -> Result<User, AuthApiError>;
        async fn fetch_user_by_login(&self, login: &str) -> Result<Option<User>, AuthApiError>;
        async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, AuthApiError>;
    }
}
