//! `SqliteDatabase` is a concrete implementation of the loyalty ledger.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use lpg_common::Points;
use sqlx::SqlitePool;

use super::db::{new_pool, orders, users, withdrawals};
use crate::{
    db_types::{Balance, NewOrder, Order, OrderNumber, OrderStatus, User, Withdrawal},
    traits::{AuthApiError, AuthManagement, BalanceManagement, LedgerError, OrderManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, LedgerError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Applies any pending embedded migrations. Called once at startup.
    pub async fn run_migrations(&self) -> Result<(), LedgerError> {
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&self.pool)
            .await
            .map_err(|e| LedgerError::DatabaseError(e.to_string()))
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<(Order, bool), LedgerError> {
        let mut conn = self.pool.acquire().await?;
        orders::idempotent_insert(order, &mut conn).await
    }

    async fn fetch_order_by_number(&self, number: &OrderNumber) -> Result<Option<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_number(number, &mut conn).await?)
    }

    async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_orders_for_user(user_id, &mut conn).await?)
    }

    async fn fetch_unreconciled_orders(&self) -> Result<Vec<Order>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_unreconciled_orders(&mut conn).await?)
    }

    async fn mark_order_processing(&self, number: &OrderNumber) -> Result<Order, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        orders::mark_processing(number, &mut conn).await
    }

    async fn finalize_order(
        &self,
        number: &OrderNumber,
        status: OrderStatus,
        accrual: Option<Points>,
    ) -> Result<Order, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        orders::finalize(number, status, accrual, &mut conn).await
    }
}

impl BalanceManagement for SqliteDatabase {
    async fn fetch_balance(&self, user_id: i64) -> Result<Balance, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(withdrawals::compute_balance(user_id, &mut conn).await?)
    }

    async fn insert_withdrawal_if_sufficient(
        &self,
        user_id: i64,
        number: &OrderNumber,
        amount: Points,
    ) -> Result<Withdrawal, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        withdrawals::insert_if_sufficient(user_id, number, amount, &mut conn).await
    }

    async fn fetch_withdrawals_for_user(&self, user_id: i64) -> Result<Vec<Withdrawal>, LedgerError> {
        let mut conn = self.pool.acquire().await?;
        Ok(withdrawals::fetch_withdrawals_for_user(user_id, &mut conn).await?)
    }
}

impl AuthManagement for SqliteDatabase {
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<User, AuthApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        users::insert_user(login, password_hash, &mut conn).await
    }

    async fn fetch_user_by_login(&self, login: &str) -> Result<Option<User>, AuthApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        Ok(users::fetch_user_by_login(login, &mut conn).await?)
    }

    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, AuthApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        Ok(users::fetch_user_by_id(id, &mut conn).await?)
    }
}
