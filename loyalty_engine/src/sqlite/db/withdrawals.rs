use lpg_common::Points;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Balance, OrderNumber, Withdrawal},
    traits::LedgerError,
};

/// Sum of confirmed accruals for the user. Only `PROCESSED` orders contribute; everything else is NULL or excluded.
pub async fn accrued_total(user_id: i64, conn: &mut SqliteConnection) -> Result<Points, sqlx::Error> {
    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(accrual), 0) FROM orders WHERE user_id = $1 AND status = 'PROCESSED'",
    )
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(Points::from(total))
}

/// Lifetime sum of the user's withdrawals.
pub async fn withdrawn_total(user_id: i64, conn: &mut SqliteConnection) -> Result<Points, sqlx::Error> {
    let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(amount), 0) FROM withdrawals WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(conn)
        .await?;
    Ok(Points::from(total))
}

pub async fn compute_balance(user_id: i64, conn: &mut SqliteConnection) -> Result<Balance, sqlx::Error> {
    let accrued = accrued_total(user_id, &mut *conn).await?;
    let withdrawn = withdrawn_total(user_id, conn).await?;
    Ok(Balance { current: accrued - withdrawn, withdrawn })
}

/// The balance check and the insert, inside one `BEGIN IMMEDIATE` transaction.
///
/// `BEGIN IMMEDIATE` takes the database write lock up front, so the balance read cannot interleave with another
/// writer's check-then-insert: two concurrent withdrawals against the same balance serialize, and the loser sees the
/// winner's row in its own balance computation.
pub async fn insert_if_sufficient(
    user_id: i64,
    number: &OrderNumber,
    amount: Points,
    conn: &mut SqliteConnection,
) -> Result<Withdrawal, LedgerError> {
    sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
    match guarded_insert(user_id, number, amount, &mut *conn).await {
        Ok(withdrawal) => {
            if let Err(e) = sqlx::query("COMMIT").execute(&mut *conn).await {
                // Leave no transaction dangling on the pooled connection.
                let _ = sqlx::query("ROLLBACK").execute(conn).await;
                return Err(e.into());
            }
            Ok(withdrawal)
        },
        Err(e) => {
            // Nothing was written; release the lock.
            let _ = sqlx::query("ROLLBACK").execute(conn).await;
            Err(e)
        },
    }
}

async fn guarded_insert(
    user_id: i64,
    number: &OrderNumber,
    amount: Points,
    conn: &mut SqliteConnection,
) -> Result<Withdrawal, LedgerError> {
    let balance = compute_balance(user_id, &mut *conn).await?;
    if balance.current < amount {
        return Err(LedgerError::InsufficientFunds(amount));
    }
    let withdrawal = sqlx::query_as("INSERT INTO withdrawals (user_id, order_number, amount) VALUES ($1, $2, $3) RETURNING *")
        .bind(user_id)
        .bind(number.as_str())
        .bind(amount)
        .fetch_one(conn)
        .await?;
    Ok(withdrawal)
}

/// A user's withdrawals in display order: newest first.
pub async fn fetch_withdrawals_for_user(
    user_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Withdrawal>, sqlx::Error> {
    let withdrawals =
        sqlx::query_as("SELECT * FROM withdrawals WHERE user_id = $1 ORDER BY processed_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    Ok(withdrawals)
}
