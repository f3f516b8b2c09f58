use log::debug;
use lpg_common::Points;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, Order, OrderNumber, OrderStatus},
    traits::LedgerError,
};

/// Inserts the order into the database, returning `false` in the second parameter if the order number already
/// existed. Idempotent thanks to the uniqueness constraint on `number`; a concurrent duplicate insert simply loses
/// the conflict and reads back the winning row.
pub async fn idempotent_insert(
    order: NewOrder,
    conn: &mut SqliteConnection,
) -> Result<(Order, bool), LedgerError> {
    let inserted: Option<Order> = sqlx::query_as(
        r#"
            INSERT INTO orders (number, user_id, status)
            VALUES ($1, $2, $3)
            ON CONFLICT (number) DO NOTHING
            RETURNING *;
        "#,
    )
    .bind(order.number.as_str())
    .bind(order.user_id)
    .bind(OrderStatus::New)
    .fetch_optional(&mut *conn)
    .await?;
    match inserted {
        Some(order) => {
            debug!("📝️ Order {} inserted with id {}", order.number, order.id);
            Ok((order, true))
        },
        None => {
            let existing = fetch_order_by_number(&order.number, conn)
                .await?
                .ok_or_else(|| LedgerError::OrderNotFound(order.number.clone()))?;
            Ok((existing, false))
        },
    }
}

pub async fn fetch_order_by_number(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE number = $1")
        .bind(number.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

/// A user's orders in display order: newest upload first.
pub async fn fetch_orders_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY uploaded_at DESC, id DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// All orders still awaiting a verdict, oldest upload first, so the sweep visits the stalest orders before the rest.
pub async fn fetch_unreconciled_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as(
        "SELECT * FROM orders WHERE status IN ('NEW', 'PROCESSING') ORDER BY uploaded_at ASC, id ASC",
    )
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

/// Moves a `NEW` order into `PROCESSING`. The guarded UPDATE makes this idempotent: re-applying it to an order that
/// has already advanced leaves the row untouched and returns it as stored.
pub async fn mark_processing(number: &OrderNumber, conn: &mut SqliteConnection) -> Result<Order, LedgerError> {
    let updated: Option<Order> =
        sqlx::query_as("UPDATE orders SET status = $1 WHERE number = $2 AND status = $3 RETURNING *")
            .bind(OrderStatus::Processing)
            .bind(number.as_str())
            .bind(OrderStatus::New)
            .fetch_optional(&mut *conn)
            .await?;
    match updated {
        Some(order) => Ok(order),
        None => fetch_order_by_number(number, conn).await?.ok_or_else(|| LedgerError::OrderNotFound(number.clone())),
    }
}

/// Writes the terminal status and accrual for an order in one atomic statement. The `status NOT IN` guard keeps
/// terminal rows frozen; a zero-row update is classified by re-reading the row: an identical stored verdict is a
/// harmless replay, anything else is a conflicting duplicate and is refused.
pub async fn finalize(
    number: &OrderNumber,
    status: OrderStatus,
    accrual: Option<Points>,
    conn: &mut SqliteConnection,
) -> Result<Order, LedgerError> {
    if !status.is_terminal() {
        return Err(LedgerError::NonTerminalWrite(number.clone(), status));
    }
    let updated: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = $1, accrual = $2 WHERE number = $3 AND status IN ('NEW', 'PROCESSING') \
         RETURNING *",
    )
    .bind(status)
    .bind(accrual)
    .bind(number.as_str())
    .fetch_optional(&mut *conn)
    .await?;
    if let Some(order) = updated {
        debug!("📝️ Order {} finalized as {} ({:?})", order.number, order.status, order.accrual);
        return Ok(order);
    }
    let existing =
        fetch_order_by_number(number, conn).await?.ok_or_else(|| LedgerError::OrderNotFound(number.clone()))?;
    if existing.status == status && existing.accrual == accrual {
        // A replayed write with identical values. Nothing to do.
        Ok(existing)
    } else {
        Err(LedgerError::TerminalWriteConflict {
            number: number.clone(),
            existing: describe(existing.status, existing.accrual),
            attempted: describe(status, accrual),
        })
    }
}

fn describe(status: OrderStatus, accrual: Option<Points>) -> String {
    match accrual {
        Some(points) => format!("{status}/{points}"),
        None => status.to_string(),
    }
}
