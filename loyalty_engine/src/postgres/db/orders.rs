use log::debug;
use lp_common::Amount;
use sqlx::PgConnection;

use crate::{
    db_types::{Order, OrderStatus},
    postgres::db::is_unique_violation,
    traits::StoreError,
};

/// Inserts a `NEW` order for the given user. The unique index on `number` decides races between concurrent
/// claimants; the loser sees [`StoreError::OrderAlreadyExists`] and resolves ownership with a re-lookup.
pub async fn insert_order(user_id: i64, number: &str, conn: &mut PgConnection) -> Result<(), StoreError> {
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO gophermart.orders (user_id, number)
            VALUES ($1, $2)
            RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(number)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            StoreError::OrderAlreadyExists
        } else {
            StoreError::from(e)
        }
    })?;
    debug!("📥️ Order [{number}] inserted with id {id} for user #{user_id}");
    Ok(())
}

pub async fn fetch_order_by_number(number: &str, conn: &mut PgConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, user_id, number, status, accrual, uploaded_at FROM gophermart.orders WHERE number = $1",
    )
    .bind(number)
    .fetch_optional(conn)
    .await
}

pub async fn fetch_orders_by_user(user_id: i64, conn: &mut PgConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
            SELECT id, user_id, number, status, accrual, uploaded_at
            FROM gophermart.orders
            WHERE user_id = $1
            ORDER BY uploaded_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}

pub async fn fetch_orders_by_status(status: OrderStatus, conn: &mut PgConnection) -> Result<Vec<Order>, sqlx::Error> {
    sqlx::query_as(
        r#"
            SELECT id, user_id, number, status, accrual, uploaded_at
            FROM gophermart.orders
            WHERE status = $1
            ORDER BY uploaded_at DESC
        "#,
    )
    .bind(status.as_str())
    .fetch_all(conn)
    .await
}

/// Locks the order row and returns `(user_id, current_status)`. Serialises every status transition for the
/// number until the surrounding transaction commits.
pub async fn lock_order(number: &str, conn: &mut PgConnection) -> Result<Option<(i64, OrderStatus)>, StoreError> {
    let row: Option<(i64, String)> =
        sqlx::query_as("SELECT user_id, status FROM gophermart.orders WHERE number = $1 FOR UPDATE")
            .bind(number)
            .fetch_optional(conn)
            .await?;
    row.map(|(user_id, status)| {
        let status = status.parse::<OrderStatus>().map_err(|e| StoreError::Database(e.to_string()))?;
        Ok((user_id, status))
    })
    .transpose()
}

pub async fn update_status_and_accrual(
    number: &str,
    status: OrderStatus,
    accrual: Amount,
    conn: &mut PgConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE gophermart.orders SET status = $1, accrual = $2 WHERE number = $3")
        .bind(status.as_str())
        .bind(accrual.value())
        .bind(number)
        .execute(conn)
        .await?;
    Ok(())
}
