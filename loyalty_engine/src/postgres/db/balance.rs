use lp_common::Amount;
use sqlx::PgConnection;

use crate::db_types::{Balance, Withdrawal};

pub async fn fetch_balance(user_id: i64, conn: &mut PgConnection) -> Result<Option<Balance>, sqlx::Error> {
    sqlx::query_as("SELECT balance AS current, withdrawn FROM gophermart.users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(conn)
        .await
}

/// Locks the user row and returns the committed balance pair. Serialises withdrawals and credits for the
/// user until the surrounding transaction commits.
pub async fn lock_balance(user_id: i64, conn: &mut PgConnection) -> Result<Option<Balance>, sqlx::Error> {
    sqlx::query_as("SELECT balance AS current, withdrawn FROM gophermart.users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(conn)
        .await
}

pub async fn apply_withdrawal(user_id: i64, sum: Amount, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE gophermart.users SET balance = balance - $1, withdrawn = withdrawn + $1 WHERE id = $2")
        .bind(sum.value())
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn insert_balance_transaction(
    user_id: i64,
    order_number: &str,
    sum: Amount,
    conn: &mut PgConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
            INSERT INTO gophermart.balance_transactions (user_id, order_number, sum)
            VALUES ($1, $2, $3)
        "#,
    )
    .bind(user_id)
    .bind(order_number)
    .bind(sum.value())
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn fetch_withdrawals(user_id: i64, conn: &mut PgConnection) -> Result<Vec<Withdrawal>, sqlx::Error> {
    sqlx::query_as(
        r#"
            SELECT order_number, sum, processed_at
            FROM gophermart.balance_transactions
            WHERE user_id = $1
            ORDER BY processed_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
}
