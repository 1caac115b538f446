use log::debug;
use lp_common::Amount;
use sqlx::PgConnection;

use crate::{db_types::User, postgres::db::is_unique_violation, traits::StoreError};

/// Inserts a new user, returning the generated id. The unique index on `login` decides races between
/// concurrent registrations.
pub async fn insert_user(login: &str, password_hash: &str, conn: &mut PgConnection) -> Result<i64, StoreError> {
    let id = sqlx::query_scalar(
        r#"
            INSERT INTO gophermart.users (login, password_hash)
            VALUES ($1, $2)
            RETURNING id
        "#,
    )
    .bind(login)
    .bind(password_hash)
    .fetch_one(conn)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            StoreError::UserAlreadyExists
        } else {
            StoreError::from(e)
        }
    })?;
    debug!("🧑️ User [{login}] created with id {id}");
    Ok(id)
}

pub async fn fetch_user_by_login(login: &str, conn: &mut PgConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, login, password_hash, balance, withdrawn, created_at FROM gophermart.users WHERE login = $1",
    )
    .bind(login)
    .fetch_optional(conn)
    .await
}

pub async fn fetch_user_by_id(id: i64, conn: &mut PgConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, login, password_hash, balance, withdrawn, created_at FROM gophermart.users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

/// Adds `amount` to the user's balance. Callers are responsible for running this inside the transaction
/// that justifies the credit.
pub async fn credit_balance(user_id: i64, amount: Amount, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE gophermart.users SET balance = balance + $1 WHERE id = $2")
        .bind(amount.value())
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}
