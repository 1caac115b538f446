use log::debug;
use lp_common::Amount;
use sqlx::{types::Json, PgConnection};

use crate::{
    postgres::db::is_unique_violation,
    traits::AccrualStoreError,
    types::{AccrualOrder, AccrualStatus, Good},
};

pub async fn insert_order(number: &str, goods: &[Good], conn: &mut PgConnection) -> Result<(), AccrualStoreError> {
    sqlx::query("INSERT INTO accrual.orders (number, goods) VALUES ($1, $2)")
        .bind(number)
        .bind(Json(goods))
        .execute(conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AccrualStoreError::OrderAlreadyExists
            } else {
                AccrualStoreError::from(e)
            }
        })?;
    debug!("🗃️ Order [{number}] registered with {} goods", goods.len());
    Ok(())
}

pub async fn fetch_order_by_number(
    number: &str,
    conn: &mut PgConnection,
) -> Result<Option<AccrualOrder>, sqlx::Error> {
    sqlx::query_as("SELECT number, status, accrual, goods FROM accrual.orders WHERE number = $1")
        .bind(number)
        .fetch_optional(conn)
        .await
}

pub async fn update_status_and_accrual(
    number: &str,
    status: AccrualStatus,
    accrual: Option<Amount>,
    conn: &mut PgConnection,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE accrual.orders SET status = $1, accrual = $2 WHERE number = $3")
        .bind(status.as_str())
        .bind(accrual.map(|a| a.value()))
        .bind(number)
        .execute(conn)
        .await?;
    Ok(())
}
