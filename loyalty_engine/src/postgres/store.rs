//! `PgStore` is the Postgres implementation of the loyalty service's persistence boundary.
//!
//! All SQL lives in the helper modules under [`super::db`]; this file owns the pool, the schema bootstrap and
//! the two transactions the store contract calls out explicitly.
use std::{fmt::Debug, str::FromStr};

use async_trait::async_trait;
use log::{debug, info};
use lp_common::Amount;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use super::db::{balance, orders, users};
use crate::{
    db_types::{Balance, Order, OrderStatus, User, Withdrawal},
    traits::{LoyaltyStore, StoreError},
};

const SCHEMA: &str = "gophermart";
const MAX_CONNECTIONS: u32 = 10;

#[derive(Clone)]
pub struct PgStore {
    url: String,
    pool: PgPool,
}

impl Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PgStore ({:?})", self.pool)
    }
}

impl PgStore {
    /// Connects to the database, creates the `gophermart` schema if needed and applies pending migrations.
    ///
    /// The connection `search_path` is pinned to the service's schema, so the migration history table lives
    /// there and does not collide with the accrual service sharing the database.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = PgConnectOptions::from_str(url)
            .map_err(|e| StoreError::Database(format!("Invalid database URI: {e}")))?
            .options([("search_path", SCHEMA)]);
        let pool = PgPoolOptions::new().max_connections(MAX_CONNECTIONS).connect_with(options).await?;
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {SCHEMA}")).execute(&pool).await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migrations failed: {e}")))?;
        info!("🗃️ Connected to the loyalty database and applied migrations");
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LoyaltyStore for PgStore {
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        users::insert_user(login, password_hash, &mut conn).await
    }

    async fn user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_user_by_login(login, &mut conn).await?)
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_user_by_id(id, &mut conn).await?)
    }

    async fn create_order(&self, user_id: i64, number: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(user_id, number, &mut conn).await
    }

    async fn order_by_number(&self, number: &str) -> Result<Option<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_number(number, &mut conn).await?)
    }

    async fn orders_by_user(&self, user_id: i64) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_orders_by_user(user_id, &mut conn).await?)
    }

    async fn orders_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_orders_by_status(status, &mut conn).await?)
    }

    async fn update_order_status(&self, number: &str, status: OrderStatus, accrual: Amount) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let (user_id, current) = orders::lock_order(number, &mut tx).await?.ok_or(StoreError::NotFound)?;
        // Terminal states are final: a straggling report from an in-flight poll must not unseat them or
        // re-trigger a credit.
        if current.is_terminal() {
            debug!("🗃️ Order [{number}] is already {current}; ignoring transition to {status}");
            return Ok(());
        }
        // The credit commits together with the status row, on the first transition into PROCESSED only.
        if status == OrderStatus::Processed {
            users::credit_balance(user_id, accrual, &mut tx).await?;
            debug!("🗃️ Credited {accrual} to user #{user_id} for order [{number}]");
        }
        orders::update_status_and_accrual(number, status, accrual, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn balance(&self, user_id: i64) -> Result<Balance, StoreError> {
        let mut conn = self.pool.acquire().await?;
        balance::fetch_balance(user_id, &mut conn).await?.ok_or(StoreError::NotFound)
    }

    async fn withdraw_balance(&self, user_id: i64, order_number: &str, sum: Amount) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let current = balance::lock_balance(user_id, &mut tx).await?.ok_or(StoreError::NotFound)?;
        if current.current < sum {
            // Dropping the transaction rolls back; the insufficient balance must leave no trace.
            return Err(StoreError::InsufficientFunds);
        }
        balance::apply_withdrawal(user_id, sum, &mut tx).await?;
        balance::insert_balance_transaction(user_id, order_number, sum, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ User #{user_id} withdrew {sum} against order [{order_number}]");
        Ok(())
    }

    async fn withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(balance::fetch_withdrawals(user_id, &mut conn).await?)
    }

    async fn add_accrual(&self, user_id: i64, amount: Amount) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::credit_balance(user_id, amount, &mut conn).await?)
    }
}
