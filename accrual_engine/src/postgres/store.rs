use std::{fmt::Debug, str::FromStr};

use async_trait::async_trait;
use log::info;
use lp_common::Amount;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use super::db::{orders, rewards};
use crate::{
    traits::{AccrualStore, AccrualStoreError},
    types::{AccrualOrder, AccrualStatus, Good, RewardRule},
};

const SCHEMA: &str = "accrual";
const MAX_CONNECTIONS: u32 = 10;

/// Postgres implementation of the accrual service's persistence boundary.
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
    /// Connects to the database, creates the `accrual` schema if needed and applies pending migrations. The
    /// `search_path` is pinned to the service's schema so its migration history stays separate from the
    /// loyalty service's.
    pub async fn connect(url: &str) -> Result<Self, AccrualStoreError> {
        let options = PgConnectOptions::from_str(url)
            .map_err(|e| AccrualStoreError::Database(format!("Invalid database URI: {e}")))?
            .options([("search_path", SCHEMA)]);
        let pool = PgPoolOptions::new().max_connections(MAX_CONNECTIONS).connect_with(options).await?;
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {SCHEMA}")).execute(&pool).await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AccrualStoreError::Database(format!("Migrations failed: {e}")))?;
        info!("🗃️ Connected to the accrual database and applied migrations");
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AccrualStore for PgStore {
    async fn create_order(&self, number: &str, goods: &[Good]) -> Result<(), AccrualStoreError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(number, goods, &mut conn).await
    }

    async fn order_by_number(&self, number: &str) -> Result<Option<AccrualOrder>, AccrualStoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order_by_number(number, &mut conn).await?)
    }

    async fn update_order(
        &self,
        number: &str,
        status: AccrualStatus,
        accrual: Option<Amount>,
    ) -> Result<(), AccrualStoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::update_status_and_accrual(number, status, accrual, &mut conn).await?)
    }

    async fn create_reward(&self, rule: &RewardRule) -> Result<(), AccrualStoreError> {
        let mut conn = self.pool.acquire().await?;
        rewards::insert_reward(rule, &mut conn).await
    }

    async fn rewards(&self) -> Result<Vec<RewardRule>, AccrualStoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(rewards::fetch_rewards(&mut conn).await?)
    }
}
