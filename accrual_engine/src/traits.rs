use async_trait::async_trait;
use lp_common::Amount;
use thiserror::Error;

use crate::types::{AccrualOrder, AccrualStatus, Good, RewardRule};

#[derive(Debug, Clone, Error)]
pub enum AccrualStoreError {
    #[error("An order with this number already exists")]
    OrderAlreadyExists,
    #[error("A reward rule with this match already exists")]
    MatchAlreadyExists,
    #[error("The requested record does not exist")]
    NotFound,
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for AccrualStoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AccrualStoreError::NotFound,
            e => AccrualStoreError::Database(e.to_string()),
        }
    }
}

/// The persistence boundary of the accrual service.
#[async_trait]
pub trait AccrualStore: Send + Sync {
    /// Persists a `REGISTERED` order with no accrual. At most one order exists per number;
    /// [`AccrualStoreError::OrderAlreadyExists`] on a duplicate.
    async fn create_order(&self, number: &str, goods: &[Good]) -> Result<(), AccrualStoreError>;

    async fn order_by_number(&self, number: &str) -> Result<Option<AccrualOrder>, AccrualStoreError>;

    async fn update_order(
        &self,
        number: &str,
        status: AccrualStatus,
        accrual: Option<Amount>,
    ) -> Result<(), AccrualStoreError>;

    /// Persists a rule. Matches are unique; [`AccrualStoreError::MatchAlreadyExists`] on a duplicate.
    async fn create_reward(&self, rule: &RewardRule) -> Result<(), AccrualStoreError>;

    /// Every registered rule, in insertion order. The computation takes the first matching rule per good, so
    /// this ordering is part of the contract: it keeps the result reproducible across runs.
    async fn rewards(&self) -> Result<Vec<RewardRule>, AccrualStoreError>;
}
