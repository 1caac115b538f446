use async_trait::async_trait;
use lp_common::Amount;
use thiserror::Error;

use crate::db_types::{Balance, Order, OrderStatus, User, Withdrawal};

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("A user with this login already exists")]
    UserAlreadyExists,
    #[error("An order with this number already exists")]
    OrderAlreadyExists,
    #[error("Insufficient funds to complete the withdrawal")]
    InsufficientFunds,
    #[error("The requested record does not exist")]
    NotFound,
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            e => StoreError::Database(e.to_string()),
        }
    }
}

/// The persistence boundary of the loyalty service.
///
/// Every method is atomic over the row set it touches. Two methods are explicitly transactional and carry the
/// invariants the rest of the system is built on:
///
/// * [`update_order_status`](LoyaltyStore::update_order_status) locks the order row, and credits the owner's
///   balance only when the order moves into `PROCESSED` for the first time. Repeated `PROCESSED` notifications
///   therefore credit exactly once.
/// * [`withdraw_balance`](LoyaltyStore::withdraw_balance) locks the user row, re-reads the balance, and either
///   debits it and appends a journal entry or fails with [`StoreError::InsufficientFunds`] without writing.
///
/// Calls abort promptly when their future is dropped, which is how cancellation reaches the store.
#[async_trait]
pub trait LoyaltyStore: Send + Sync {
    /// Atomic unique-login insertion. Returns the new user id.
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<i64, StoreError>;

    async fn user_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// Atomic insertion of a `NEW` order with zero accrual. [`StoreError::OrderAlreadyExists`] on a duplicate
    /// number, whoever owns it.
    async fn create_order(&self, user_id: i64, number: &str) -> Result<(), StoreError>;

    async fn order_by_number(&self, number: &str) -> Result<Option<Order>, StoreError>;

    /// The user's orders, newest upload first.
    async fn orders_by_user(&self, user_id: i64) -> Result<Vec<Order>, StoreError>;

    async fn orders_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StoreError>;

    /// Transactional status transition with exactly-once crediting (see the trait docs).
    async fn update_order_status(&self, number: &str, status: OrderStatus, accrual: Amount) -> Result<(), StoreError>;

    async fn balance(&self, user_id: i64) -> Result<Balance, StoreError>;

    /// Transactional debit (see the trait docs). `sum` must already be validated as positive.
    async fn withdraw_balance(&self, user_id: i64, order_number: &str, sum: Amount) -> Result<(), StoreError>;

    /// The user's withdrawals, newest first.
    async fn withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, StoreError>;

    /// Administrative balance adjustment. The polling path must not use this; it goes through
    /// [`update_order_status`](LoyaltyStore::update_order_status) so the credit commits together with the order row.
    async fn add_accrual(&self, user_id: i64, amount: Amount) -> Result<(), StoreError>;
}
