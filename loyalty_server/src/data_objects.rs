use chrono::{DateTime, Utc};
use loyalty_engine::db_types::{Balance, Order, OrderStatus, Withdrawal};
use lp_common::Amount;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub number: String,
    pub status: String,
    /// Present only once the order has been processed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Amount>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            number: order.number,
            status: order.status.to_string(),
            accrual: (order.status == OrderStatus::Processed).then_some(order.accrual),
            uploaded_at: order.uploaded_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    pub current: Amount,
    pub withdrawn: Amount,
}

impl From<Balance> for BalanceResponse {
    fn from(balance: Balance) -> Self {
        Self { current: balance.current, withdrawn: balance.withdrawn }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawRequest {
    pub order: String,
    pub sum: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawalResponse {
    pub order: String,
    pub sum: Amount,
    pub processed_at: DateTime<Utc>,
}

impl From<Withdrawal> for WithdrawalResponse {
    fn from(withdrawal: Withdrawal) -> Self {
        Self { order: withdrawal.order_number, sum: withdrawal.sum, processed_at: withdrawal.processed_at }
    }
}
