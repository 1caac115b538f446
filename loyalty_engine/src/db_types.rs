use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use lp_common::Amount;
use sqlx::FromRow;
use thiserror::Error;

//--------------------------------------        User        ----------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub password_hash: String,
    pub balance: Amount,
    pub withdrawn: Amount,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------     OrderStatus     ---------------------------------------------------------

/// Lifecycle state of a claimed order.
///
/// Transitions only move along `New → Processing → {Processed, Invalid}`, with the two shortcuts
/// `New → Processed` and `New → Invalid` permitted. `Processed` and `Invalid` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    Processing,
    Invalid,
    Processed,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Processed | OrderStatus::Invalid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Invalid => "INVALID",
            OrderStatus::Processed => "PROCESSED",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct StatusConversionError(String);

impl FromStr for OrderStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(Self::New),
            "PROCESSING" => Ok(Self::Processing),
            "INVALID" => Ok(Self::Invalid),
            "PROCESSED" => Ok(Self::Processed),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = StatusConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

//--------------------------------------        Order        ---------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub number: String,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    /// Points awarded for this order. Zero unless `status` is [`OrderStatus::Processed`].
    pub accrual: Amount,
    pub uploaded_at: DateTime<Utc>,
}

//--------------------------------------       Balance       ---------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct Balance {
    pub current: Amount,
    pub withdrawn: Amount,
}

//--------------------------------------      Withdrawal     ---------------------------------------------------------

/// One entry of the append-only withdrawal journal.
#[derive(Debug, Clone, FromRow)]
pub struct Withdrawal {
    pub order_number: String,
    pub sum: Amount,
    pub processed_at: DateTime<Utc>,
}

#[cfg(test)]
mod test {
    use super::OrderStatus;

    #[test]
    fn status_round_trips() {
        for status in [OrderStatus::New, OrderStatus::Processing, OrderStatus::Invalid, OrderStatus::Processed] {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("PAID".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Processed.is_terminal());
        assert!(OrderStatus::Invalid.is_terminal());
        assert!(!OrderStatus::New.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
    }
}
