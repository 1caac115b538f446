use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Computation state reported by the external accrual system for one order.
#[derive(Debug, Clone, Deserialize)]
pub struct AccrualOrderState {
    pub order: String,
    pub status: ExternalStatus,
    /// Fractional points value; only meaningful alongside [`ExternalStatus::Processed`].
    pub accrual: Option<f64>,
}

/// Status vocabulary of the accrual system. Anything this service does not recognise maps to
/// [`ExternalStatus::Unknown`] and produces no transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExternalStatus {
    Registered,
    Processing,
    Processed,
    Invalid,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Error)]
pub enum AccrualClientError {
    /// The order has not reached the accrual system yet. Not a failure; the next poll retries.
    #[error("The order is not registered in the accrual system")]
    NotRegistered,
    /// The accrual system asked us to back off for the given duration.
    #[error("Rate limited by the accrual system, retry after {0:?}")]
    RateLimited(Duration),
    #[error("The accrual system returned status {0}")]
    UnexpectedStatus(u16),
    #[error("Could not reach the accrual system: {0}")]
    Transport(String),
    #[error("Could not decode the accrual response: {0}")]
    Decode(String),
}

/// Client capability for the external accrual system.
#[async_trait]
pub trait AccrualClient: Send + Sync {
    async fn get_order(&self, number: &str) -> Result<AccrualOrderState, AccrualClientError>;
}
