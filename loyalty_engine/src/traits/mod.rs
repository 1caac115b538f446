mod accrual_client;
mod store;

pub use accrual_client::{AccrualClient, AccrualClientError, AccrualOrderState, ExternalStatus};
pub use store::{LoyaltyStore, StoreError};
