use accrual_engine::{
    traits::{AccrualStore, AccrualStoreError},
    types::{AccrualOrder, AccrualStatus, Good, RewardRule},
};
use async_trait::async_trait;
use lp_common::Amount;
use mockall::mock;

mock! {
    pub Store {}

    #[async_trait]
    impl AccrualStore for Store {
        async fn create_order(&self, number: &str, goods: &[Good]) -> Result<(), AccrualStoreError>;
        async fn order_by_number(&self, number: &str) -> Result<Option<AccrualOrder>, AccrualStoreError>;
        async fn update_order(&self, number: &str, status: AccrualStatus, accrual: Option<Amount>) -> Result<(), AccrualStoreError>;
        async fn create_reward(&self, rule: &RewardRule) -> Result<(), AccrualStoreError>;
        async fn rewards(&self) -> Result<Vec<RewardRule>, AccrualStoreError>;
    }
}
