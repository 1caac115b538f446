use async_trait::async_trait;
use loyalty_engine::{
    db_types::{Balance, Order, OrderStatus, User, Withdrawal},
    traits::{LoyaltyStore, StoreError},
};
use lp_common::Amount;
use mockall::mock;

mock! {
    pub Store {}

    #[async_trait]
    impl LoyaltyStore for Store {
        async fn create_user(&self, login: &str, password_hash: &str) -> Result<i64, StoreError>;
        async fn user_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;
        async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
        async fn create_order(&self, user_id: i64, number: &str) -> Result<(), StoreError>;
        async fn order_by_number(&self, number: &str) -> Result<Option<Order>, StoreError>;
        async fn orders_by_user(&self, user_id: i64) -> Result<Vec<Order>, StoreError>;
        async fn orders_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StoreError>;
        async fn update_order_status(&self, number: &str, status: OrderStatus, accrual: Amount) -> Result<(), StoreError>;
        async fn balance(&self, user_id: i64) -> Result<Balance, StoreError>;
        async fn withdraw_balance(&self, user_id: i64, order_number: &str, sum: Amount) -> Result<(), StoreError>;
        async fn withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, StoreError>;
        async fn add_accrual(&self, user_id: i64, amount: Amount) -> Result<(), StoreError>;
    }
}
