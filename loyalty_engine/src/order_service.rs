use std::fmt::Debug;

use log::debug;
use lp_common::is_valid_order_number;
use thiserror::Error;

use crate::{
    db_types::Order,
    traits::{LoyaltyStore, StoreError},
};

#[derive(Debug, Clone, Error)]
pub enum UploadError {
    #[error("Invalid order number")]
    InvalidNumber,
    #[error("The order was already uploaded by this user")]
    AlreadyUploaded,
    #[error("The order was uploaded by another user")]
    UploadedByAnotherUser,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Order claiming and listing for the loyalty service.
pub struct OrderApi<S> {
    store: S,
}

impl<S> Debug for OrderApi<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderApi")
    }
}

impl<S> OrderApi<S>
where S: LoyaltyStore
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Claims `number` for `user_id`.
    ///
    /// The number must pass the mod-10 check. An unclaimed number is persisted as a `NEW` order; the poller
    /// picks it up from there, so this call never contacts the accrual system. If the number is already
    /// claimed, the result depends on who owns it. A concurrent claimant can win the insert race after our
    /// lookup came back empty; the unique constraint reports that, and a single re-lookup resolves the owner.
    pub async fn upload(&self, user_id: i64, number: &str) -> Result<(), UploadError> {
        if !is_valid_order_number(number) {
            return Err(UploadError::InvalidNumber);
        }
        if let Some(order) = self.store.order_by_number(number).await? {
            return Err(owner_conflict(user_id, &order));
        }
        match self.store.create_order(user_id, number).await {
            Ok(()) => {
                debug!("📥️ Order [{number}] claimed by user #{user_id}");
                Ok(())
            },
            Err(StoreError::OrderAlreadyExists) => {
                let order = self.store.order_by_number(number).await?.ok_or(StoreError::NotFound)?;
                Err(owner_conflict(user_id, &order))
            },
            Err(e) => Err(e.into()),
        }
    }

    /// The user's orders, newest upload first.
    pub async fn list(&self, user_id: i64) -> Result<Vec<Order>, StoreError> {
        self.store.orders_by_user(user_id).await
    }
}

fn owner_conflict(user_id: i64, order: &Order) -> UploadError {
    if order.user_id == user_id {
        UploadError::AlreadyUploaded
    } else {
        UploadError::UploadedByAnotherUser
    }
}

#[cfg(test)]
mod test {
    use super::{OrderApi, UploadError};
    use crate::test_utils::MemoryStore;

    #[tokio::test]
    async fn upload_rejects_invalid_numbers() {
        let api = OrderApi::new(MemoryStore::default());
        let err = api.upload(1, "123").await.unwrap_err();
        assert!(matches!(err, UploadError::InvalidNumber));
        let err = api.upload(1, "7992739871a").await.unwrap_err();
        assert!(matches!(err, UploadError::InvalidNumber));
    }

    #[tokio::test]
    async fn upload_claims_new_number() {
        let store = MemoryStore::default();
        let user = store.add_user("user", "hash");
        let api = OrderApi::new(store.clone());
        api.upload(user, "79927398713").await.unwrap();
        let orders = api.list(user).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].number, "79927398713");
    }

    #[tokio::test]
    async fn re_upload_by_same_user_is_reported() {
        let store = MemoryStore::default();
        let user = store.add_user("user", "hash");
        let api = OrderApi::new(store.clone());
        api.upload(user, "79927398713").await.unwrap();
        let err = api.upload(user, "79927398713").await.unwrap_err();
        assert!(matches!(err, UploadError::AlreadyUploaded));
    }

    #[tokio::test]
    async fn upload_of_foreign_number_conflicts() {
        let store = MemoryStore::default();
        let alice = store.add_user("alice", "hash");
        let bob = store.add_user("bob", "hash");
        let api = OrderApi::new(store.clone());
        api.upload(alice, "79927398713").await.unwrap();
        let err = api.upload(bob, "79927398713").await.unwrap_err();
        assert!(matches!(err, UploadError::UploadedByAnotherUser));
    }

    #[tokio::test]
    async fn lost_insert_race_resolves_through_re_lookup() {
        let store = MemoryStore::default();
        let alice = store.add_user("alice", "hash");
        let bob = store.add_user("bob", "hash");
        // Bob's lookup misses, then Alice claims the number before Bob's insert lands.
        store.fail_next_create_order_with_duplicate(alice, "79927398713");
        let api = OrderApi::new(store.clone());
        let err = api.upload(bob, "79927398713").await.unwrap_err();
        assert!(matches!(err, UploadError::UploadedByAnotherUser));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = MemoryStore::default();
        let user = store.add_user("user", "hash");
        let api = OrderApi::new(store.clone());
        api.upload(user, "79927398713").await.unwrap();
        api.upload(user, "2377225624").await.unwrap();
        let orders = api.list(user).await.unwrap();
        let numbers: Vec<&str> = orders.iter().map(|o| o.number.as_str()).collect();
        assert_eq!(numbers, vec!["2377225624", "79927398713"]);
    }
}
