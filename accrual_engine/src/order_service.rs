use std::{fmt::Debug, sync::Arc};

use log::{debug, error, info};
use lp_common::is_valid_order_number;
use thiserror::Error;

use crate::{
    rules,
    traits::{AccrualStore, AccrualStoreError},
    types::{AccrualOrder, AccrualStatus, Good},
};

#[derive(Debug, Clone, Error)]
pub enum OrderError {
    #[error("Invalid order number")]
    InvalidNumber,
    #[error("An order with this number already exists")]
    AlreadyExists,
    #[error(transparent)]
    Store(AccrualStoreError),
}

impl From<AccrualStoreError> for OrderError {
    fn from(e: AccrualStoreError) -> Self {
        match e {
            AccrualStoreError::OrderAlreadyExists => OrderError::AlreadyExists,
            e => OrderError::Store(e),
        }
    }
}

/// Order registration and lookup for the accrual service.
///
/// Registration only persists the order; the computation runs in a background task so the caller's latency
/// stays bounded by a single insert. The task moves the order to `PROCESSING`, runs the rule engine over its
/// goods, and persists `PROCESSED` with the total. Only a failure of the engine itself (a store error while
/// computing) yields `INVALID`; an order no rule matches is processed with a zero accrual.
pub struct OrderApi<S> {
    store: Arc<S>,
}

impl<S> Debug for OrderApi<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderApi")
    }
}

impl<S> OrderApi<S>
where S: AccrualStore + 'static
{
    pub fn new(store: S) -> Self {
        Self { store: Arc::new(store) }
    }

    pub async fn register(&self, number: &str, goods: Vec<Good>) -> Result<(), OrderError> {
        if !is_valid_order_number(number) {
            return Err(OrderError::InvalidNumber);
        }
        self.store.create_order(number, &goods).await?;
        info!("🧮️ Order [{number}] registered with {} goods", goods.len());
        let store = Arc::clone(&self.store);
        let number = number.to_string();
        tokio::spawn(async move {
            process_order(store, &number).await;
        });
        Ok(())
    }

    pub async fn order_info(&self, number: &str) -> Result<Option<AccrualOrder>, OrderError> {
        if !is_valid_order_number(number) {
            return Err(OrderError::InvalidNumber);
        }
        Ok(self.store.order_by_number(number).await?)
    }
}

async fn process_order<S: AccrualStore>(store: Arc<S>, number: &str) {
    if let Err(e) = store.update_order(number, AccrualStatus::Processing, None).await {
        error!("🧮️ Could not move order [{number}] to PROCESSING: {e}");
    }
    let total = {
        let rules = match store.rewards().await {
            Ok(rules) => rules,
            Err(e) => {
                error!("🧮️ Could not load the reward rules for order [{number}]: {e}");
                invalidate(&*store, number).await;
                return;
            },
        };
        let order = match store.order_by_number(number).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                error!("🧮️ Order [{number}] disappeared before it could be computed");
                return;
            },
            Err(e) => {
                error!("🧮️ Could not re-read order [{number}]: {e}");
                invalidate(&*store, number).await;
                return;
            },
        };
        rules::accrual_for_order(&rules, &order.goods)
    };
    match store.update_order(number, AccrualStatus::Processed, Some(total)).await {
        Ok(()) => debug!("🧮️ Order [{number}] processed with an accrual of {total}"),
        Err(e) => error!("🧮️ Could not persist the result for order [{number}]: {e}"),
    }
}

async fn invalidate<S: AccrualStore>(store: &S, number: &str) {
    if let Err(e) = store.update_order(number, AccrualStatus::Invalid, None).await {
        error!("🧮️ Could not move order [{number}] to INVALID: {e}");
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use lp_common::Amount;

    use super::{OrderApi, OrderError};
    use crate::{
        test_utils::MemoryStore,
        types::{AccrualStatus, Good, RewardRule, RewardType},
    };

    fn goods() -> Vec<Good> {
        vec![Good { description: "Чайник Bork".to_string(), price: Amount::from_points(7000.0) }]
    }

    async fn wait_for_terminal(api: &OrderApi<MemoryStore>, number: &str) -> AccrualStatus {
        for _ in 0..100 {
            let order = api.order_info(number).await.unwrap().unwrap();
            if matches!(order.status, AccrualStatus::Processed | AccrualStatus::Invalid) {
                return order.status;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("order [{number}] never reached a terminal status");
    }

    #[tokio::test]
    async fn register_rejects_bad_checksums() {
        let api = OrderApi::new(MemoryStore::default());
        let err = api.register("123", goods()).await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidNumber));
    }

    #[tokio::test]
    async fn duplicate_registration_is_a_conflict() {
        let api = OrderApi::new(MemoryStore::default());
        api.register("79927398713", goods()).await.unwrap();
        let err = api.register("79927398713", goods()).await.unwrap_err();
        assert!(matches!(err, OrderError::AlreadyExists));
    }

    #[tokio::test]
    async fn registered_order_is_computed_in_the_background() {
        let store = MemoryStore::default();
        store.add_rule(RewardRule { pattern: "Bork".to_string(), reward: 10.0, reward_type: RewardType::Percent });
        let api = OrderApi::new(store);
        api.register("79927398713", goods()).await.unwrap();
        assert_eq!(wait_for_terminal(&api, "79927398713").await, AccrualStatus::Processed);
        let order = api.order_info("79927398713").await.unwrap().unwrap();
        assert_eq!(order.accrual, Some(Amount::from_points(700.0)));
    }

    #[tokio::test]
    async fn order_without_matching_rules_is_processed_with_zero() {
        let api = OrderApi::new(MemoryStore::default());
        api.register("79927398713", goods()).await.unwrap();
        assert_eq!(wait_for_terminal(&api, "79927398713").await, AccrualStatus::Processed);
        let order = api.order_info("79927398713").await.unwrap().unwrap();
        assert_eq!(order.accrual, Some(Amount::ZERO));
    }

    #[tokio::test]
    async fn engine_failure_invalidates_the_order() {
        let store = MemoryStore::default();
        store.fail_rewards();
        let api = OrderApi::new(store);
        api.register("79927398713", goods()).await.unwrap();
        assert_eq!(wait_for_terminal(&api, "79927398713").await, AccrualStatus::Invalid);
        let order = api.order_info("79927398713").await.unwrap().unwrap();
        assert_eq!(order.accrual, None);
    }

    #[tokio::test]
    async fn order_info_rejects_bad_checksums() {
        let api = OrderApi::new(MemoryStore::default());
        let err = api.order_info("123").await.unwrap_err();
        assert!(matches!(err, OrderError::InvalidNumber));
    }

    #[tokio::test]
    async fn unknown_orders_are_reported_as_absent() {
        let api = OrderApi::new(MemoryStore::default());
        assert!(api.order_info("79927398713").await.unwrap().is_none());
    }
}
