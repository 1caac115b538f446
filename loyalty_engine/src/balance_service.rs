use std::fmt::Debug;

use log::debug;
use lp_common::{is_valid_order_number, Amount};
use thiserror::Error;

use crate::{
    db_types::{Balance, Withdrawal},
    traits::{LoyaltyStore, StoreError},
};

#[derive(Debug, Clone, Error)]
pub enum BalanceError {
    #[error("Invalid order number")]
    InvalidNumber,
    #[error("The withdrawal sum must be positive")]
    InvalidSum,
    #[error("Insufficient funds to complete the withdrawal")]
    InsufficientFunds,
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for BalanceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InsufficientFunds => BalanceError::InsufficientFunds,
            e => BalanceError::Store(e),
        }
    }
}

/// Balance reads and the withdrawal engine.
pub struct BalanceApi<S> {
    store: S,
}

impl<S> Debug for BalanceApi<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BalanceApi")
    }
}

impl<S> BalanceApi<S>
where S: LoyaltyStore
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn balance(&self, user_id: i64) -> Result<Balance, StoreError> {
        self.store.balance(user_id).await
    }

    /// Debits the user's balance against `order_number`.
    ///
    /// The number is a claim identifier supplied by the user and only has to pass the mod-10 check; it does
    /// not have to be one of the user's accrual orders. The debit itself, the `withdrawn` counter and the
    /// journal entry commit in one store transaction.
    pub async fn withdraw(&self, user_id: i64, order_number: &str, sum: Amount) -> Result<(), BalanceError> {
        if !is_valid_order_number(order_number) {
            return Err(BalanceError::InvalidNumber);
        }
        if !sum.is_positive() {
            return Err(BalanceError::InvalidSum);
        }
        self.store.withdraw_balance(user_id, order_number, sum).await?;
        debug!("💸️ User #{user_id} withdrew {sum} against order [{order_number}]");
        Ok(())
    }

    pub async fn withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, StoreError> {
        self.store.withdrawals(user_id).await
    }
}

#[cfg(test)]
mod test {
    use lp_common::Amount;

    use super::{BalanceApi, BalanceError};
    use crate::test_utils::MemoryStore;

    #[tokio::test]
    async fn withdraw_validates_number_and_sum() {
        let store = MemoryStore::default();
        let user = store.add_user("user", "hash");
        let api = BalanceApi::new(store);
        let err = api.withdraw(user, "123", Amount::from(100)).await.unwrap_err();
        assert!(matches!(err, BalanceError::InvalidNumber));
        let err = api.withdraw(user, "2377225624", Amount::ZERO).await.unwrap_err();
        assert!(matches!(err, BalanceError::InvalidSum));
        let err = api.withdraw(user, "2377225624", Amount::from(-100)).await.unwrap_err();
        assert!(matches!(err, BalanceError::InvalidSum));
    }

    #[tokio::test]
    async fn withdraw_debits_and_journals() {
        let store = MemoryStore::default();
        let user = store.add_user("user", "hash");
        store.set_balance(user, Amount::from(1250));
        let api = BalanceApi::new(store.clone());
        api.withdraw(user, "2377225624", Amount::from(500)).await.unwrap();
        let balance = api.balance(user).await.unwrap();
        assert_eq!(balance.current, Amount::from(750));
        assert_eq!(balance.withdrawn, Amount::from(500));
        let journal = api.withdrawals(user).await.unwrap();
        assert_eq!(journal.len(), 1);
        assert_eq!(journal[0].order_number, "2377225624");
        assert_eq!(journal[0].sum, Amount::from(500));
    }

    #[tokio::test]
    async fn overdraw_is_rejected_without_writes() {
        let store = MemoryStore::default();
        let user = store.add_user("user", "hash");
        store.set_balance(user, Amount::from(750));
        let api = BalanceApi::new(store.clone());
        let err = api.withdraw(user, "2377225624", Amount::from(10_000)).await.unwrap_err();
        assert!(matches!(err, BalanceError::InsufficientFunds));
        let balance = api.balance(user).await.unwrap();
        assert_eq!(balance.current, Amount::from(750));
        assert_eq!(balance.withdrawn, Amount::ZERO);
        assert!(api.withdrawals(user).await.unwrap().is_empty());
    }
}
