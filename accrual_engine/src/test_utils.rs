//! An in-memory [`AccrualStore`] for exercising the services without a database.
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lp_common::Amount;

use crate::{
    traits::{AccrualStore, AccrualStoreError},
    types::{AccrualOrder, AccrualStatus, Good, RewardRule},
};

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    orders: Vec<AccrualOrder>,
    rules: Vec<RewardRule>,
    fail_rewards: bool,
}

impl MemoryStore {
    pub fn add_rule(&self, rule: RewardRule) {
        self.state.lock().unwrap().rules.push(rule);
    }

    /// Makes every subsequent `rewards` call fail, simulating a broken engine.
    pub fn fail_rewards(&self) {
        self.state.lock().unwrap().fail_rewards = true;
    }
}

#[async_trait]
impl AccrualStore for MemoryStore {
    async fn create_order(&self, number: &str, goods: &[Good]) -> Result<(), AccrualStoreError> {
        let mut state = self.state.lock().unwrap();
        if state.orders.iter().any(|o| o.number == number) {
            return Err(AccrualStoreError::OrderAlreadyExists);
        }
        state.orders.push(AccrualOrder {
            number: number.to_string(),
            status: AccrualStatus::Registered,
            accrual: None,
            goods: goods.to_vec(),
        });
        Ok(())
    }

    async fn order_by_number(&self, number: &str) -> Result<Option<AccrualOrder>, AccrualStoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.orders.iter().find(|o| o.number == number).cloned())
    }

    async fn update_order(
        &self,
        number: &str,
        status: AccrualStatus,
        accrual: Option<Amount>,
    ) -> Result<(), AccrualStoreError> {
        let mut state = self.state.lock().unwrap();
        let order = state.orders.iter_mut().find(|o| o.number == number).ok_or(AccrualStoreError::NotFound)?;
        order.status = status;
        order.accrual = accrual;
        Ok(())
    }

    async fn create_reward(&self, rule: &RewardRule) -> Result<(), AccrualStoreError> {
        let mut state = self.state.lock().unwrap();
        if state.rules.iter().any(|r| r.pattern == rule.pattern) {
            return Err(AccrualStoreError::MatchAlreadyExists);
        }
        state.rules.push(rule.clone());
        Ok(())
    }

    async fn rewards(&self) -> Result<Vec<RewardRule>, AccrualStoreError> {
        let state = self.state.lock().unwrap();
        if state.fail_rewards {
            return Err(AccrualStoreError::Database("the reward table is unavailable".to_string()));
        }
        Ok(state.rules.clone())
    }
}
