//! An in-memory [`LoyaltyStore`] for exercising the services and the poller without a database. It honours
//! the same contracts as the Postgres store: unique logins and numbers, exactly-once crediting, and
//! no-write-on-insufficient-funds.
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use lp_common::Amount;

use crate::{
    db_types::{Balance, Order, OrderStatus, User, Withdrawal},
    traits::{LoyaltyStore, StoreError},
};

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    orders: Vec<Order>,
    withdrawals: Vec<(i64, Withdrawal)>,
    next_user_id: i64,
    next_order_id: i64,
    // (owner, number) claimed between a caller's lookup and insert, to script the upload race.
    pending_race: Option<(i64, String)>,
}

impl MemoryStore {
    pub fn add_user(&self, login: &str, password_hash: &str) -> i64 {
        let mut state = self.state.lock().unwrap();
        state.next_user_id += 1;
        let id = state.next_user_id;
        state.users.push(User {
            id,
            login: login.to_string(),
            password_hash: password_hash.to_string(),
            balance: Amount::ZERO,
            withdrawn: Amount::ZERO,
            created_at: Utc::now(),
        });
        id
    }

    pub fn add_order(&self, user_id: i64, number: &str, status: OrderStatus) {
        let mut state = self.state.lock().unwrap();
        state.next_order_id += 1;
        let id = state.next_order_id;
        state.orders.push(Order {
            id,
            user_id,
            number: number.to_string(),
            status,
            accrual: Amount::ZERO,
            uploaded_at: Utc::now(),
        });
    }

    pub fn set_balance(&self, user_id: i64, balance: Amount) {
        let mut state = self.state.lock().unwrap();
        let user = state.users.iter_mut().find(|u| u.id == user_id).expect("unknown user");
        user.balance = balance;
    }

    /// Scripts a lost insert race: the next `create_order` call fails with a duplicate, as if `winner`
    /// claimed `number` between the caller's lookup and insert.
    pub fn fail_next_create_order_with_duplicate(&self, winner: i64, number: &str) {
        let mut state = self.state.lock().unwrap();
        state.pending_race = Some((winner, number.to_string()));
    }
}

#[async_trait]
impl LoyaltyStore for MemoryStore {
    async fn create_user(&self, login: &str, password_hash: &str) -> Result<i64, StoreError> {
        {
            let state = self.state.lock().unwrap();
            if state.users.iter().any(|u| u.login == login) {
                return Err(StoreError::UserAlreadyExists);
            }
        }
        Ok(self.add_user(login, password_hash))
    }

    async fn user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.login == login).cloned())
    }

    async fn user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_order(&self, user_id: i64, number: &str) -> Result<(), StoreError> {
        {
            let mut state = self.state.lock().unwrap();
            if let Some((winner, raced_number)) = state.pending_race.take() {
                if raced_number == number {
                    drop(state);
                    self.add_order(winner, &raced_number, OrderStatus::New);
                    return Err(StoreError::OrderAlreadyExists);
                }
                state.pending_race = Some((winner, raced_number));
            }
            if state.orders.iter().any(|o| o.number == number) {
                return Err(StoreError::OrderAlreadyExists);
            }
        }
        self.add_order(user_id, number, OrderStatus::New);
        Ok(())
    }

    async fn order_by_number(&self, number: &str) -> Result<Option<Order>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.orders.iter().find(|o| o.number == number).cloned())
    }

    async fn orders_by_user(&self, user_id: i64) -> Result<Vec<Order>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut orders: Vec<Order> = state.orders.iter().filter(|o| o.user_id == user_id).cloned().collect();
        orders.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn orders_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.orders.iter().filter(|o| o.status == status).cloned().collect())
    }

    async fn update_order_status(&self, number: &str, status: OrderStatus, accrual: Amount) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let order = state.orders.iter().position(|o| o.number == number).ok_or(StoreError::NotFound)?;
        let (user_id, current) = (state.orders[order].user_id, state.orders[order].status);
        if current.is_terminal() {
            return Ok(());
        }
        if status == OrderStatus::Processed {
            let user = state.users.iter_mut().find(|u| u.id == user_id).ok_or(StoreError::NotFound)?;
            user.balance += accrual;
        }
        state.orders[order].status = status;
        state.orders[order].accrual = accrual;
        Ok(())
    }

    async fn balance(&self, user_id: i64) -> Result<Balance, StoreError> {
        let state = self.state.lock().unwrap();
        let user = state.users.iter().find(|u| u.id == user_id).ok_or(StoreError::NotFound)?;
        Ok(Balance { current: user.balance, withdrawn: user.withdrawn })
    }

    async fn withdraw_balance(&self, user_id: i64, order_number: &str, sum: Amount) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let user = state.users.iter_mut().find(|u| u.id == user_id).ok_or(StoreError::NotFound)?;
        if user.balance < sum {
            return Err(StoreError::InsufficientFunds);
        }
        user.balance -= sum;
        user.withdrawn += sum;
        state.withdrawals.push((user_id, Withdrawal {
            order_number: order_number.to_string(),
            sum,
            processed_at: Utc::now(),
        }));
        Ok(())
    }

    async fn withdrawals(&self, user_id: i64) -> Result<Vec<Withdrawal>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut entries: Vec<Withdrawal> =
            state.withdrawals.iter().filter(|(id, _)| *id == user_id).map(|(_, w)| w.clone()).collect();
        entries.sort_by(|a, b| b.processed_at.cmp(&a.processed_at));
        Ok(entries)
    }

    async fn add_accrual(&self, user_id: i64, amount: Amount) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let user = state.users.iter_mut().find(|u| u.id == user_id).ok_or(StoreError::NotFound)?;
        user.balance += amount;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use lp_common::Amount;

    use super::MemoryStore;
    use crate::{db_types::OrderStatus, traits::LoyaltyStore};

    #[tokio::test]
    async fn repeated_processed_transitions_credit_once() {
        let store = MemoryStore::default();
        let user = store.add_user("user", "hash");
        store.add_order(user, "79927398713", OrderStatus::New);
        for _ in 0..3 {
            store.update_order_status("79927398713", OrderStatus::Processed, Amount::from(1250)).await.unwrap();
        }
        assert_eq!(store.balance(user).await.unwrap().current, Amount::from(1250));
    }

    #[tokio::test]
    async fn late_processing_update_does_not_unseat_processed() {
        let store = MemoryStore::default();
        let user = store.add_user("user", "hash");
        store.add_order(user, "79927398713", OrderStatus::New);
        store.update_order_status("79927398713", OrderStatus::Processed, Amount::from(1250)).await.unwrap();
        // A straggling PROCESSING report can neither demote the order nor re-trigger a credit.
        store.update_order_status("79927398713", OrderStatus::Processing, Amount::ZERO).await.unwrap();
        let order = store.order_by_number("79927398713").await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Processed);
        assert_eq!(order.accrual, Amount::from(1250));
        assert_eq!(store.balance(user).await.unwrap().current, Amount::from(1250));
    }
}
