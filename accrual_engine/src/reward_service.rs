use std::fmt::Debug;

use log::info;
use thiserror::Error;

use crate::{
    traits::{AccrualStore, AccrualStoreError},
    types::RewardRule,
};

#[derive(Debug, Clone, Error)]
pub enum RewardError {
    #[error("The match key cannot be empty")]
    EmptyMatch,
    #[error("The reward must be positive")]
    InvalidReward,
    #[error("A reward rule with this match already exists")]
    MatchAlreadyExists,
    #[error(transparent)]
    Store(AccrualStoreError),
}

impl From<AccrualStoreError> for RewardError {
    fn from(e: AccrualStoreError) -> Self {
        match e {
            AccrualStoreError::MatchAlreadyExists => RewardError::MatchAlreadyExists,
            e => RewardError::Store(e),
        }
    }
}

/// Registration of reward mechanics. Rules are append-only and never mutated.
pub struct RewardApi<S> {
    store: S,
}

impl<S> Debug for RewardApi<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RewardApi")
    }
}

impl<S> RewardApi<S>
where S: AccrualStore
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn register(&self, rule: RewardRule) -> Result<(), RewardError> {
        if rule.pattern.trim().is_empty() {
            return Err(RewardError::EmptyMatch);
        }
        if !(rule.reward > 0.0) {
            return Err(RewardError::InvalidReward);
        }
        self.store.create_reward(&rule).await?;
        info!("🎁️ Reward rule [{}] registered: {} {}", rule.pattern, rule.reward, rule.reward_type);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{RewardApi, RewardError};
    use crate::{
        test_utils::MemoryStore,
        types::{RewardRule, RewardType},
    };

    fn rule(pattern: &str, reward: f64) -> RewardRule {
        RewardRule { pattern: pattern.to_string(), reward, reward_type: RewardType::Percent }
    }

    #[tokio::test]
    async fn valid_rules_are_persisted() {
        let api = RewardApi::new(MemoryStore::default());
        api.register(rule("Bork", 10.0)).await.unwrap();
    }

    #[tokio::test]
    async fn empty_match_is_rejected() {
        let api = RewardApi::new(MemoryStore::default());
        for pattern in ["", "   "] {
            let err = api.register(rule(pattern, 10.0)).await.unwrap_err();
            assert!(matches!(err, RewardError::EmptyMatch));
        }
    }

    #[tokio::test]
    async fn non_positive_rewards_are_rejected() {
        let api = RewardApi::new(MemoryStore::default());
        for reward in [0.0, -5.0, f64::NAN] {
            let err = api.register(rule("Bork", reward)).await.unwrap_err();
            assert!(matches!(err, RewardError::InvalidReward));
        }
    }

    #[tokio::test]
    async fn duplicate_matches_conflict() {
        let api = RewardApi::new(MemoryStore::default());
        api.register(rule("Bork", 10.0)).await.unwrap();
        let err = api.register(rule("Bork", 20.0)).await.unwrap_err();
        assert!(matches!(err, RewardError::MatchAlreadyExists));
    }
}
