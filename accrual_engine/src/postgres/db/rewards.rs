use log::debug;
use sqlx::PgConnection;

use crate::{postgres::db::is_unique_violation, traits::AccrualStoreError, types::RewardRule};

pub async fn insert_reward(rule: &RewardRule, conn: &mut PgConnection) -> Result<(), AccrualStoreError> {
    sqlx::query("INSERT INTO accrual.reward_rules (match, reward, reward_type) VALUES ($1, $2, $3)")
        .bind(&rule.pattern)
        .bind(rule.reward)
        .bind(rule.reward_type.as_str())
        .execute(conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AccrualStoreError::MatchAlreadyExists
            } else {
                AccrualStoreError::from(e)
            }
        })?;
    debug!("🗃️ Reward rule [{}] registered", rule.pattern);
    Ok(())
}

/// Rules in insertion order, which the computation relies on for first-match-wins determinism.
pub async fn fetch_rewards(conn: &mut PgConnection) -> Result<Vec<RewardRule>, sqlx::Error> {
    sqlx::query_as("SELECT match, reward, reward_type FROM accrual.reward_rules ORDER BY id").fetch_all(conn).await
}
