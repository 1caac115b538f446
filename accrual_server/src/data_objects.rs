use accrual_engine::types::{AccrualOrder, Good, RewardRule, RewardType};
use lp_common::Amount;
use serde::{Deserialize, Serialize};

use crate::errors::ServerError;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterOrderRequest {
    pub order: String,
    #[serde(default)]
    pub goods: Vec<GoodRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoodRequest {
    pub description: String,
    /// Fractional price; converted to hundredths at this boundary.
    pub price: f64,
}

impl RegisterOrderRequest {
    /// Validates the goods list and converts prices to the internal fixed-scale representation.
    pub fn into_goods(self) -> Result<Vec<Good>, ServerError> {
        if self.goods.is_empty() {
            return Err(ServerError::InvalidRequest("the goods list cannot be empty".to_string()));
        }
        self.goods
            .into_iter()
            .map(|good| {
                if good.description.is_empty() || good.price <= 0.0 {
                    return Err(ServerError::InvalidRequest(
                        "every good needs a description and a positive price".to_string(),
                    ));
                }
                Ok(Good { description: good.description, price: Amount::from_points(good.price) })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RewardRequest {
    #[serde(rename = "match")]
    pub pattern: String,
    pub reward: f64,
    pub reward_type: String,
}

impl RewardRequest {
    pub fn into_rule(self) -> Result<RewardRule, ServerError> {
        let reward_type = self
            .reward_type
            .parse::<RewardType>()
            .map_err(|e| ServerError::InvalidRequest(e.to_string()))?;
        Ok(RewardRule { pattern: self.pattern, reward: self.reward, reward_type })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderInfoResponse {
    pub order: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accrual: Option<Amount>,
}

impl From<AccrualOrder> for OrderInfoResponse {
    fn from(order: AccrualOrder) -> Self {
        Self { order: order.number, status: order.status.to_string(), accrual: order.accrual }
    }
}
