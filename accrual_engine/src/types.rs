use std::{fmt::Display, str::FromStr};

use lp_common::Amount;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

//--------------------------------------    AccrualStatus    ---------------------------------------------------------

/// Computation state of a registered order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccrualStatus {
    /// Registered, computation not started.
    Registered,
    /// Computation in progress.
    Processing,
    /// Computation finished; the accrual amount is final.
    Processed,
    /// The order was not accepted for computation; nothing will be awarded.
    Invalid,
}

impl AccrualStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccrualStatus::Registered => "REGISTERED",
            AccrualStatus::Processing => "PROCESSING",
            AccrualStatus::Processed => "PROCESSED",
            AccrualStatus::Invalid => "INVALID",
        }
    }
}

impl Display for AccrualStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid accrual status: {0}")]
pub struct StatusConversionError(String);

impl FromStr for AccrualStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGISTERED" => Ok(Self::Registered),
            "PROCESSING" => Ok(Self::Processing),
            "PROCESSED" => Ok(Self::Processed),
            "INVALID" => Ok(Self::Invalid),
            s => Err(StatusConversionError(s.to_string())),
        }
    }
}

impl TryFrom<String> for AccrualStatus {
    type Error = StatusConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

//--------------------------------------        Good         ---------------------------------------------------------

/// One purchased item of an order. Descriptions are free text; rules match on substrings of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Good {
    pub description: String,
    pub price: Amount,
}

//--------------------------------------    AccrualOrder     ---------------------------------------------------------

#[derive(Debug, Clone, FromRow)]
pub struct AccrualOrder {
    pub number: String,
    #[sqlx(try_from = "String")]
    pub status: AccrualStatus,
    /// Absent until the computation finishes successfully.
    pub accrual: Option<Amount>,
    #[sqlx(json)]
    pub goods: Vec<Good>,
}

//--------------------------------------     RewardType      ---------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardType {
    /// Percentage of the good's price.
    Percent,
    /// A fixed points amount per matching good.
    Points,
}

impl RewardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardType::Percent => "%",
            RewardType::Points => "pt",
        }
    }
}

impl Display for RewardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid reward type: {0}")]
pub struct RewardTypeConversionError(String);

impl FromStr for RewardType {
    type Err = RewardTypeConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "%" => Ok(Self::Percent),
            "pt" => Ok(Self::Points),
            s => Err(RewardTypeConversionError(s.to_string())),
        }
    }
}

impl TryFrom<String> for RewardType {
    type Error = RewardTypeConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

//--------------------------------------     RewardRule      ---------------------------------------------------------

/// A reward mechanic registered by the merchant. The first rule whose `pattern` occurs in a good's
/// description decides that good's contribution.
#[derive(Debug, Clone, FromRow)]
pub struct RewardRule {
    #[sqlx(rename = "match")]
    pub pattern: String,
    /// A percentage for [`RewardType::Percent`], a fractional points value for [`RewardType::Points`].
    pub reward: f64,
    #[sqlx(try_from = "String")]
    pub reward_type: RewardType,
}

#[cfg(test)]
mod test {
    use super::{AccrualStatus, RewardType};

    #[test]
    fn status_round_trips() {
        for status in
            [AccrualStatus::Registered, AccrualStatus::Processing, AccrualStatus::Processed, AccrualStatus::Invalid]
        {
            assert_eq!(status.to_string().parse::<AccrualStatus>().unwrap(), status);
        }
        assert!("NEW".parse::<AccrualStatus>().is_err());
    }

    #[test]
    fn reward_type_round_trips() {
        assert_eq!("%".parse::<RewardType>().unwrap(), RewardType::Percent);
        assert_eq!("pt".parse::<RewardType>().unwrap(), RewardType::Points);
        assert!("points".parse::<RewardType>().is_err());
    }
}
