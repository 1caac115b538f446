use std::{fmt::Display, iter::Sum, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

use crate::op;

//--------------------------------------      Amount       -----------------------------------------------------------

/// A quantity of loyalty points, stored as a signed count of hundredths of one point.
///
/// All balance arithmetic happens on this integer representation. The fractional form that appears on the wire
/// (`12.5` points) only exists at the JSON boundary; [`Amount::from_points`] and [`Amount::to_points`] convert
/// between the two, rounding half-away-from-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Type)]
#[sqlx(transparent)]
pub struct Amount(i64);

op!(binary Amount, Add, add);
op!(binary Amount, Sub, sub);
op!(inplace Amount, AddAssign, add_assign);
op!(inplace Amount, SubAssign, sub_assign);
op!(unary Amount, Neg, neg);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as an Amount: {0}")]
pub struct AmountConversionError(String);

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl TryFrom<f64> for Amount {
    type Error = AmountConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let hundredths = (value * 100.0).round();
        if !hundredths.is_finite() || hundredths.abs() >= i64::MAX as f64 {
            return Err(AmountConversionError(format!("{value} is out of range")));
        }
        Ok(Self(hundredths as i64))
    }
}

impl FromStr for Amount {
    type Err = AmountConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().parse::<f64>().map_err(|e| AmountConversionError(format!("{s}: {e}")))?;
        Self::try_from(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.to_points())
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::default(), |acc, a| acc + a)
    }
}

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// The raw count of hundredths.
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Converts a fractional points value, rounding half-away-from-zero at the hundredths scale.
    /// Out-of-range inputs saturate; use [`TryFrom<f64>`] when that must be an error.
    pub fn from_points(points: f64) -> Self {
        Self::try_from(points).unwrap_or(Amount(if points < 0.0 { i64::MIN } else { i64::MAX }))
    }

    /// The fractional external representation.
    pub fn to_points(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_points())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let points = f64::deserialize(deserializer)?;
        Amount::try_from(points).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::Amount;

    #[test]
    fn conversion_rounds_half_away_from_zero() {
        assert_eq!(Amount::from_points(12.5).value(), 1250);
        assert_eq!(Amount::from_points(0.005).value(), 1);
        assert_eq!(Amount::from_points(-0.005).value(), -1);
        assert_eq!(Amount::from_points(729.994).value(), 72999);
        assert_eq!(Amount::from_points(729.995).value(), 73000);
    }

    #[test]
    fn arithmetic() {
        let mut a = Amount::from(1250);
        a += Amount::from(250);
        assert_eq!(a, Amount::from(1500));
        a -= Amount::from(500);
        assert_eq!(a, Amount::from(1000));
        assert_eq!(-a, Amount::from(-1000));
        assert_eq!(a + Amount::from(1), Amount::from(1001));
        let total: Amount = [Amount::from(10), Amount::from(32)].into_iter().sum();
        assert_eq!(total, Amount::from(42));
    }

    #[test]
    fn display_is_fractional() {
        assert_eq!(Amount::from(1250).to_string(), "12.50");
        assert_eq!(Amount::from(0).to_string(), "0.00");
    }

    #[test]
    fn json_round_trip() {
        let amount: Amount = serde_json::from_str("12.5").unwrap();
        assert_eq!(amount.value(), 1250);
        assert_eq!(serde_json::to_string(&amount).unwrap(), "12.5");
        let whole: Amount = serde_json::from_str("5").unwrap();
        assert_eq!(whole.value(), 500);
    }
}
