//! The reward computation: a pure function from registered rules and an order's goods to one points amount.
use lp_common::Amount;

use crate::types::{Good, RewardRule, RewardType};

/// Computes the accrual for an order.
///
/// Goods are visited in input order. The first rule whose pattern occurs in the good's description decides
/// that good's contribution; remaining rules are not consulted for it. A good no rule matches contributes
/// nothing, and no matches at all is a perfectly fine zero result, not a failure.
pub fn accrual_for_order(rules: &[RewardRule], goods: &[Good]) -> Amount {
    goods
        .iter()
        .map(|good| {
            rules
                .iter()
                .find(|rule| good.description.contains(&rule.pattern))
                .map(|rule| reward_for_good(rule, good))
                .unwrap_or(Amount::ZERO)
        })
        .sum()
}

/// Contribution of a single matched good, rounded half-away-from-zero at the hundredths scale.
fn reward_for_good(rule: &RewardRule, good: &Good) -> Amount {
    match rule.reward_type {
        RewardType::Percent => Amount::from_points(good.price.to_points() * rule.reward / 100.0),
        RewardType::Points => Amount::from_points(rule.reward),
    }
}

#[cfg(test)]
mod test {
    use lp_common::Amount;

    use super::accrual_for_order;
    use crate::types::{Good, RewardRule, RewardType};

    fn rule(pattern: &str, reward: f64, reward_type: RewardType) -> RewardRule {
        RewardRule { pattern: pattern.to_string(), reward, reward_type }
    }

    fn good(description: &str, price: f64) -> Good {
        Good { description: description.to_string(), price: Amount::from_points(price) }
    }

    #[test]
    fn percent_of_the_price() {
        let rules = vec![rule("Bork", 10.0, RewardType::Percent)];
        let goods = vec![good("Чайник Bork", 7000.0)];
        assert_eq!(accrual_for_order(&rules, &goods), Amount::from_points(700.0));
    }

    #[test]
    fn fixed_points_per_matching_good() {
        let rules = vec![rule("Bork", 12.5, RewardType::Points)];
        let goods = vec![good("Чайник Bork", 7000.0), good("Тостер Bork", 3000.0)];
        assert_eq!(accrual_for_order(&rules, &goods), Amount::from_points(25.0));
    }

    #[test]
    fn first_matching_rule_wins() {
        let rules = vec![rule("Чайник Bork", 1.0, RewardType::Percent), rule("Bork", 50.0, RewardType::Percent)];
        let goods = vec![good("Чайник Bork", 1000.0)];
        assert_eq!(accrual_for_order(&rules, &goods), Amount::from_points(10.0));
    }

    #[test]
    fn unmatched_goods_contribute_nothing() {
        let rules = vec![rule("Bork", 10.0, RewardType::Percent)];
        let goods = vec![good("Телевизор LG", 40000.0)];
        assert_eq!(accrual_for_order(&rules, &goods), Amount::ZERO);
        assert_eq!(accrual_for_order(&[], &goods), Amount::ZERO);
    }

    #[test]
    fn contributions_round_per_good() {
        // 10% of 0.05 points is 0.005, which rounds up to one hundredth per good.
        let rules = vec![rule("Gum", 10.0, RewardType::Percent)];
        let goods = vec![good("Gum", 0.05), good("Gum", 0.05)];
        assert_eq!(accrual_for_order(&rules, &goods), Amount::from(2));
    }

    #[test]
    fn computation_is_deterministic() {
        let rules = vec![rule("Bork", 7.5, RewardType::Percent), rule("LG", 3.0, RewardType::Points)];
        let goods = vec![good("Чайник Bork", 6999.99), good("Телевизор LG", 40000.0)];
        let first = accrual_for_order(&rules, &goods);
        let second = accrual_for_order(&rules, &goods);
        assert_eq!(first, second);
    }
}
