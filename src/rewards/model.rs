//! Reward rule and ledger models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{StoreError, StoreResult};
use crate::models::WasteCategory;

/// Multiplier applied when a category has no entry in the rule table
pub const DEFAULT_MULTIPLIER: f64 = 1.0;

/// Upper bound for `base_points` and `matching_bonus`
pub const MAX_RULE_POINTS: i64 = 1_000_000;

/// Upper bound for any category multiplier
pub const MAX_MULTIPLIER: f64 = 100.0;

/// Reward rule set used when a report is collected
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RewardRules {
    pub base_points: i64,
    pub category_multiplier: BTreeMap<WasteCategory, f64>,
    pub matching_bonus: i64,
}

impl Default for RewardRules {
    fn default() -> Self {
        let category_multiplier = BTreeMap::from([
            (WasteCategory::Organic, 1.0),
            (WasteCategory::Plastic, 1.1),
            (WasteCategory::Construction, 1.2),
            (WasteCategory::Furniture, 1.1),
            (WasteCategory::Hazardous, 1.5),
            (WasteCategory::Other, 1.0),
        ]);

        Self {
            base_points: 10,
            category_multiplier,
            matching_bonus: 5,
        }
    }
}

impl RewardRules {
    /// Multiplier for a category, falling back to [`DEFAULT_MULTIPLIER`]
    pub fn multiplier(&self, category: WasteCategory) -> f64 {
        self.category_multiplier
            .get(&category)
            .copied()
            .unwrap_or(DEFAULT_MULTIPLIER)
    }

    /// Every category needs a multiplier in `[0, MAX_MULTIPLIER]` and point
    /// values must lie in `[0, MAX_RULE_POINTS]`.
    pub fn validate(&self) -> StoreResult<()> {
        if !(0..=MAX_RULE_POINTS).contains(&self.base_points) {
            return Err(StoreError::InvalidRewardRules(format!(
                "Base points must be between 0 and {}",
                MAX_RULE_POINTS
            )));
        }
        if !(0..=MAX_RULE_POINTS).contains(&self.matching_bonus) {
            return Err(StoreError::InvalidRewardRules(format!(
                "Matching bonus must be between 0 and {}",
                MAX_RULE_POINTS
            )));
        }

        for category in WasteCategory::ALL {
            match self.category_multiplier.get(&category) {
                None => {
                    return Err(StoreError::InvalidRewardRules(format!(
                        "Missing multiplier for category '{}'",
                        category
                    )))
                }
                Some(m) if !m.is_finite() || *m < 0.0 || *m > MAX_MULTIPLIER => {
                    return Err(StoreError::InvalidRewardRules(format!(
                        "Multiplier for '{}' must be between 0 and {}",
                        category, MAX_MULTIPLIER
                    )))
                }
                Some(_) => {}
            }
        }

        Ok(())
    }
}

/// Ledger entry written once per collected report
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RewardTransaction {
    pub id: String,
    pub citizen_id: String,
    pub report_id: String,
    pub points: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

/// Reward catalogue entry unlocked at a points threshold
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RewardMilestone {
    pub title: &'static str,
    pub description: &'static str,
    pub points_required: i64,
}

/// Citizen position on the points leaderboard
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub citizen_id: String,
    pub name: String,
    pub points: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_are_valid() {
        let rules = RewardRules::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.multiplier(WasteCategory::Hazardous), 1.5);
    }

    #[test]
    fn test_missing_category_falls_back_to_default_multiplier() {
        let mut rules = RewardRules::default();
        rules.category_multiplier.remove(&WasteCategory::Furniture);
        assert_eq!(rules.multiplier(WasteCategory::Furniture), DEFAULT_MULTIPLIER);
        assert_eq!(
            rules.validate().unwrap_err().error_code(),
            "INVALID_REWARD_RULES"
        );
    }

    #[test]
    fn test_rejects_negative_or_non_finite_values() {
        let mut rules = RewardRules::default();
        rules.base_points = -1;
        assert!(rules.validate().is_err());

        let mut rules = RewardRules::default();
        rules
            .category_multiplier
            .insert(WasteCategory::Plastic, f64::NAN);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn test_rejects_values_above_bounds() {
        let mut rules = RewardRules::default();
        rules.base_points = i64::MAX;
        assert_eq!(
            rules.validate().unwrap_err().error_code(),
            "INVALID_REWARD_RULES"
        );

        let mut rules = RewardRules::default();
        rules.matching_bonus = MAX_RULE_POINTS + 1;
        assert!(rules.validate().is_err());

        let mut rules = RewardRules::default();
        rules
            .category_multiplier
            .insert(WasteCategory::Hazardous, MAX_MULTIPLIER * 2.0);
        assert!(rules.validate().is_err());

        let mut rules = RewardRules::default();
        rules.base_points = MAX_RULE_POINTS;
        rules.matching_bonus = MAX_RULE_POINTS;
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn test_rules_wire_format() {
        let json = serde_json::to_value(RewardRules::default()).unwrap();
        assert_eq!(json["basePoints"], 10);
        assert_eq!(json["matchingBonus"], 5);
        assert_eq!(json["categoryMultiplier"]["hazardous"], 1.5);
    }
}
