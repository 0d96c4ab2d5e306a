//! Reward point computation, milestones, and leaderboard ranking

use std::collections::BTreeMap;

use super::model::{LeaderboardEntry, RewardMilestone, RewardRules};
use crate::error::{StoreError, StoreResult};
use crate::models::{Citizen, WasteCategory};

pub const REASON_MATCHED: &str = "Collected and classification matched";
pub const REASON_MISMATCHED: &str = "Collected (classification mismatch)";

/// Reward catalogue, ordered by threshold
pub const MILESTONES: [RewardMilestone; 3] = [
    RewardMilestone {
        title: "Eco Warrior Badge",
        description: "Complete 10 reports",
        points_required: 200,
    },
    RewardMilestone {
        title: "Green Champion",
        description: "Complete 25 reports",
        points_required: 500,
    },
    RewardMilestone {
        title: "Eco Hero",
        description: "Complete 50 reports",
        points_required: 1000,
    },
];

/// Outcome of scoring one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardAward {
    pub points: i64,
    pub matched: bool,
}

impl RewardAward {
    pub fn reason(&self) -> &'static str {
        if self.matched {
            REASON_MATCHED
        } else {
            REASON_MISMATCHED
        }
    }
}

/// Score a collection of a report filed under `reported`.
///
/// `round(base_points * multiplier(reported))`, rounding half away from
/// zero, plus the matching bonus when the collector confirmed the same
/// category.
///
/// Rules loaded from a snapshot skip [`RewardRules::validate`], so a
/// result outside the `i64` range is reported instead of wrapping.
pub fn compute_reward(
    rules: &RewardRules,
    reported: WasteCategory,
    confirmed: WasteCategory,
) -> StoreResult<RewardAward> {
    let multiplier = rules.multiplier(reported);
    let matched = reported == confirmed;

    let scaled = (rules.base_points as f64 * multiplier).round();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if !scaled.is_finite() || scaled < i64::MIN as f64 || scaled >= i64::MAX as f64 {
        return Err(out_of_range(reported));
    }
    let bonus = if matched { rules.matching_bonus } else { 0 };

    let points = (scaled as i64)
        .checked_add(bonus)
        .ok_or_else(|| out_of_range(reported))?;

    Ok(RewardAward { points, matched })
}

fn out_of_range(category: WasteCategory) -> StoreError {
    StoreError::InvalidRewardRules(format!(
        "Reward for category '{}' is out of range",
        category
    ))
}

/// First milestone the balance has not reached yet
pub fn next_milestone(points: i64) -> Option<&'static RewardMilestone> {
    MILESTONES.iter().find(|m| points < m.points_required)
}

pub fn unlocked_milestones(points: i64) -> Vec<&'static RewardMilestone> {
    MILESTONES
        .iter()
        .filter(|m| points >= m.points_required)
        .collect()
}

/// Rank citizens by points, highest first; ties are ordered by id and
/// share the rank of the first entry with that score.
pub fn leaderboard(citizens: &BTreeMap<String, Citizen>) -> Vec<LeaderboardEntry> {
    let mut ordered: Vec<&Citizen> = citizens.values().collect();
    ordered.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.id.cmp(&b.id)));

    let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(ordered.len());
    for (index, citizen) in ordered.into_iter().enumerate() {
        let rank = match entries.last() {
            Some(prev) if prev.points == citizen.points => prev.rank,
            _ => index + 1,
        };
        entries.push(LeaderboardEntry {
            rank,
            citizen_id: citizen.id.clone(),
            name: citizen.name.clone(),
            points: citizen.points,
        });
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citizen(id: &str, points: i64) -> Citizen {
        Citizen {
            id: id.to_string(),
            name: id.to_uppercase(),
            email: format!("{}@example.com", id),
            points,
        }
    }

    #[test]
    fn test_plastic_matched_and_mismatched() {
        let rules = RewardRules::default();

        let matched =
            compute_reward(&rules, WasteCategory::Plastic, WasteCategory::Plastic).unwrap();
        assert_eq!(matched.points, 16);
        assert_eq!(matched.reason(), REASON_MATCHED);

        let mismatched =
            compute_reward(&rules, WasteCategory::Plastic, WasteCategory::Organic).unwrap();
        assert_eq!(mismatched.points, 11);
        assert_eq!(mismatched.reason(), REASON_MISMATCHED);
    }

    #[test]
    fn test_hazardous_matched() {
        let rules = RewardRules::default();
        let award =
            compute_reward(&rules, WasteCategory::Hazardous, WasteCategory::Hazardous).unwrap();
        assert_eq!(award.points, 20);
    }

    #[test]
    fn test_multiplier_uses_reported_category() {
        let rules = RewardRules::default();
        // Confirmed as hazardous, but scored on the reported organic multiplier
        let award =
            compute_reward(&rules, WasteCategory::Organic, WasteCategory::Hazardous).unwrap();
        assert_eq!(award.points, 10);
        assert!(!award.matched);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        let mut rules = RewardRules::default();
        rules.base_points = 5;
        rules.category_multiplier.insert(WasteCategory::Other, 1.5);
        // 7.5 rounds up to 8
        let award = compute_reward(&rules, WasteCategory::Other, WasteCategory::Plastic).unwrap();
        assert_eq!(award.points, 8);

        rules.base_points = 1;
        rules.category_multiplier.insert(WasteCategory::Other, 2.5);
        let award = compute_reward(&rules, WasteCategory::Other, WasteCategory::Plastic).unwrap();
        assert_eq!(award.points, 3);
    }

    #[test]
    fn test_missing_multiplier_defaults_to_one() {
        let mut rules = RewardRules::default();
        rules.category_multiplier.clear();
        let award =
            compute_reward(&rules, WasteCategory::Hazardous, WasteCategory::Hazardous).unwrap();
        assert_eq!(award.points, 15);
    }

    #[test]
    fn test_unbounded_rules_are_reported_not_wrapped() {
        let mut rules = RewardRules::default();
        rules.base_points = i64::MAX;
        let err = compute_reward(&rules, WasteCategory::Plastic, WasteCategory::Plastic)
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_REWARD_RULES");

        // Scaled value fits, the bonus pushes it over
        let mut rules = RewardRules::default();
        rules.base_points = 1;
        rules.matching_bonus = i64::MAX;
        assert!(compute_reward(&rules, WasteCategory::Organic, WasteCategory::Organic).is_err());
        assert_eq!(
            compute_reward(&rules, WasteCategory::Organic, WasteCategory::Plastic)
                .unwrap()
                .points,
            1
        );
    }

    #[test]
    fn test_next_milestone() {
        assert_eq!(next_milestone(0).unwrap().points_required, 200);
        assert_eq!(next_milestone(450).unwrap().points_required, 500);
        assert_eq!(next_milestone(500).unwrap().points_required, 1000);
        assert!(next_milestone(1000).is_none());
    }

    #[test]
    fn test_unlocked_milestones() {
        assert!(unlocked_milestones(199).is_empty());
        let unlocked = unlocked_milestones(650);
        assert_eq!(unlocked.len(), 2);
        assert_eq!(unlocked[1].title, "Green Champion");
    }

    #[test]
    fn test_leaderboard_ranks_and_ties() {
        let citizens = BTreeMap::from([
            ("b".to_string(), citizen("b", 300)),
            ("a".to_string(), citizen("a", 300)),
            ("c".to_string(), citizen("c", 900)),
            ("d".to_string(), citizen("d", 10)),
        ]);

        let board = leaderboard(&citizens);
        let ranks: Vec<(usize, &str)> = board
            .iter()
            .map(|e| (e.rank, e.citizen_id.as_str()))
            .collect();
        assert_eq!(ranks, vec![(1, "c"), (2, "a"), (2, "b"), (4, "d")]);
    }
}
