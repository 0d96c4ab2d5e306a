//! Data models shared across the waste platform

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::StoreError;
use crate::report::Report;
use crate::rewards::{RewardRules, RewardTransaction};

/// Waste category reported by citizens and confirmed by collectors
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum WasteCategory {
    Plastic,
    Construction,
    Furniture,
    Hazardous,
    Organic,
    Other,
}

impl WasteCategory {
    pub const ALL: [WasteCategory; 6] = [
        WasteCategory::Plastic,
        WasteCategory::Construction,
        WasteCategory::Furniture,
        WasteCategory::Hazardous,
        WasteCategory::Organic,
        WasteCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WasteCategory::Plastic => "plastic",
            WasteCategory::Construction => "construction",
            WasteCategory::Furniture => "furniture",
            WasteCategory::Hazardous => "hazardous",
            WasteCategory::Organic => "organic",
            WasteCategory::Other => "other",
        }
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WasteCategory {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WasteCategory::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StoreError::ValidationError(format!("Unknown waste category: '{}'", s)))
    }
}

/// Geolocation plus human-readable address
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Validate)]
pub struct Location {
    pub address: String,
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be within [-90, 90]"))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be within [-180, 180]"))]
    pub lng: f64,
}

/// Citizen account with its running reward balance
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Citizen {
    pub id: String,
    pub name: String,
    pub email: String,
    pub points: i64,
}

/// Collector team availability
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Busy,
    Offline,
}

/// Collection team on the roster
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Collector {
    pub id: String,
    pub name: String,
    pub availability: Availability,
}

/// Complete platform state, also the persisted snapshot format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformState {
    pub citizens: BTreeMap<String, Citizen>,
    pub collectors: Vec<Collector>,
    /// Most recent first
    pub reports: Vec<Report>,
    pub reward_rules: RewardRules,
    /// Most recent first; entries are never modified or removed
    pub reward_transactions: Vec<RewardTransaction>,
}

impl PlatformState {
    pub fn report(&self, report_id: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.id == report_id)
    }

    pub fn collector(&self, collector_id: &str) -> Option<&Collector> {
        self.collectors.iter().find(|c| c.id == collector_id)
    }

    /// Sum of transaction points per citizen
    pub fn awarded_points(&self) -> BTreeMap<String, i64> {
        let mut totals = BTreeMap::new();
        for tx in &self.reward_transactions {
            let total = totals.entry(tx.citizen_id.clone()).or_insert(0i64);
            *total = total.saturating_add(tx.points);
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!(
            "Hazardous".parse::<WasteCategory>().unwrap(),
            WasteCategory::Hazardous
        );
        assert_eq!(
            " plastic ".parse::<WasteCategory>().unwrap(),
            WasteCategory::Plastic
        );
        let err = "glass".parse::<WasteCategory>().unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&WasteCategory::Construction).unwrap();
        assert_eq!(json, "\"construction\"");
        for category in WasteCategory::ALL {
            assert_eq!(category.to_string(), category.as_str());
        }
    }

    #[test]
    fn test_availability_keeps_display_casing() {
        let json = serde_json::to_string(&Availability::Busy).unwrap();
        assert_eq!(json, "\"Busy\"");
    }
}
