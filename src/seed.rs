//! Default seed data the platform starts from and resets to

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::models::{Availability, Citizen, Collector, Location, PlatformState, WasteCategory};
use crate::report::{Report, ReportStatus};
use crate::rewards::RewardRules;

/// Build the seed state, stamping seeded reports with `now`
pub fn default_state(now: DateTime<Utc>) -> PlatformState {
    let citizens = BTreeMap::from([(
        "user1".to_string(),
        Citizen {
            id: "user1".to_string(),
            name: "John Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            points: 450,
        },
    )]);

    let collectors = vec![
        collector("collector1", "Team Alpha", Availability::Available),
        collector("collector2", "Team Bravo", Availability::Busy),
        collector("collector3", "Team Green", Availability::Available),
    ];

    let reports = vec![
        Report {
            id: "AR-1023".to_string(),
            title: "Illegal dumping on Main Street".to_string(),
            description: "Large pile of construction waste.".to_string(),
            category: WasteCategory::Construction,
            location: Location {
                address: "123 Main St".to_string(),
                lat: 10.8231,
                lng: 106.6297,
            },
            images: vec![],
            created_at: now,
            updated_at: now,
            citizen_id: "user1".to_string(),
            status: ReportStatus::Pending,
            enterprise_decision_at: None,
            enterprise_notes: None,
            assigned_collector_id: None,
            assigned_at: None,
            collector_status: None,
            collector_confirmed_category: None,
            proof_images: None,
            proof_note: None,
            collected_at: None,
        },
        Report {
            id: "AR-1021".to_string(),
            title: "Plastic bottles in park".to_string(),
            description: "Multiple bottles scattered near the lake.".to_string(),
            category: WasteCategory::Plastic,
            location: Location {
                address: "Central Park".to_string(),
                lat: 10.8298,
                lng: 106.6356,
            },
            images: vec![],
            created_at: now,
            updated_at: now,
            citizen_id: "user1".to_string(),
            status: ReportStatus::Accepted,
            enterprise_decision_at: Some(now),
            enterprise_notes: None,
            assigned_collector_id: None,
            assigned_at: None,
            collector_status: None,
            collector_confirmed_category: None,
            proof_images: None,
            proof_note: None,
            collected_at: None,
        },
    ];

    PlatformState {
        citizens,
        collectors,
        reports,
        reward_rules: RewardRules::default(),
        reward_transactions: vec![],
    }
}

fn collector(id: &str, name: &str, availability: Availability) -> Collector {
    Collector {
        id: id.to_string(),
        name: name.to_string(),
        availability,
    }
}
