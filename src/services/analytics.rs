//! Analytics over the platform state

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{PlatformState, WasteCategory};
use crate::report::ReportStatus;

/// Summary of reports, collections, and awarded points
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_reports: usize,
    pub by_status: BTreeMap<ReportStatus, usize>,
    pub by_category: BTreeMap<WasteCategory, usize>,
    pub collected: usize,
    pub total_points_awarded: i64,
    /// Share of collections where the collector confirmed the reported
    /// category; `None` until something has been collected
    pub classification_match_rate: Option<f64>,
    pub collections_by_collector: BTreeMap<String, usize>,
}

pub struct AnalyticsService;

impl AnalyticsService {
    pub fn summarize(state: &PlatformState) -> AnalyticsSummary {
        let mut by_status: BTreeMap<ReportStatus, usize> =
            ReportStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        let mut by_category: BTreeMap<WasteCategory, usize> = BTreeMap::new();
        let mut collections_by_collector: BTreeMap<String, usize> = BTreeMap::new();
        let mut matched = 0usize;

        for report in &state.reports {
            *by_status.entry(report.status).or_insert(0) += 1;
            *by_category.entry(report.category).or_insert(0) += 1;

            if report.status == ReportStatus::Collected {
                if report.classification_matched() == Some(true) {
                    matched += 1;
                }
                if let Some(collector_id) = &report.assigned_collector_id {
                    *collections_by_collector
                        .entry(collector_id.clone())
                        .or_insert(0) += 1;
                }
            }
        }

        let collected = by_status
            .get(&ReportStatus::Collected)
            .copied()
            .unwrap_or(0);
        let classification_match_rate =
            (collected > 0).then(|| matched as f64 / collected as f64);

        AnalyticsSummary {
            total_reports: state.reports.len(),
            by_status,
            by_category,
            collected,
            total_points_awarded: state
                .reward_transactions
                .iter()
                .fold(0i64, |total, t| total.saturating_add(t.points)),
            classification_match_rate,
            collections_by_collector,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::SubmitProofRequest;
    use crate::store::PlatformStore;

    #[test]
    fn test_summary_of_seed() {
        let store = PlatformStore::default();
        let summary = AnalyticsService::summarize(store.state());

        assert_eq!(summary.total_reports, 2);
        assert_eq!(summary.by_status[&ReportStatus::Pending], 1);
        assert_eq!(summary.by_status[&ReportStatus::Accepted], 1);
        assert_eq!(summary.by_status[&ReportStatus::Collected], 0);
        assert_eq!(summary.by_category[&WasteCategory::Plastic], 1);
        assert_eq!(summary.total_points_awarded, 0);
        assert_eq!(summary.classification_match_rate, None);
    }

    #[test]
    fn test_summary_after_collection() {
        let mut store = PlatformStore::default();
        store.assign_collector("AR-1021", "collector3").unwrap();
        store
            .submit_proof(SubmitProofRequest {
                report_id: "AR-1021".to_string(),
                collector_confirmed_category: WasteCategory::Other,
                proof_note: None,
                proof_images: None,
            })
            .unwrap();

        let summary = AnalyticsService::summarize(store.state());
        assert_eq!(summary.collected, 1);
        assert_eq!(summary.total_points_awarded, 11);
        assert_eq!(summary.classification_match_rate, Some(0.0));
        assert_eq!(summary.collections_by_collector["collector3"], 1);
    }
}
