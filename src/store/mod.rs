//! Report lifecycle store
//!
//! Single source of truth for reports, the collector roster, reward rules,
//! and the reward ledger. Every mutation goes through the operations below
//! and either applies completely or leaves the state untouched.

use chrono::Utc;
use rand::Rng;
use std::collections::BTreeMap;
use validator::Validate;

use crate::error::{StoreError, StoreResult};
use crate::models::{Citizen, Collector, PlatformState};
use crate::report::{
    CollectorTask, CollectorTaskStatus, CreateReportRequest, Report, ReportStatus,
    SubmitProofRequest,
};
use crate::rewards::{compute_reward, RewardRules, RewardTransaction};
use crate::seed;

/// Synchronous, single-writer lifecycle store
#[derive(Debug, Clone)]
pub struct PlatformStore {
    state: PlatformState,
    seed: PlatformState,
    /// Balance each citizen had before any transaction in the current log
    opening_balances: BTreeMap<String, i64>,
}

impl Default for PlatformStore {
    fn default() -> Self {
        Self::new(seed::default_state(Utc::now()))
    }
}

impl PlatformStore {
    /// Start from the given seed
    pub fn new(seed: PlatformState) -> Self {
        Self::with_state(seed.clone(), seed)
    }

    /// Resume from a previously persisted state; `seed` is what
    /// [`PlatformStore::reset`] restores.
    ///
    /// Opening balances always come from the seed, so a persisted balance
    /// that disagrees with its ledger is caught by
    /// [`PlatformStore::verify_ledger`].
    pub fn with_state(state: PlatformState, seed: PlatformState) -> Self {
        let opening_balances = opening_balances(&seed);
        Self {
            state,
            seed,
            opening_balances,
        }
    }

    pub fn state(&self) -> &PlatformState {
        &self.state
    }

    pub fn seed(&self) -> &PlatformState {
        &self.seed
    }

    // ===== Operations =====

    /// Restore the seed captured when the store was built
    pub fn reset(&mut self) {
        self.state = self.seed.clone();
        tracing::info!("Platform state reset to seed data");
    }

    /// File a new report in `pending`, placed first in the collection
    pub fn create_report(&mut self, request: CreateReportRequest) -> StoreResult<Report> {
        request.validate()?;

        let now = Utc::now();
        let id = self.unique_id("AR", |store, id| store.state.report(id).is_some());

        let report = Report {
            id,
            title: request.title,
            description: request.description,
            category: request.category,
            location: request.location,
            images: request.images,
            created_at: now,
            updated_at: now,
            citizen_id: request.citizen_id,
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
        };

        tracing::info!(
            report_id = %report.id,
            citizen_id = %report.citizen_id,
            category = %report.category,
            "Report created"
        );

        self.state.reports.insert(0, report.clone());
        Ok(report)
    }

    /// Enterprise accepts a report. No prior status is required.
    pub fn accept_report(&mut self, report_id: &str) -> StoreResult<()> {
        let report = self.open_report_mut(report_id)?;
        let now = Utc::now();

        report.status = ReportStatus::Accepted;
        report.enterprise_decision_at = Some(now);
        report.clear_assignment();
        report.updated_at = now;

        tracing::info!(report_id = %report_id, "Report accepted");
        Ok(())
    }

    /// Enterprise rejects a report, replacing any previous decision note
    pub fn reject_report(&mut self, report_id: &str, note: Option<String>) -> StoreResult<()> {
        let report = self.open_report_mut(report_id)?;
        let now = Utc::now();

        report.status = ReportStatus::Rejected;
        report.enterprise_decision_at = Some(now);
        report.enterprise_notes = note;
        report.clear_assignment();
        report.updated_at = now;

        tracing::info!(report_id = %report_id, "Report rejected");
        Ok(())
    }

    /// Hand a report to a collector. The collector id is not checked
    /// against the roster and availability is left as is.
    pub fn assign_collector(&mut self, report_id: &str, collector_id: &str) -> StoreResult<()> {
        let on_roster = self.state.collector(collector_id).is_some();

        let report = self.open_report_mut(report_id)?;
        let now = Utc::now();

        report.status = ReportStatus::Assigned;
        report.assigned_collector_id = Some(collector_id.to_string());
        report.assigned_at = Some(now);
        report.collector_status = Some(CollectorTaskStatus::Assigned);
        report.updated_at = now;

        if !on_roster {
            tracing::warn!(
                report_id = %report_id,
                collector_id = %collector_id,
                "Assigned collector is not on the roster"
            );
        }
        tracing::info!(report_id = %report_id, collector_id = %collector_id, "Collector assigned");
        Ok(())
    }

    /// Update only the collector-facing status; the report status is unchanged
    pub fn set_collector_status(
        &mut self,
        report_id: &str,
        status: CollectorTaskStatus,
    ) -> StoreResult<()> {
        let report = self.open_report_mut(report_id)?;

        report.collector_status = Some(status);
        report.updated_at = Utc::now();

        tracing::info!(report_id = %report_id, status = status.label(), "Collector status updated");
        Ok(())
    }

    /// Record proof of collection and credit the reporting citizen.
    ///
    /// Writes exactly one ledger entry, credits the citizen by the same
    /// amount, and closes the report. Only an `assigned` report can be
    /// collected, and only once.
    pub fn submit_proof(&mut self, request: SubmitProofRequest) -> StoreResult<RewardTransaction> {
        let index = self
            .state
            .reports
            .iter()
            .position(|r| r.id == request.report_id)
            .ok_or_else(|| {
                tracing::debug!(report_id = %request.report_id, "Proof submitted for unknown report");
                StoreError::ReportNotFound(request.report_id.clone())
            })?;

        let (category, citizen_id) = {
            let report = &self.state.reports[index];
            if report.is_closed() {
                return Err(StoreError::AlreadyCollected(report.id.clone()));
            }
            if report.status != ReportStatus::Assigned {
                return Err(StoreError::NotAssigned(report.id.clone()));
            }
            (report.category, report.citizen_id.clone())
        };

        let balance = self
            .state
            .citizens
            .get(&citizen_id)
            .map(|c| c.points)
            .ok_or_else(|| StoreError::CitizenNotFound(citizen_id.clone()))?;

        let award = compute_reward(
            &self.state.reward_rules,
            category,
            request.collector_confirmed_category,
        )?;
        let new_balance = balance
            .checked_add(award.points)
            .ok_or_else(|| StoreError::PointsOverflow(citizen_id.clone()))?;

        let now = Utc::now();
        let tx = RewardTransaction {
            id: self.unique_id("TX", |store, id| {
                store.state.reward_transactions.iter().any(|t| t.id == id)
            }),
            citizen_id: citizen_id.clone(),
            report_id: request.report_id.clone(),
            points: award.points,
            reason: award.reason().to_string(),
            created_at: now,
        };

        // All checks passed; nothing below can fail.
        if let Some(citizen) = self.state.citizens.get_mut(&citizen_id) {
            citizen.points = new_balance;
        }
        self.state.reward_transactions.insert(0, tx.clone());

        let report = &mut self.state.reports[index];
        report.status = ReportStatus::Collected;
        report.collector_status = Some(CollectorTaskStatus::Collected);
        report.collector_confirmed_category = Some(request.collector_confirmed_category);
        report.proof_note = request.proof_note;
        report.proof_images = Some(request.proof_images.unwrap_or_default());
        report.collected_at = Some(now);
        report.updated_at = now;

        tracing::info!(
            report_id = %tx.report_id,
            citizen_id = %tx.citizen_id,
            transaction_id = %tx.id,
            points = tx.points,
            matched = award.matched,
            "Report collected and reward credited"
        );

        Ok(tx)
    }

    /// Replace the reward rules; only later collections are affected
    pub fn update_reward_rules(&mut self, rules: RewardRules) -> StoreResult<()> {
        rules.validate()?;
        self.state.reward_rules = rules;
        tracing::info!(
            base_points = self.state.reward_rules.base_points,
            matching_bonus = self.state.reward_rules.matching_bonus,
            "Reward rules updated"
        );
        Ok(())
    }

    /// Check every citizen balance against opening balance plus ledger
    pub fn verify_ledger(&self) -> StoreResult<()> {
        let awarded = self.state.awarded_points();

        for citizen in self.state.citizens.values() {
            let opening = self
                .opening_balances
                .get(&citizen.id)
                .copied()
                .unwrap_or(0);
            let expected =
                opening.saturating_add(awarded.get(&citizen.id).copied().unwrap_or(0));
            if citizen.points != expected {
                return Err(StoreError::LedgerMismatch {
                    citizen_id: citizen.id.clone(),
                    expected,
                    actual: citizen.points,
                });
            }
        }

        Ok(())
    }

    // ===== Queries =====

    pub fn report(&self, report_id: &str) -> Option<&Report> {
        self.state.report(report_id)
    }

    pub fn reports(&self) -> &[Report] {
        &self.state.reports
    }

    pub fn citizen(&self, citizen_id: &str) -> Option<&Citizen> {
        self.state.citizens.get(citizen_id)
    }

    pub fn collectors(&self) -> &[Collector] {
        &self.state.collectors
    }

    pub fn collector(&self, collector_id: &str) -> Option<&Collector> {
        self.state.collector(collector_id)
    }

    pub fn reward_rules(&self) -> &RewardRules {
        &self.state.reward_rules
    }

    pub fn transactions(&self) -> &[RewardTransaction] {
        &self.state.reward_transactions
    }

    /// Reports waiting for an enterprise decision
    pub fn pending_requests(&self) -> Vec<&Report> {
        self.reports_with_status(ReportStatus::Pending)
    }

    /// Accepted reports waiting for a collector
    pub fn awaiting_assignment(&self) -> Vec<&Report> {
        self.reports_with_status(ReportStatus::Accepted)
    }

    /// Open tasks currently assigned to a collector
    pub fn collector_tasks(&self, collector_id: &str) -> Vec<CollectorTask> {
        self.state
            .reports
            .iter()
            .filter(|r| {
                r.status == ReportStatus::Assigned
                    && r.assigned_collector_id.as_deref() == Some(collector_id)
            })
            .map(CollectorTask::from)
            .collect()
    }

    /// Reports a collector has completed
    pub fn work_history(&self, collector_id: &str) -> Vec<&Report> {
        self.state
            .reports
            .iter()
            .filter(|r| {
                r.status == ReportStatus::Collected
                    && r.assigned_collector_id.as_deref() == Some(collector_id)
            })
            .collect()
    }

    pub fn citizen_reports(&self, citizen_id: &str) -> Vec<&Report> {
        self.state
            .reports
            .iter()
            .filter(|r| r.citizen_id == citizen_id)
            .collect()
    }

    pub fn transactions_for(&self, citizen_id: &str) -> Vec<&RewardTransaction> {
        self.state
            .reward_transactions
            .iter()
            .filter(|t| t.citizen_id == citizen_id)
            .collect()
    }

    // ===== Private Helper Methods =====

    fn reports_with_status(&self, status: ReportStatus) -> Vec<&Report> {
        self.state
            .reports
            .iter()
            .filter(|r| r.status == status)
            .collect()
    }

    /// Report that may still change status
    fn open_report_mut(&mut self, report_id: &str) -> StoreResult<&mut Report> {
        let report = self
            .state
            .reports
            .iter_mut()
            .find(|r| r.id == report_id)
            .ok_or_else(|| {
                tracing::debug!(report_id = %report_id, "Report not found");
                StoreError::ReportNotFound(report_id.to_string())
            })?;

        if report.is_closed() {
            return Err(StoreError::ReportClosed(report.id.clone()));
        }
        Ok(report)
    }

    /// `{prefix}-` followed by 8 lowercase hex digits, unique per `taken`
    fn unique_id(&self, prefix: &str, taken: impl Fn(&Self, &str) -> bool) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let candidate = format!("{}-{:08x}", prefix, rng.gen::<u32>());
            if !taken(self, &candidate) {
                return candidate;
            }
        }
    }
}

fn opening_balances(state: &PlatformState) -> BTreeMap<String, i64> {
    let awarded = state.awarded_points();
    state
        .citizens
        .values()
        .map(|c| {
            let credited = awarded.get(&c.id).copied().unwrap_or(0);
            (c.id.clone(), c.points.saturating_sub(credited))
        })
        .collect()
}
