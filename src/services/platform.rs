//! Platform service - shared access to the lifecycle store
//!
//! Wraps [`PlatformStore`] for concurrent readers, persists the full state
//! after every successful mutation, and publishes one event per change.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{PersistenceError, StoreResult};
use crate::events::EventBus;
use crate::models::PlatformState;
use crate::persistence::{encode_state, load_state, SnapshotStore};
use crate::report::{
    CollectorTask, CollectorTaskStatus, CreateReportRequest, PlatformEvent, Report,
    SubmitProofRequest,
};
use crate::rewards::{leaderboard, LeaderboardEntry, RewardRules, RewardTransaction};
use crate::store::PlatformStore;

pub struct PlatformService {
    store: RwLock<PlatformStore>,
    snapshots: Arc<dyn SnapshotStore>,
    storage_key: String,
    events: EventBus,
}

impl PlatformService {
    pub fn new(
        store: PlatformStore,
        snapshots: Arc<dyn SnapshotStore>,
        storage_key: impl Into<String>,
        events: EventBus,
    ) -> Self {
        Self {
            store: RwLock::new(store),
            snapshots,
            storage_key: storage_key.into(),
            events,
        }
    }

    /// Resume from the persisted snapshot, or from `seed` if there is none
    pub fn open(
        snapshots: Arc<dyn SnapshotStore>,
        storage_key: impl Into<String>,
        seed: PlatformState,
        events: EventBus,
    ) -> Self {
        let storage_key = storage_key.into();
        let state = load_state(snapshots.as_ref(), &storage_key, &seed);
        let store = PlatformStore::with_state(state, seed);
        Self::new(store, snapshots, storage_key, events)
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ===== Operations =====

    pub async fn create_report(&self, request: CreateReportRequest) -> StoreResult<Report> {
        self.mutate(
            |store| store.create_report(request),
            |report| PlatformEvent::ReportCreated {
                report_id: report.id.clone(),
                citizen_id: report.citizen_id.clone(),
            },
        )
        .await
    }

    pub async fn accept_report(&self, report_id: &str) -> StoreResult<()> {
        self.mutate(
            |store| store.accept_report(report_id),
            |_| PlatformEvent::ReportAccepted {
                report_id: report_id.to_string(),
            },
        )
        .await
    }

    pub async fn reject_report(&self, report_id: &str, note: Option<String>) -> StoreResult<()> {
        let event_note = note.clone();
        self.mutate(
            |store| store.reject_report(report_id, note),
            |_| PlatformEvent::ReportRejected {
                report_id: report_id.to_string(),
                note: event_note,
            },
        )
        .await
    }

    pub async fn assign_collector(&self, report_id: &str, collector_id: &str) -> StoreResult<()> {
        self.mutate(
            |store| store.assign_collector(report_id, collector_id),
            |_| PlatformEvent::CollectorAssigned {
                report_id: report_id.to_string(),
                collector_id: collector_id.to_string(),
            },
        )
        .await
    }

    pub async fn set_collector_status(
        &self,
        report_id: &str,
        status: CollectorTaskStatus,
    ) -> StoreResult<()> {
        self.mutate(
            |store| store.set_collector_status(report_id, status),
            |_| PlatformEvent::CollectorStatusChanged {
                report_id: report_id.to_string(),
                status,
            },
        )
        .await
    }

    pub async fn submit_proof(&self, request: SubmitProofRequest) -> StoreResult<RewardTransaction> {
        self.mutate(
            |store| store.submit_proof(request),
            |tx| PlatformEvent::ReportCollected {
                report_id: tx.report_id.clone(),
                transaction_id: tx.id.clone(),
                points: tx.points,
            },
        )
        .await
    }

    pub async fn update_reward_rules(&self, rules: RewardRules) -> StoreResult<()> {
        self.mutate(
            |store| store.update_reward_rules(rules),
            |_| PlatformEvent::RewardRulesUpdated,
        )
        .await
    }

    pub async fn reset(&self) {
        let mut store = self.store.write().await;
        store.reset();
        self.persist(store.state()).await;
        drop(store);

        self.events.publish(PlatformEvent::StateReset);
    }

    // ===== Queries =====

    /// Copy of the current state
    pub async fn snapshot(&self) -> PlatformState {
        self.store.read().await.state().clone()
    }

    /// Run a read-only query against the store
    pub async fn read<R>(&self, query: impl FnOnce(&PlatformStore) -> R) -> R {
        let store = self.store.read().await;
        query(&*store)
    }

    pub async fn report(&self, report_id: &str) -> Option<Report> {
        self.read(|store| store.report(report_id).cloned()).await
    }

    pub async fn collector_tasks(&self, collector_id: &str) -> Vec<CollectorTask> {
        self.read(|store| store.collector_tasks(collector_id)).await
    }

    pub async fn citizen_points(&self, citizen_id: &str) -> Option<i64> {
        self.read(|store| store.citizen(citizen_id).map(|c| c.points))
            .await
    }

    pub async fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.read(|store| leaderboard(&store.state().citizens)).await
    }

    pub async fn verify_ledger(&self) -> StoreResult<()> {
        self.read(|store| store.verify_ledger()).await
    }

    // ===== Private Helper Methods =====

    /// Apply a store operation under the write lock, persist on success,
    /// then publish the event derived from its result.
    async fn mutate<T>(
        &self,
        op: impl FnOnce(&mut PlatformStore) -> StoreResult<T>,
        event: impl FnOnce(&T) -> PlatformEvent,
    ) -> StoreResult<T> {
        let mut store = self.store.write().await;
        let output = op(&mut *store)?;
        self.persist(store.state()).await;
        drop(store);

        self.events.publish(event(&output));
        Ok(output)
    }

    /// Write the snapshot on the blocking pool. Callers hold the write lock
    /// until this returns, so snapshots land in mutation order.
    ///
    /// Failed writes are logged and swallowed; memory stays authoritative.
    async fn persist(&self, state: &PlatformState) {
        let result = match encode_state(state) {
            Ok(data) => {
                let snapshots = Arc::clone(&self.snapshots);
                let key = self.storage_key.clone();
                tokio::task::spawn_blocking(move || snapshots.save(&key, &data))
                    .await
                    .unwrap_or_else(|e| {
                        Err(PersistenceError::Unavailable(format!(
                            "snapshot writer failed: {}",
                            e
                        )))
                    })
            }
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!(
                key = %self.storage_key,
                code = e.error_code(),
                error = %e,
                "Failed to persist platform snapshot"
            );
        }
    }
}
