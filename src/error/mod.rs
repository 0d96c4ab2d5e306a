//! Centralized error handling for the waste platform
//!
//! Domain failures raised by the lifecycle store and the snapshot
//! persistence boundary, each with a stable error code.

use thiserror::Error;

/// Errors raised by store operations.
///
/// A failed operation never leaves partial changes behind.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Report not found: {0}")]
    ReportNotFound(String),

    #[error("Citizen not found: {0}")]
    CitizenNotFound(String),

    #[error("Report {0} has already been collected")]
    AlreadyCollected(String),

    #[error("Report {0} is closed and cannot change status")]
    ReportClosed(String),

    #[error("Report {0} has no assigned collector")]
    NotAssigned(String),

    #[error("Point balance overflow for citizen {0}")]
    PointsOverflow(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid reward rules: {0}")]
    InvalidRewardRules(String),

    #[error("Ledger mismatch for citizen {citizen_id}: expected {expected} points, found {actual}")]
    LedgerMismatch {
        citizen_id: String,
        expected: i64,
        actual: i64,
    },
}

impl StoreError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::ReportNotFound(_) => "REPORT_NOT_FOUND",
            StoreError::CitizenNotFound(_) => "CITIZEN_NOT_FOUND",
            StoreError::AlreadyCollected(_) => "ALREADY_COLLECTED",
            StoreError::ReportClosed(_) => "REPORT_CLOSED",
            StoreError::NotAssigned(_) => "REPORT_NOT_ASSIGNED",
            StoreError::PointsOverflow(_) => "POINTS_OVERFLOW",
            StoreError::ValidationError(_) => "VALIDATION_ERROR",
            StoreError::InvalidRewardRules(_) => "INVALID_REWARD_RULES",
            StoreError::LedgerMismatch { .. } => "LEDGER_MISMATCH",
        }
    }

    /// Whether the failure is a missing-reference lookup
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::ReportNotFound(_) | StoreError::CitizenNotFound(_)
        )
    }
}

impl From<validator::ValidationErrors> for StoreError {
    fn from(err: validator::ValidationErrors) -> Self {
        StoreError::ValidationError(err.to_string())
    }
}

/// Errors raised at the snapshot persistence boundary
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot backend unavailable: {0}")]
    Unavailable(String),
}

impl PersistenceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PersistenceError::Io(_) => "SNAPSHOT_IO_ERROR",
            PersistenceError::Serialization(_) => "SNAPSHOT_SERIALIZATION_ERROR",
            PersistenceError::Unavailable(_) => "SNAPSHOT_UNAVAILABLE",
        }
    }
}

/// Result type alias using StoreError
pub type StoreResult<T> = Result<T, StoreError>;
