// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use registrar_audit::ActionKind;
use registrar_domain::{CaseKind, CaseStatus, DomainError, IdSeries, RoleTag};

/// Errors surfaced by collaborator adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The backing system could not be reached or failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// A uniqueness constraint was violated.
    #[error("duplicate identifier: {0}")]
    Conflict(String),
    /// A stored record could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
    /// The request was cancelled before or during the call.
    #[error("request cancelled")]
    Cancelled,
    /// The request's deadline passed before or during the call.
    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

/// Errors returned by workflow and query operations.
///
/// Everything except `StorageUnavailable`, `Cancelled` and
/// `DeadlineExceeded` is a business error caused by the request itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("{kind} case '{case_id}' not found")]
    NotFound { kind: CaseKind, case_id: String },

    #[error("cannot {operation} case '{case_id}' in status {status}")]
    InvalidState {
        case_id: String,
        status: CaseStatus,
        operation: ActionKind,
    },

    #[error("case '{case_id}' awaits approval by {expected}, not {actual}")]
    InvalidRole {
        case_id: String,
        expected: RoleTag,
        actual: RoleTag,
    },

    #[error("no approver role could be determined for '{username}'")]
    RoleUndetermined { username: String },

    #[error("case '{case_id}' was already processed (status {status})")]
    AlreadyProcessed { case_id: String, status: CaseStatus },

    #[error("draft '{case_id}' was already finalized")]
    AlreadyFinalized { case_id: String },

    #[error("could not allocate a unique {series} identifier for {kind}")]
    AllocationExhausted { kind: CaseKind, series: IdSeries },

    #[error("case '{case_id}' was modified concurrently")]
    ConcurrentModification { case_id: String },

    #[error("validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

impl CoreError {
    /// Returns true if the error was caused by the request rather than the system.
    #[must_use]
    pub const fn is_business(&self) -> bool {
        !matches!(
            self,
            Self::StorageUnavailable(_)
                | Self::AllocationExhausted { .. }
                | Self::Cancelled
                | Self::DeadlineExceeded
        )
    }

    /// Returns true if the caller may retry the operation once.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification { .. })
    }
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::ValidationFailed {
            field: err.field(),
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Cancelled => Self::Cancelled,
            StoreError::DeadlineExceeded => Self::DeadlineExceeded,
            other => Self::StorageUnavailable(other.to_string()),
        }
    }
}
