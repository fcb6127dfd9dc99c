// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborator interfaces the workflow consumes.
//!
//! Adapters live outside this crate (see `registrar-persistence`), except
//! for the in-memory reference adapters in [`crate::memory`].

use crate::context::RequestContext;
use crate::error::StoreError;
use registrar_audit::AuditEvent;
use registrar_domain::{BlobRef, Case, CaseFilter, CaseKind, CaseStatus, IdSeries, Period, RoleTag};
use std::sync::Mutex;
use time::{Duration, OffsetDateTime};

/// An identifier claimed in the per-kind identifier registry.
///
/// Draft identifiers carry no sequence; official identifiers and document
/// numbers record the sequence and period they were minted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdClaim {
    pub value: String,
    pub sequence: Option<u32>,
    pub period: Option<Period>,
}

impl IdClaim {
    #[must_use]
    pub const fn draft(value: String) -> Self {
        Self {
            value,
            sequence: None,
            period: None,
        }
    }

    #[must_use]
    pub const fn sequenced(value: String, sequence: u32, period: Period) -> Self {
        Self {
            value,
            sequence: Some(sequence),
            period: Some(period),
        }
    }
}

/// What the stored case must still look like for a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CasePrecondition {
    pub status: CaseStatus,
    pub version: u32,
}

impl CasePrecondition {
    /// The precondition matching the case as it was loaded.
    #[must_use]
    pub const fn of(case: &Case) -> Self {
        Self {
            status: case.status,
            version: case.version,
        }
    }
}

/// Persistent storage for cases, identifiers and audit events.
///
/// Operations on the same case are serialized through
/// [`CaseStore::compare_and_swap`]; the workflow never holds locks.
/// Every call receives the request's context; adapters bound any blocking
/// wait by its deadline and fail with `StoreError::Cancelled` or
/// `StoreError::DeadlineExceeded` once it no longer allows the call.
pub trait CaseStore: Send + Sync {
    /// Returns the case currently holding `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_by_id(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        id: &str,
    ) -> Result<Option<Case>, StoreError>;

    /// Returns the case that was created with `draft_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get_by_draft_id(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        draft_id: &str,
    ) -> Result<Option<Case>, StoreError>;

    /// Returns true if `value` was ever claimed in the series.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn exists_id(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        series: IdSeries,
        value: &str,
    ) -> Result<bool, StoreError>;

    /// Returns the highest sequence claimed for the period, or 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn max_sequence(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        series: IdSeries,
        period: &Period,
    ) -> Result<u32, StoreError>;

    /// Atomically claims an identifier. Returns false if it was already claimed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn claim_id(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        series: IdSeries,
        claim: &IdClaim,
    ) -> Result<bool, StoreError>;

    /// Inserts a new case.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the id is taken, or another error
    /// if the store cannot be written.
    fn insert(&self, ctx: &RequestContext, case: &Case) -> Result<(), StoreError>;

    /// Replaces the case holding `id` with `new_case` if its status and
    /// version still match `expected`. Returns false if the precondition
    /// failed or the replacement id is held by another case.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn compare_and_swap(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        id: &str,
        expected: CasePrecondition,
        new_case: &Case,
    ) -> Result<bool, StoreError>;

    /// Returns cases of a kind. Implementations must apply at least
    /// [`CaseFilter::matches_stored`] and may return them in any order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn query(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        filter: &CaseFilter,
    ) -> Result<Vec<Case>, StoreError>;

    /// Appends an audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn append_audit(&self, ctx: &RequestContext, event: &AuditEvent) -> Result<(), StoreError>;

    /// Returns the audit events concerning any of the given identifiers,
    /// in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn audit_events(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        case_ids: &[&str],
    ) -> Result<Vec<AuditEvent>, StoreError>;
}

/// Storage for attachment bytes.
pub trait BlobStore: Send + Sync {
    /// Stores bytes and returns the reference to record on the case.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be written or the request can
    /// no longer proceed.
    fn save(
        &self,
        ctx: &RequestContext,
        bytes: &[u8],
        suggested_name: &str,
    ) -> Result<BlobRef, StoreError>;

    /// Returns true if the reference points at stored bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn exists(&self, ctx: &RequestContext, blob: &BlobRef) -> Result<bool, StoreError>;
}

/// Classifies an approver's username into a role.
pub trait IdentityResolver: Send + Sync {
    /// Returns the single role the username maps to, or `None` if unresolved.
    fn classify_role(&self, username: &str) -> Option<RoleTag>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A manually advanced clock.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<OffsetDateTime>,
}

impl FixedClock {
    #[must_use]
    pub const fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }

    /// Sets the clock to an instant.
    pub fn set(&self, to: OffsetDateTime) {
        if let Ok(mut now) = self.now.lock() {
            *now = to;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.now
            .lock()
            .map_or_else(|poisoned| *poisoned.into_inner(), |now| *now)
    }
}
