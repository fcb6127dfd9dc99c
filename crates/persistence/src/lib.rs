// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the registrar case system.
//!
//! This crate provides the durable adapters the workflow engine runs
//! against:
//!
//! - [`SqliteCaseStore`]: cases, the identifier registry and audit events,
//!   stored in `SQLite` through Diesel
//! - [`FsBlobStore`]: attachment bytes written to a directory
//!
//! ## Concurrency
//!
//! Identifier uniqueness is enforced by `UNIQUE` constraints, so claims
//! and case inserts are atomic even when several processes share one
//! database file. Conditional replacement is a single `UPDATE` filtered
//! on the expected status and version; the affected-row count decides the
//! winner.
//!
//! ## Migration Strategy
//!
//! Migrations are embedded at compile time and applied on open. See the
//! `backend` module for connection setup.
//!
//! ## Testing Philosophy
//!
//! - Tests run against isolated in-memory databases (`new_in_memory`)
//! - File-backed behavior is covered with `tempfile` directories
//! - No external infrastructure is required

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use registrar::{CasePrecondition, CaseStore, IdClaim, RequestContext, StoreError};
use registrar_audit::AuditEvent;
use registrar_domain::{Case, CaseFilter, CaseKind, IdSeries, Period};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod blob;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use blob::FsBlobStore;
pub use error::PersistenceError;

/// A [`CaseStore`] backed by a single `SQLite` connection.
///
/// The connection is guarded by a mutex; every trait method is one
/// statement (or one read), so the lock is never held across calls. Each
/// call first bounds the `SQLite` busy timeout by the request's deadline.
pub struct SqliteCaseStore {
    conn: Mutex<SqliteConnection>,
}

impl std::fmt::Debug for SqliteCaseStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCaseStore").finish_non_exhaustive()
    }
}

impl SqliteCaseStore {
    /// Creates a store over a fresh in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_{db_id}?mode=memory&cache=shared");

        let conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens (or creates) a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;

        // Enable WAL mode for better read concurrency
        backend::sqlite::enable_wal_mode(&mut conn)?;

        info!(path = %path_str, "Opened case database");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, SqliteConnection>, PersistenceError> {
        self.conn.lock().map_err(|_| PersistenceError::LockPoisoned)
    }

    /// Runs one store operation under the request's context.
    ///
    /// The busy timeout is bounded by the time the request has left, and a
    /// failure once the request is cancelled or expired is reported as such.
    fn with_connection<T>(
        &self,
        ctx: &RequestContext,
        operation: impl FnOnce(&mut SqliteConnection) -> Result<T, PersistenceError>,
    ) -> Result<T, StoreError> {
        ctx.check_store()?;
        let mut conn: MutexGuard<'_, SqliteConnection> = self.connection()?;
        backend::sqlite::set_busy_timeout(
            &mut conn,
            ctx.wait_budget(backend::sqlite::MAX_BUSY_WAIT),
        )?;

        operation(&mut *conn).map_err(|err| match ctx.check_store() {
            Err(interrupted) => {
                debug!(error = %err, "Store call interrupted by request context");
                interrupted
            }
            Ok(()) => err.into(),
        })
    }
}

impl CaseStore for SqliteCaseStore {
    fn get_by_id(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        id: &str,
    ) -> Result<Option<Case>, StoreError> {
        self.with_connection(ctx, |conn| queries::find_case_by_id(conn, kind, id))
    }

    fn get_by_draft_id(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        draft_id: &str,
    ) -> Result<Option<Case>, StoreError> {
        self.with_connection(ctx, |conn| queries::find_case_by_draft_id(conn, kind, draft_id))
    }

    fn exists_id(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        series: IdSeries,
        value: &str,
    ) -> Result<bool, StoreError> {
        self.with_connection(ctx, |conn| queries::id_is_claimed(conn, kind, series, value))
    }

    fn max_sequence(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        series: IdSeries,
        period: &Period,
    ) -> Result<u32, StoreError> {
        self.with_connection(ctx, |conn| queries::max_claimed_sequence(conn, kind, series, period))
    }

    fn claim_id(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        series: IdSeries,
        claim: &IdClaim,
    ) -> Result<bool, StoreError> {
        self.with_connection(ctx, |conn| mutations::claim_identifier(conn, kind, series, claim))
    }

    fn insert(&self, ctx: &RequestContext, case: &Case) -> Result<(), StoreError> {
        self.with_connection(ctx, |conn| mutations::insert_case(conn, case))
    }

    fn compare_and_swap(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        id: &str,
        expected: CasePrecondition,
        new_case: &Case,
    ) -> Result<bool, StoreError> {
        self.with_connection(ctx, |conn| {
            mutations::replace_case_if_current(conn, kind, id, expected, new_case)
        })
    }

    fn query(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        filter: &CaseFilter,
    ) -> Result<Vec<Case>, StoreError> {
        self.with_connection(ctx, |conn| queries::list_cases(conn, kind, filter))
    }

    fn append_audit(&self, ctx: &RequestContext, event: &AuditEvent) -> Result<(), StoreError> {
        self.with_connection(ctx, |conn| mutations::insert_audit_event(conn, event).map(|_| ()))
    }

    fn audit_events(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        case_ids: &[&str],
    ) -> Result<Vec<AuditEvent>, StoreError> {
        self.with_connection(ctx, |conn| queries::get_audit_events(conn, kind, case_ids))
    }
}
