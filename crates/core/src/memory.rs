// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory collaborator adapters.
//!
//! Used by tests and as the reference semantics for durable adapters.

use crate::context::RequestContext;
use crate::error::StoreError;
use crate::ports::{BlobStore, CasePrecondition, CaseStore, IdClaim};
use registrar_audit::AuditEvent;
use registrar_domain::{BlobRef, Case, CaseFilter, CaseKind, IdSeries, Period};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    /// Keyed by kind and current id.
    cases: BTreeMap<(CaseKind, String), Case>,
    claims: BTreeMap<(CaseKind, IdSeries, String), IdClaim>,
    events: Vec<AuditEvent>,
}

/// A [`CaseStore`] holding everything behind one mutex.
#[derive(Debug, Default)]
pub struct InMemoryCaseStore {
    state: Mutex<State>,
    unavailable: AtomicBool,
}

impl InMemoryCaseStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of audit events recorded.
    #[must_use]
    pub fn audit_len(&self) -> usize {
        self.state.lock().map_or(0, |state| state.events.len())
    }

    fn lock(&self, ctx: &RequestContext) -> Result<MutexGuard<'_, State>, StoreError> {
        ctx.check_store()?;
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(String::from("store offline")));
        }
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable(String::from("store lock poisoned")))
    }
}

impl CaseStore for InMemoryCaseStore {
    fn get_by_id(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        id: &str,
    ) -> Result<Option<Case>, StoreError> {
        let state: MutexGuard<'_, State> = self.lock(ctx)?;
        Ok(state.cases.get(&(kind, id.to_string())).cloned())
    }

    fn get_by_draft_id(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        draft_id: &str,
    ) -> Result<Option<Case>, StoreError> {
        let state: MutexGuard<'_, State> = self.lock(ctx)?;
        Ok(state
            .cases
            .values()
            .find(|case| case.kind == kind && case.draft_id == draft_id)
            .cloned())
    }

    fn exists_id(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        series: IdSeries,
        value: &str,
    ) -> Result<bool, StoreError> {
        let state: MutexGuard<'_, State> = self.lock(ctx)?;
        Ok(state.claims.contains_key(&(kind, series, value.to_string())))
    }

    fn max_sequence(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        series: IdSeries,
        period: &Period,
    ) -> Result<u32, StoreError> {
        let state: MutexGuard<'_, State> = self.lock(ctx)?;
        Ok(state
            .claims
            .iter()
            .filter(|((claim_kind, claim_series, _), claim)| {
                *claim_kind == kind && *claim_series == series && claim.period == Some(*period)
            })
            .filter_map(|(_, claim)| claim.sequence)
            .max()
            .unwrap_or(0))
    }

    fn claim_id(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        series: IdSeries,
        claim: &IdClaim,
    ) -> Result<bool, StoreError> {
        let mut state: MutexGuard<'_, State> = self.lock(ctx)?;
        let key: (CaseKind, IdSeries, String) = (kind, series, claim.value.clone());
        if state.claims.contains_key(&key) {
            return Ok(false);
        }
        state.claims.insert(key, claim.clone());
        Ok(true)
    }

    fn insert(&self, ctx: &RequestContext, case: &Case) -> Result<(), StoreError> {
        let mut state: MutexGuard<'_, State> = self.lock(ctx)?;
        let key: (CaseKind, String) = (case.kind, case.id.value().to_string());
        if state.cases.contains_key(&key) {
            return Err(StoreError::Conflict(case.id.value().to_string()));
        }
        state.cases.insert(key, case.clone());
        Ok(())
    }

    fn compare_and_swap(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        id: &str,
        expected: CasePrecondition,
        new_case: &Case,
    ) -> Result<bool, StoreError> {
        let mut state: MutexGuard<'_, State> = self.lock(ctx)?;
        let old_key: (CaseKind, String) = (kind, id.to_string());
        let new_key: (CaseKind, String) = (kind, new_case.id.value().to_string());

        match state.cases.get(&old_key) {
            Some(current) if CasePrecondition::of(current) == expected => {}
            _ => return Ok(false),
        }
        if new_key != old_key && state.cases.contains_key(&new_key) {
            return Ok(false);
        }

        state.cases.remove(&old_key);
        state.cases.insert(new_key, new_case.clone());
        Ok(true)
    }

    fn query(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        filter: &CaseFilter,
    ) -> Result<Vec<Case>, StoreError> {
        let state: MutexGuard<'_, State> = self.lock(ctx)?;
        Ok(state
            .cases
            .values()
            .filter(|case| case.kind == kind && filter.matches_stored(case))
            .cloned()
            .collect())
    }

    fn append_audit(&self, ctx: &RequestContext, event: &AuditEvent) -> Result<(), StoreError> {
        let mut state: MutexGuard<'_, State> = self.lock(ctx)?;
        state.events.push(event.clone());
        Ok(())
    }

    fn audit_events(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        case_ids: &[&str],
    ) -> Result<Vec<AuditEvent>, StoreError> {
        let state: MutexGuard<'_, State> = self.lock(ctx)?;
        Ok(state
            .events
            .iter()
            .filter(|event| event.kind == kind && case_ids.iter().any(|id| event.concerns(id)))
            .cloned()
            .collect())
    }
}

/// A [`BlobStore`] keeping bytes in a map.
#[derive(Debug, Default)]
pub struct InMemoryBlobStore {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
    counter: AtomicU64,
}

impl InMemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored bytes.
    #[must_use]
    pub fn get(&self, blob: &BlobRef) -> Option<Vec<u8>> {
        self.blobs
            .lock()
            .ok()
            .and_then(|blobs| blobs.get(blob.as_str()).cloned())
    }

    /// Number of blobs stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.lock().map_or(0, |blobs| blobs.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for InMemoryBlobStore {
    fn save(
        &self,
        ctx: &RequestContext,
        bytes: &[u8],
        suggested_name: &str,
    ) -> Result<BlobRef, StoreError> {
        ctx.check_store()?;
        let n: u64 = self.counter.fetch_add(1, Ordering::SeqCst);
        let name: String = format!("{n:06}_{suggested_name}");
        self.blobs
            .lock()
            .map_err(|_| StoreError::Unavailable(String::from("blob lock poisoned")))?
            .insert(name.clone(), bytes.to_vec());
        Ok(BlobRef::new(name))
    }

    fn exists(&self, ctx: &RequestContext, blob: &BlobRef) -> Result<bool, StoreError> {
        ctx.check_store()?;
        Ok(self
            .blobs
            .lock()
            .map_err(|_| StoreError::Unavailable(String::from("blob lock poisoned")))?
            .contains_key(blob.as_str()))
    }
}
