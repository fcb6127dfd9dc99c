// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collision-free identifier allocation.
//!
//! Every identifier is claimed in the store's identifier registry before it
//! is handed out, so concurrent allocators never return the same value.
//! Sequences are unique but not contiguous: a claimed value whose case
//! write later loses a race leaves a gap.

use crate::context::RequestContext;
use crate::error::CoreError;
use crate::ports::{CaseStore, Clock, IdClaim};
use registrar_domain::{CaseId, CaseKind, IdSeries, Period, PolicyTable};
use std::sync::Arc;
use tracing::{debug, warn};

/// Bounded attempts before falling back.
pub const MAX_ALLOCATION_ATTEMPTS: u32 = 10;

/// Offset for time-derived fallback sequences, above any realistic
/// monthly volume.
const FALLBACK_SEQUENCE_BASE: u32 = 10_000;
const FALLBACK_SEQUENCE_SPAN: i64 = 90_000;

/// Length of the random fallback draft identifier.
const FALLBACK_DRAFT_ID_LEN: usize = 20;

/// A sequenced identifier handed out by the allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocated {
    pub value: String,
    pub sequence: u32,
    pub period: Period,
}

/// Allocates draft ids, official ids and document numbers.
#[derive(Clone)]
pub struct IdentifierAllocator {
    store: Arc<dyn CaseStore>,
    policies: Arc<PolicyTable>,
    clock: Arc<dyn Clock>,
}

impl IdentifierAllocator {
    #[must_use]
    pub fn new(
        store: Arc<dyn CaseStore>,
        policies: Arc<PolicyTable>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            policies,
            clock,
        }
    }

    /// Allocates a draft identifier.
    ///
    /// Candidates are the current time in milliseconds followed by three
    /// random digits. After `MAX_ALLOCATION_ATTEMPTS` collisions a random
    /// 128-bit value (hex, truncated) is tried once.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::AllocationExhausted` if the fallback collides too,
    /// or a storage/cancellation error.
    pub fn allocate_draft_id(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
    ) -> Result<CaseId, CoreError> {
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let millis: i128 = self.clock.now().unix_timestamp_nanos() / 1_000_000;
            let candidate: String = format!("{millis}{:03}", rand::random::<u16>() % 1000);

            if self.try_claim(ctx, kind, IdSeries::Case, IdClaim::draft(candidate.clone()))? {
                return Ok(CaseId::draft(candidate));
            }
            debug!(%kind, attempt, %candidate, "Draft id collision, retrying");
        }

        let mut fallback: String = format!("{:032x}", rand::random::<u128>());
        fallback.truncate(FALLBACK_DRAFT_ID_LEN);
        warn!(%kind, %fallback, "Draft id attempts exhausted, using random fallback");

        if self.try_claim(ctx, kind, IdSeries::Case, IdClaim::draft(fallback.clone()))? {
            Ok(CaseId::draft(fallback))
        } else {
            Err(CoreError::AllocationExhausted {
                kind,
                series: IdSeries::Case,
            })
        }
    }

    /// Allocates the next official case identifier for the period.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::AllocationExhausted` if no unique value could be
    /// claimed, or a storage/cancellation error.
    pub fn allocate_official_id(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        period: Period,
    ) -> Result<Allocated, CoreError> {
        self.allocate_sequenced(ctx, kind, IdSeries::Case, period)
    }

    /// Allocates the next decision document number for the period.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::AllocationExhausted` if no unique value could be
    /// claimed, or a storage/cancellation error.
    pub fn allocate_document_number(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        period: Period,
    ) -> Result<Allocated, CoreError> {
        self.allocate_sequenced(ctx, kind, IdSeries::Document, period)
    }

    fn render(&self, kind: CaseKind, series: IdSeries, sequence: u32, period: &Period) -> String {
        match series {
            IdSeries::Case => self.policies.render_case_id(kind, sequence, period),
            IdSeries::Document => self.policies.render_document_number(kind, sequence, period),
        }
    }

    fn allocate_sequenced(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        series: IdSeries,
        period: Period,
    ) -> Result<Allocated, CoreError> {
        let mut sequence: u32 = self
            .store
            .max_sequence(ctx, kind, series, &period)?
            .saturating_add(1);

        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let value: String = self.render(kind, series, sequence, &period);
            let claim: IdClaim = IdClaim::sequenced(value.clone(), sequence, period);

            if self.try_claim(ctx, kind, series, claim)? {
                debug!(%kind, %series, %value, "Allocated identifier");
                return Ok(Allocated {
                    value,
                    sequence,
                    period,
                });
            }
            debug!(%kind, %series, attempt, %value, "Identifier collision, retrying");
            let claimed: u32 = self.store.max_sequence(ctx, kind, series, &period)?;
            sequence = sequence.max(claimed).saturating_add(1);
        }

        let offset: u32 =
            u32::try_from(self.clock.now().unix_timestamp().rem_euclid(FALLBACK_SEQUENCE_SPAN))
                .unwrap_or_default();
        let sequence: u32 = FALLBACK_SEQUENCE_BASE + offset;
        let value: String = self.render(kind, series, sequence, &period);
        warn!(%kind, %series, %value, "Sequence attempts exhausted, using time-derived fallback");

        if self.try_claim(
            ctx,
            kind,
            series,
            IdClaim::sequenced(value.clone(), sequence, period),
        )? {
            Ok(Allocated {
                value,
                sequence,
                period,
            })
        } else {
            Err(CoreError::AllocationExhausted { kind, series })
        }
    }

    /// Checks for an existing claim, then claims atomically.
    fn try_claim(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        series: IdSeries,
        claim: IdClaim,
    ) -> Result<bool, CoreError> {
        if self.store.exists_id(ctx, kind, series, &claim.value)? {
            return Ok(false);
        }
        Ok(self.store.claim_id(ctx, kind, series, &claim)?)
    }
}
