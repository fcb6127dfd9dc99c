// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only listing and history views.

use crate::context::RequestContext;
use crate::error::CoreError;
use crate::ports::CaseStore;
use registrar_audit::AuditEvent;
use registrar_domain::{
    ApprovalPolicy, Case, CaseFilter, CaseKind, CaseSummary, Page, PageRequest, PolicyTable,
    SortKey,
};
use std::sync::Arc;
use tracing::debug;

/// Answers listing, history and audit queries straight from the store.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn CaseStore>,
    policies: Arc<PolicyTable>,
}

impl QueryService {
    #[must_use]
    pub fn new(store: Arc<dyn CaseStore>, policies: Arc<PolicyTable>) -> Self {
        Self { store, policies }
    }

    /// Lists the cases matching the filter, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage or cancellation error.
    pub fn list(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        filter: &CaseFilter,
    ) -> Result<Vec<CaseSummary>, CoreError> {
        self.matching(ctx, kind, filter, SortKey::DateDesc)
    }

    /// Returns one page of matching cases in the requested order.
    ///
    /// # Errors
    ///
    /// Returns a storage or cancellation error.
    pub fn history(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        filter: &CaseFilter,
        sort: SortKey,
        page: PageRequest,
    ) -> Result<Page<CaseSummary>, CoreError> {
        let summaries: Vec<CaseSummary> = self.matching(ctx, kind, filter, sort)?;
        let total: usize = summaries.len();
        let items: Vec<CaseSummary> = summaries
            .into_iter()
            .skip(page.offset())
            .take(page.size() as usize)
            .collect();

        Ok(Page {
            items,
            page: page.page(),
            size: page.size(),
            total,
        })
    }

    /// Returns the audit events of a case in chronological order.
    ///
    /// Events recorded under the draft id are included once the case is
    /// finalized.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no case answers to the id, or a storage or
    /// cancellation error.
    pub fn audit_trail(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        case_id: &str,
    ) -> Result<Vec<AuditEvent>, CoreError> {
        let case: Case = match self.store.get_by_id(ctx, kind, case_id)? {
            Some(case) => case,
            None => self
                .store
                .get_by_draft_id(ctx, kind, case_id)?
                .ok_or_else(|| CoreError::NotFound {
                    kind,
                    case_id: case_id.to_string(),
                })?,
        };

        let mut events: Vec<AuditEvent> = self.store.audit_events(
            ctx,
            kind,
            &[case.id.value(), case.draft_id.as_str()],
        )?;
        // Stable, so same-instant events keep insertion order.
        events.sort_by_key(|event| event.occurred_at);
        Ok(events)
    }

    fn matching(
        &self,
        ctx: &RequestContext,
        kind: CaseKind,
        filter: &CaseFilter,
        sort: SortKey,
    ) -> Result<Vec<CaseSummary>, CoreError> {
        let policy: &ApprovalPolicy = self.policies.get(kind);
        let cases: Vec<Case> = self.store.query(ctx, kind, filter)?;
        let fetched: usize = cases.len();

        let mut summaries: Vec<CaseSummary> = cases
            .iter()
            .filter(|case| filter.matches(case, policy))
            .map(|case| CaseSummary::from_case(case, policy))
            .collect();
        summaries.sort_by(|a, b| sort.compare(a, b));

        debug!(
            kind = %kind,
            fetched,
            matched = summaries.len(),
            "Evaluated case filter"
        );
        Ok(summaries)
    }
}
