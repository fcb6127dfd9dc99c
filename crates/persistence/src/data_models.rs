// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row shapes for the `cases`, `id_claims` and `audit_events` tables and
//! their conversions to domain values.
//!
//! Structured case fields (details, attachments, the approval trail) are
//! stored as JSON text; timestamps are RFC 3339 text.

use crate::diesel_schema::{audit_events, cases, id_claims};
use crate::error::PersistenceError;
use diesel::prelude::*;
use registrar::IdClaim;
use registrar_audit::{Action, Actor, AuditEvent, StatusSnapshot};
use registrar_domain::{
    ApprovalEntry, AttachmentSlot, BlobRef, Case, CaseId, CaseKind, CaseStatus, DocumentRecord,
    IdKind, IdSeries, OfficialSequence, Period,
};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// A row of the `cases` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cases)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CaseRow {
    pub case_row_id: i64,
    pub kind: String,
    pub case_id: String,
    pub id_kind: String,
    pub draft_id: String,
    pub student_id: String,
    pub status: String,
    pub version: i32,
    pub official_sequence: Option<i32>,
    pub official_period: Option<String>,
    pub document_number: Option<String>,
    pub document_sequence: Option<i32>,
    pub document_period: Option<String>,
    pub details_json: String,
    pub attachments_json: String,
    pub approval_trail_json: String,
    pub rejection_reason: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub modified_by: String,
    pub modified_at: String,
}

/// The writable columns of a case, used for inserts and full-row updates.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = cases)]
#[diesel(treat_none_as_null = true)]
pub struct CaseRecord {
    pub kind: String,
    pub case_id: String,
    pub id_kind: String,
    pub draft_id: String,
    pub student_id: String,
    pub status: String,
    pub version: i32,
    pub official_sequence: Option<i32>,
    pub official_period: Option<String>,
    pub document_number: Option<String>,
    pub document_sequence: Option<i32>,
    pub document_period: Option<String>,
    pub details_json: String,
    pub attachments_json: String,
    pub approval_trail_json: String,
    pub rejection_reason: Option<String>,
    pub created_by: String,
    pub created_at: String,
    pub modified_by: String,
    pub modified_at: String,
}

impl CaseRecord {
    /// Flattens a case into its row representation.
    ///
    /// # Errors
    ///
    /// Returns an error if a structured field cannot be serialized.
    pub fn from_case(case: &Case) -> Result<Self, PersistenceError> {
        let official_sequence: Option<i32> = case
            .official
            .map(|official| counter_to_column(official.sequence))
            .transpose()?;
        let document_sequence: Option<i32> = case
            .document
            .as_ref()
            .map(|document| counter_to_column(document.sequence))
            .transpose()?;

        Ok(Self {
            kind: case.kind.as_str().to_string(),
            case_id: case.id.value().to_string(),
            id_kind: case.id.id_kind().as_str().to_string(),
            draft_id: case.draft_id.clone(),
            student_id: case.student_id.clone(),
            status: case.status.as_string(),
            version: counter_to_column(case.version)?,
            official_sequence,
            official_period: case.official.map(|official| official.period.key()),
            document_number: case.document.as_ref().map(|d| d.number.clone()),
            document_sequence,
            document_period: case.document.as_ref().map(|d| d.period.key()),
            details_json: serde_json::to_string(&case.details)?,
            attachments_json: serde_json::to_string(&case.attachments)?,
            approval_trail_json: serde_json::to_string(&case.approval_trail)?,
            rejection_reason: case.rejection_reason.clone(),
            created_by: case.created_by.clone(),
            created_at: format_timestamp(case.created_at)?,
            modified_by: case.modified_by.clone(),
            modified_at: format_timestamp(case.modified_at)?,
        })
    }
}

impl CaseRow {
    /// Rebuilds the domain case from a stored row.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CorruptRecord` if a column holds a value
    /// the domain does not accept.
    pub fn into_case(self) -> Result<Case, PersistenceError> {
        let kind: CaseKind = self.kind.parse()?;
        let id_kind: IdKind = self.id_kind.parse()?;
        let status: CaseStatus = self.status.parse()?;

        let official: Option<OfficialSequence> =
            match (self.official_sequence, self.official_period.as_deref()) {
                (Some(sequence), Some(period)) => Some(OfficialSequence {
                    sequence: counter_from_column(sequence)?,
                    period: period.parse()?,
                }),
                (None, None) => None,
                _ => {
                    return Err(PersistenceError::CorruptRecord(format!(
                        "case {} has a partial official sequence",
                        self.case_id
                    )));
                }
            };

        let document: Option<DocumentRecord> = match (
            self.document_number,
            self.document_sequence,
            self.document_period.as_deref(),
        ) {
            (Some(number), Some(sequence), Some(period)) => Some(DocumentRecord {
                number,
                sequence: counter_from_column(sequence)?,
                period: period.parse()?,
            }),
            (None, None, None) => None,
            _ => {
                return Err(PersistenceError::CorruptRecord(format!(
                    "case {} has a partial document number",
                    self.case_id
                )));
            }
        };

        let details: BTreeMap<String, String> = serde_json::from_str(&self.details_json)?;
        let attachments: BTreeMap<AttachmentSlot, BlobRef> =
            serde_json::from_str(&self.attachments_json)?;
        let approval_trail: Vec<ApprovalEntry> = serde_json::from_str(&self.approval_trail_json)?;

        Ok(Case {
            id: CaseId::from_parts(self.case_id, id_kind),
            draft_id: self.draft_id,
            official,
            kind,
            student_id: self.student_id,
            status,
            version: counter_from_column(self.version)?,
            details,
            attachments,
            approval_trail,
            rejection_reason: self.rejection_reason,
            document,
            created_by: self.created_by,
            created_at: parse_timestamp(&self.created_at)?,
            modified_by: self.modified_by,
            modified_at: parse_timestamp(&self.modified_at)?,
        })
    }
}

/// A row of the `id_claims` table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = id_claims)]
pub struct IdClaimRecord {
    pub kind: String,
    pub series: String,
    pub value: String,
    pub sequence: Option<i32>,
    pub period_key: Option<String>,
}

impl IdClaimRecord {
    /// Builds the claim row for a kind and series.
    ///
    /// # Errors
    ///
    /// Returns an error if the sequence does not fit the column.
    pub fn new(
        kind: CaseKind,
        series: IdSeries,
        claim: &IdClaim,
    ) -> Result<Self, PersistenceError> {
        Ok(Self {
            kind: kind.as_str().to_string(),
            series: series.as_str().to_string(),
            value: claim.value.clone(),
            sequence: claim.sequence.map(counter_to_column).transpose()?,
            period_key: claim.period.map(|period: Period| period.key()),
        })
    }
}

/// A row of the `audit_events` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuditEventRow {
    pub event_id: i64,
    pub kind: String,
    pub before_case_id: String,
    pub after_case_id: String,
    pub actor_json: String,
    pub action_json: String,
    pub before_json: String,
    pub after_json: String,
    pub occurred_at: String,
}

impl AuditEventRow {
    /// Rebuilds the audit event from a stored row.
    ///
    /// # Errors
    ///
    /// Returns an error if a JSON column or the timestamp cannot be decoded.
    pub fn into_event(self) -> Result<AuditEvent, PersistenceError> {
        let actor: Actor = serde_json::from_str(&self.actor_json)?;
        let action: Action = serde_json::from_str(&self.action_json)?;
        let before: StatusSnapshot = serde_json::from_str(&self.before_json)?;
        let after: StatusSnapshot = serde_json::from_str(&self.after_json)?;

        Ok(AuditEvent::new(
            self.kind.parse()?,
            actor,
            action,
            before,
            after,
            parse_timestamp(&self.occurred_at)?,
        ))
    }
}

/// The insertable form of an audit event.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_events)]
pub struct AuditEventRecord {
    pub kind: String,
    pub before_case_id: String,
    pub after_case_id: String,
    pub actor_json: String,
    pub action_json: String,
    pub before_json: String,
    pub after_json: String,
    pub occurred_at: String,
}

impl AuditEventRecord {
    /// # Errors
    ///
    /// Returns an error if a component cannot be serialized.
    pub fn from_event(event: &AuditEvent) -> Result<Self, PersistenceError> {
        Ok(Self {
            kind: event.kind.as_str().to_string(),
            before_case_id: event.before.case_id.clone(),
            after_case_id: event.after.case_id.clone(),
            actor_json: serde_json::to_string(&event.actor)?,
            action_json: serde_json::to_string(&event.action)?,
            before_json: serde_json::to_string(&event.before)?,
            after_json: serde_json::to_string(&event.after)?,
            occurred_at: format_timestamp(event.occurred_at)?,
        })
    }
}

/// Sequences and versions are stored as `INTEGER`.
fn counter_to_column(value: u32) -> Result<i32, PersistenceError> {
    i32::try_from(value).map_err(|_| {
        PersistenceError::SerializationError(format!("counter {value} out of range"))
    })
}

fn counter_from_column(value: i32) -> Result<u32, PersistenceError> {
    u32::try_from(value)
        .map_err(|_| PersistenceError::CorruptRecord(format!("negative counter {value}")))
}

pub(crate) fn format_timestamp(at: OffsetDateTime) -> Result<String, PersistenceError> {
    Ok(at.format(&Rfc3339)?)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, PersistenceError> {
    Ok(OffsetDateTime::parse(raw, &Rfc3339)?)
}
