// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::app::App;
use clap::{Args, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use registrar::{AttachmentUpload, DraftPayload, RequestContext, UpdatePayload, UploadOutcome};
use registrar_audit::AuditEvent;
use registrar_domain::{
    AttachmentSlot, Case, CaseFilter, CaseId, CaseKind, CaseStatus, CaseSummary, DomainError, Page,
    PageRequest, RoleTag, SortKey,
};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a draft case
    #[command(visible_alias = "c")]
    Create(CreateArgs),

    /// Assign an official identifier and submit for approval
    #[command(visible_alias = "f")]
    Finalize(ActorArgs),

    /// Record an approval for the current step
    #[command(visible_alias = "a")]
    Approve(DecisionArgs),

    /// Record a rejection for the current step
    #[command(visible_alias = "r")]
    Reject(RejectArgs),

    /// Upload the decision document (SK) or its supplement
    #[command(visible_alias = "u")]
    Upload(UploadArgs),

    /// Edit the student, details or attachments of a case
    Update(UpdateArgs),

    /// Soft-delete a case
    Delete(ActorArgs),

    /// Print one case
    #[command(visible_alias = "s")]
    Show(CaseRef),

    /// List cases, newest first
    #[command(visible_alias = "l")]
    List(ListArgs),

    /// List cases one page at a time
    #[command(visible_alias = "h")]
    History(HistoryArgs),

    /// Print the audit trail of a case
    Audit(CaseRef),
}

/// Identifies one case.
#[derive(Debug, Clone, Args)]
pub struct CaseRef {
    /// Case kind (`academic_leave`, `drop_out`, `death_of_student`, `resignation`)
    #[arg(short, long)]
    pub kind: CaseKind,

    /// Draft or official identifier
    #[arg(short, long)]
    pub id: String,
}

#[derive(Debug, Clone, Args)]
pub struct ActorArgs {
    #[command(flatten)]
    pub case: CaseRef,

    /// Username performing the operation
    #[arg(long)]
    pub by: String,
}

#[derive(Debug, Clone, Args)]
pub struct DecisionArgs {
    #[command(flatten)]
    pub target: ActorArgs,

    /// Role the approver acts as; resolved from the username when omitted
    #[arg(long)]
    pub role: Option<RoleTag>,
}

#[derive(Debug, Clone, Args)]
pub struct RejectArgs {
    #[command(flatten)]
    pub decision: DecisionArgs,

    /// Why the case is rejected
    #[arg(long)]
    pub reason: String,
}

#[derive(Debug, Clone, Args)]
pub struct CreateArgs {
    #[arg(short, long)]
    pub kind: CaseKind,

    /// Student identifier (NIM)
    #[arg(long)]
    pub student: String,

    /// Case detail as KEY=VALUE; repeatable
    #[arg(long = "detail", value_parser = parse_detail)]
    pub details: Vec<(String, String)>,

    /// Attachment as SLOT=PATH; repeatable
    #[arg(long = "attach", value_parser = parse_attachment)]
    pub attachments: Vec<(AttachmentSlot, PathBuf)>,

    /// Username creating the case
    #[arg(long)]
    pub by: String,
}

#[derive(Debug, Clone, Args)]
pub struct UploadArgs {
    #[command(flatten)]
    pub target: ActorArgs,

    /// Document slot (`sk` or `sk-supplementary`)
    #[arg(long, default_value = "sk")]
    pub slot: AttachmentSlot,

    /// File to upload
    #[arg(long)]
    pub file: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct UpdateArgs {
    #[command(flatten)]
    pub target: ActorArgs,

    /// Replacement student identifier
    #[arg(long)]
    pub student: Option<String>,

    /// Detail as KEY=VALUE; an empty value removes the detail
    #[arg(long = "detail", value_parser = parse_detail)]
    pub details: Vec<(String, String)>,

    /// Replacement attachment as SLOT=PATH
    #[arg(long = "attach", value_parser = parse_attachment)]
    pub attachments: Vec<(AttachmentSlot, PathBuf)>,
}

#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    #[arg(short, long)]
    pub kind: CaseKind,

    #[arg(long)]
    pub student: Option<String>,

    /// Status such as `draft`, `pending_approval_1` or `approved`
    #[arg(long)]
    pub status: Option<CaseStatus>,

    /// Creator or approver username
    #[arg(long)]
    pub actor: Option<String>,

    /// Substring of the case id or student id
    #[arg(long)]
    pub keyword: Option<String>,

    /// Only cases waiting on this role
    #[arg(long)]
    pub awaiting: Option<RoleTag>,

    #[arg(long)]
    pub include_deleted: bool,
}

impl FilterArgs {
    fn to_filter(&self) -> CaseFilter {
        CaseFilter {
            student_id: self.student.clone(),
            status: self.status,
            actor: self.actor.clone(),
            keyword: self.keyword.clone(),
            awaiting_role: self.awaiting,
            include_deleted: self.include_deleted,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Clone, Args)]
pub struct HistoryArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// `date_asc`, `date_desc`, `id_asc` or `id_desc`
    #[arg(long, default_value = "date_desc")]
    pub sort: SortKey,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = 20)]
    pub size: u32,
}

impl Command {
    /// Runs the command and returns its JSON output.
    ///
    /// # Errors
    ///
    /// Returns an error if an input file cannot be read or the operation
    /// is refused.
    pub fn run(self, app: &App) -> Result<Value> {
        let ctx: &RequestContext = &app.ctx;
        match self {
            Self::Create(args) => create(app, args),
            Self::Finalize(args) => {
                let id: CaseId = app
                    .engine
                    .finalize(ctx, args.case.kind, &args.case.id, &args.by)?;
                Ok(json!({ "case_id": id.value(), "draft_id": args.case.id }))
            }
            Self::Approve(args) => {
                let status: CaseStatus = app.engine.approve(
                    ctx,
                    args.target.case.kind,
                    &args.target.case.id,
                    args.role,
                    &args.target.by,
                )?;
                Ok(json!({ "case_id": args.target.case.id, "status": status.as_string() }))
            }
            Self::Reject(args) => {
                let target: &ActorArgs = &args.decision.target;
                let status: CaseStatus = app.engine.reject(
                    ctx,
                    target.case.kind,
                    &target.case.id,
                    args.decision.role,
                    &target.by,
                    &args.reason,
                )?;
                Ok(json!({ "case_id": target.case.id, "status": status.as_string() }))
            }
            Self::Upload(args) => upload(app, args),
            Self::Update(args) => update(app, args),
            Self::Delete(args) => {
                app.engine
                    .soft_delete(ctx, args.case.kind, &args.case.id, &args.by)?;
                Ok(json!({ "case_id": args.case.id, "status": CaseStatus::Deleted.as_string() }))
            }
            Self::Show(case) => {
                let case: Case = app.engine.get(ctx, case.kind, &case.id)?;
                Ok(serde_json::to_value(case)?)
            }
            Self::List(args) => {
                let summaries: Vec<CaseSummary> =
                    app.queries
                        .list(ctx, args.filter.kind, &args.filter.to_filter())?;
                Ok(serde_json::to_value(summaries)?)
            }
            Self::History(args) => {
                let page: Page<CaseSummary> = app.queries.history(
                    ctx,
                    args.filter.kind,
                    &args.filter.to_filter(),
                    args.sort,
                    PageRequest::new(args.page, args.size)?,
                )?;
                Ok(serde_json::to_value(page)?)
            }
            Self::Audit(case) => {
                let events: Vec<AuditEvent> = app.queries.audit_trail(ctx, case.kind, &case.id)?;
                Ok(serde_json::to_value(events)?)
            }
        }
    }
}

fn create(app: &App, args: CreateArgs) -> Result<Value> {
    let payload: DraftPayload = DraftPayload {
        student_id: args.student,
        details: args.details.into_iter().collect(),
        attachments: read_attachments(&args.attachments)?,
    };
    let id: CaseId = app
        .engine
        .create_draft(&app.ctx, args.kind, payload, &args.by)?;
    info!(kind = %args.kind, case_id = %id, "Draft created");
    Ok(json!({ "case_id": id.value() }))
}

fn upload(app: &App, args: UploadArgs) -> Result<Value> {
    let upload: AttachmentUpload = read_attachment(args.slot, &args.file)?;
    let outcome: UploadOutcome = app.engine.upload_document(
        &app.ctx,
        args.target.case.kind,
        &args.target.case.id,
        upload,
        &args.target.by,
    )?;
    Ok(json!({
        "case_id": args.target.case.id,
        "document_number": outcome.document_number,
        "blob": outcome.blob,
        "status": outcome.status.as_string(),
    }))
}

fn update(app: &App, args: UpdateArgs) -> Result<Value> {
    let payload: UpdatePayload = UpdatePayload {
        student_id: args.student,
        details: args.details.into_iter().collect::<BTreeMap<String, String>>(),
        attachments: read_attachments(&args.attachments)?,
    };
    let case: Case = app.engine.update(
        &app.ctx,
        args.target.case.kind,
        &args.target.case.id,
        payload,
        &args.target.by,
    )?;
    Ok(serde_json::to_value(case)?)
}

/// Parses `KEY=VALUE`. The value may be empty.
///
/// # Errors
///
/// Returns a message if there is no `=` or the key is blank.
pub fn parse_detail(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key: &str = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parses `SLOT=PATH`.
///
/// # Errors
///
/// Returns a message if the slot is unknown or the path is empty.
pub fn parse_attachment(raw: &str) -> Result<(AttachmentSlot, PathBuf), String> {
    let (slot, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SLOT=PATH, got '{raw}'"))?;
    let slot: AttachmentSlot = slot.trim().parse().map_err(|e: DomainError| e.to_string())?;
    if path.is_empty() {
        return Err(format!("empty path in '{raw}'"));
    }
    Ok((slot, PathBuf::from(path)))
}

fn read_attachments(attachments: &[(AttachmentSlot, PathBuf)]) -> Result<Vec<AttachmentUpload>> {
    attachments
        .iter()
        .map(|(slot, path)| read_attachment(*slot, path))
        .collect()
}

fn read_attachment(slot: AttachmentSlot, path: &Path) -> Result<AttachmentUpload> {
    let bytes: Vec<u8> =
        std::fs::read(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    let file_name: String = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| eyre!("{} is not a file", path.display()))?;
    Ok(AttachmentUpload::new(slot, file_name, bytes))
}
