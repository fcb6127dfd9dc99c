// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The workflow engine driven end to end over `SQLite` and file blobs.

use super::helpers::create_test_time;
use crate::{FsBlobStore, SqliteCaseStore};
use registrar::{
    AttachmentUpload, CoreError, DraftPayload, FixedClock, QueryService, RequestContext, RoleRule,
    RuleBasedResolver, UploadOutcome, UsernameMatcher, WorkflowEngine,
};
use registrar_audit::{ActionKind, AuditEvent};
use registrar_domain::{
    AttachmentSlot, Case, CaseFilter, CaseId, CaseKind, CaseStatus, CaseSummary, PolicyTable,
    RoleTag,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    engine: WorkflowEngine,
    queries: QueryService,
    blobs: Arc<FsBlobStore>,
    ctx: RequestContext,
}

fn create_fixture(database: &Path, blob_dir: &Path) -> Fixture {
    let store: Arc<SqliteCaseStore> = Arc::new(SqliteCaseStore::new_with_file(database).unwrap());
    let blobs: Arc<FsBlobStore> = Arc::new(FsBlobStore::new(blob_dir).unwrap());
    let policies: Arc<PolicyTable> = Arc::new(PolicyTable::standard("PMA").unwrap());
    let resolver: RuleBasedResolver = RuleBasedResolver::new(vec![RoleRule {
        role: RoleTag::Wadir1,
        matcher: UsernameMatcher::Exact {
            usernames: vec![String::from("wadir1")],
        },
    }]);

    let engine: WorkflowEngine = WorkflowEngine::new(
        store.clone(),
        blobs.clone(),
        Arc::new(resolver),
        Arc::new(FixedClock::new(create_test_time())),
        policies.clone(),
    );
    let queries: QueryService = QueryService::new(store, policies);

    Fixture {
        engine,
        queries,
        blobs,
        ctx: RequestContext::new(),
    }
}

fn create_death_payload() -> DraftPayload {
    let mut details: BTreeMap<String, String> = BTreeMap::new();
    details.insert(String::from("date_of_death"), String::from("2026-08-30"));
    DraftPayload {
        student_id: String::from("0420240032"),
        details,
        attachments: vec![AttachmentUpload::new(
            AttachmentSlot::SupportingDocument,
            "certificate.pdf",
            b"certificate".to_vec(),
        )],
    }
}

#[test]
fn test_full_lifecycle_survives_reopen() {
    let dir: TempDir = TempDir::new().unwrap();
    let database = dir.path().join("registrar.db");
    let blob_dir = dir.path().join("blobs");
    let kind: CaseKind = CaseKind::DeathOfStudent;

    let official: String = {
        let fixture: Fixture = create_fixture(&database, &blob_dir);
        let draft: CaseId = fixture
            .engine
            .create_draft(&fixture.ctx, kind, create_death_payload(), "staff-akademik")
            .unwrap();
        let official: CaseId = fixture
            .engine
            .finalize(&fixture.ctx, kind, draft.value(), "staff-akademik")
            .unwrap();
        assert_eq!(official.value(), "001/PMA/MD/IX/2026");

        let status: CaseStatus = fixture
            .engine
            .approve(&fixture.ctx, kind, official.value(), None, "wadir1")
            .unwrap();
        assert_eq!(status, CaseStatus::AwaitingDocument);
        official.value().to_string()
    };

    let fixture: Fixture = create_fixture(&database, &blob_dir);
    let outcome: UploadOutcome = fixture
        .engine
        .upload_document(
            &fixture.ctx,
            kind,
            &official,
            AttachmentUpload::new(AttachmentSlot::Sk, "sk.pdf", b"%PDF".to_vec()),
            "staff-akademik",
        )
        .unwrap();
    assert_eq!(outcome.status, CaseStatus::Approved);
    assert!(outcome.document_number.is_some());
    assert_eq!(fixture.blobs.read(&outcome.blob).unwrap(), b"%PDF".to_vec());

    let case: Case = fixture.engine.get(&fixture.ctx, kind, &official).unwrap();
    assert_eq!(case.status, CaseStatus::Approved);
    assert_eq!(case.approval_trail.len(), 1);
    assert_eq!(case.attachments.get(&AttachmentSlot::Sk), Some(&outcome.blob));

    let trail: Vec<AuditEvent> = fixture
        .queries
        .audit_trail(&fixture.ctx, kind, &official)
        .unwrap();
    let actions: Vec<ActionKind> = trail.iter().map(|event| event.action.kind).collect();
    assert_eq!(
        actions,
        vec![
            ActionKind::CreateDraft,
            ActionKind::Finalize,
            ActionKind::Approve,
            ActionKind::UploadDocument,
        ]
    );
}

#[test]
fn test_finalize_is_idempotent_over_sqlite() {
    let dir: TempDir = TempDir::new().unwrap();
    let fixture: Fixture = create_fixture(&dir.path().join("registrar.db"), dir.path());
    let kind: CaseKind = CaseKind::DeathOfStudent;

    let draft: CaseId = fixture
        .engine
        .create_draft(&fixture.ctx, kind, create_death_payload(), "staff-akademik")
        .unwrap();
    let first: CaseId = fixture
        .engine
        .finalize(&fixture.ctx, kind, draft.value(), "staff-akademik")
        .unwrap();
    let second: CaseId = fixture
        .engine
        .finalize(&fixture.ctx, kind, draft.value(), "staff-akademik")
        .unwrap();

    assert_eq!(first, second);
    let again = fixture
        .engine
        .finalize(&fixture.ctx, kind, first.value(), "staff-akademik");
    assert_eq!(again, Ok(first));
}

#[test]
fn test_official_sequences_increase_over_sqlite() {
    let dir: TempDir = TempDir::new().unwrap();
    let fixture: Fixture = create_fixture(&dir.path().join("registrar.db"), dir.path());
    let kind: CaseKind = CaseKind::DeathOfStudent;

    let ids: Vec<String> = (0..3)
        .map(|_| {
            let draft: CaseId = fixture
                .engine
                .create_draft(&fixture.ctx, kind, create_death_payload(), "staff-akademik")
                .unwrap();
            fixture
                .engine
                .finalize(&fixture.ctx, kind, draft.value(), "staff-akademik")
                .unwrap()
                .value()
                .to_string()
        })
        .collect();

    assert_eq!(
        ids,
        vec![
            String::from("001/PMA/MD/IX/2026"),
            String::from("002/PMA/MD/IX/2026"),
            String::from("003/PMA/MD/IX/2026"),
        ]
    );

    let listed: Vec<CaseSummary> = fixture
        .queries
        .list(&fixture.ctx, kind, &CaseFilter::with_status(CaseStatus::PendingApproval(1)))
        .unwrap();
    assert_eq!(listed.len(), 3);
}

#[test]
fn test_rejected_case_is_terminal_over_sqlite() {
    let dir: TempDir = TempDir::new().unwrap();
    let fixture: Fixture = create_fixture(&dir.path().join("registrar.db"), dir.path());
    let kind: CaseKind = CaseKind::DeathOfStudent;

    let draft: CaseId = fixture
        .engine
        .create_draft(&fixture.ctx, kind, create_death_payload(), "staff-akademik")
        .unwrap();
    let official: CaseId = fixture
        .engine
        .finalize(&fixture.ctx, kind, draft.value(), "staff-akademik")
        .unwrap();
    fixture
        .engine
        .reject(&fixture.ctx, kind, official.value(), None, "wadir1", "  Certificate unreadable ")
        .unwrap();

    let case: Case = fixture.engine.get(&fixture.ctx, kind, official.value()).unwrap();
    assert_eq!(case.status, CaseStatus::Rejected);
    assert_eq!(case.rejection_reason.as_deref(), Some("Certificate unreadable"));

    let result = fixture
        .engine
        .approve(&fixture.ctx, kind, official.value(), None, "wadir1");
    assert!(matches!(result, Err(CoreError::AlreadyProcessed { .. })));
}
