// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::memory::{InMemoryBlobStore, InMemoryCaseStore};
use crate::{
    AttachmentUpload, CaseStore, Clock, DraftPayload, FixedClock, IdentifierAllocator,
    QueryService, RequestContext, RoleRule, RuleBasedResolver, UsernameMatcher, WorkflowEngine,
};
use registrar_domain::{
    AttachmentSlot, BlobRef, Case, CaseId, CaseKind, CaseStatus, PolicyTable, RoleTag,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use time::OffsetDateTime;
use time::macros::datetime;

pub fn create_test_time() -> OffsetDateTime {
    datetime!(2026-09-14 09:00 UTC)
}

pub fn create_test_policies() -> Arc<PolicyTable> {
    Arc::new(PolicyTable::standard("PMA").unwrap())
}

pub fn create_test_resolver() -> RuleBasedResolver {
    RuleBasedResolver::new(vec![
        RoleRule {
            role: RoleTag::Prodi,
            matcher: UsernameMatcher::Prefix {
                value: String::from("kaprodi"),
            },
        },
        RoleRule {
            role: RoleTag::Wadir1,
            matcher: UsernameMatcher::Exact {
                usernames: vec![String::from("wadir1")],
            },
        },
        RoleRule {
            role: RoleTag::Direktur,
            matcher: UsernameMatcher::Exact {
                usernames: vec![String::from("direktur")],
            },
        },
    ])
}

/// Username the test resolver maps to `role`.
pub const fn approver_for(role: RoleTag) -> &'static str {
    match role {
        RoleTag::Prodi => "kaprodi.ti",
        RoleTag::Wadir1 => "wadir1",
        RoleTag::Direktur => "direktur",
        RoleTag::Kemahasiswaan => "kemahasiswaan",
    }
}

/// Engine wired to in-memory adapters and a fixed clock.
pub struct TestHarness {
    pub engine: WorkflowEngine,
    pub queries: QueryService,
    pub store: Arc<InMemoryCaseStore>,
    pub blobs: Arc<InMemoryBlobStore>,
    pub clock: Arc<FixedClock>,
    pub policies: Arc<PolicyTable>,
    pub ctx: RequestContext,
}

impl TestHarness {
    pub fn new() -> Self {
        let store: Arc<InMemoryCaseStore> = Arc::new(InMemoryCaseStore::new());
        let blobs: Arc<InMemoryBlobStore> = Arc::new(InMemoryBlobStore::new());
        let clock: Arc<FixedClock> = Arc::new(FixedClock::new(create_test_time()));
        let policies: Arc<PolicyTable> = create_test_policies();

        let engine: WorkflowEngine = WorkflowEngine::new(
            store.clone(),
            blobs.clone(),
            Arc::new(create_test_resolver()),
            clock.clone(),
            policies.clone(),
        );
        let queries: QueryService = QueryService::new(store.clone(), policies.clone());

        Self {
            engine,
            queries,
            store,
            blobs,
            clock,
            policies,
            ctx: RequestContext::new(),
        }
    }

    pub fn allocator(&self) -> IdentifierAllocator {
        let store: Arc<dyn CaseStore> = self.store.clone();
        let clock: Arc<dyn Clock> = self.clock.clone();
        IdentifierAllocator::new(store, self.policies.clone(), clock)
    }

    pub fn create(&self, kind: CaseKind, student_id: &str) -> CaseId {
        self.engine
            .create_draft(&self.ctx, kind, create_valid_payload(kind, student_id), "staff-akademik")
            .unwrap()
    }

    pub fn create_and_finalize(&self, kind: CaseKind, student_id: &str) -> String {
        let draft: CaseId = self.create(kind, student_id);
        self.engine
            .finalize(&self.ctx, kind, draft.value(), "staff-akademik")
            .unwrap()
            .value()
            .to_string()
    }

    /// Approves every required step in order.
    pub fn approve_all(&self, kind: CaseKind, case_id: &str) -> CaseStatus {
        let roles: Vec<RoleTag> = self.policies.get(kind).roles.clone();
        let mut status: CaseStatus = CaseStatus::Draft;
        for role in roles {
            status = self
                .engine
                .approve(&self.ctx, kind, case_id, Some(role), approver_for(role))
                .unwrap();
        }
        status
    }

    pub fn get(&self, kind: CaseKind, case_id: &str) -> Case {
        self.engine.get(&self.ctx, kind, case_id).unwrap()
    }

    pub fn upload_sk(&self, kind: CaseKind, case_id: &str, bytes: &[u8]) -> crate::UploadOutcome {
        self.engine
            .upload_document(
                &self.ctx,
                kind,
                case_id,
                AttachmentUpload::new(AttachmentSlot::Sk, "sk.pdf", bytes.to_vec()),
                "staff-akademik",
            )
            .unwrap()
    }
}

/// A submission satisfying the kind's required fields and attachments.
pub fn create_valid_payload(kind: CaseKind, student_id: &str) -> DraftPayload {
    let mut details: BTreeMap<String, String> = BTreeMap::new();
    let mut attachments: Vec<AttachmentUpload> = Vec::new();

    match kind {
        CaseKind::AcademicLeave => {
            details.insert(String::from("reason"), String::from("Medical treatment"));
            details.insert(String::from("semester_count"), String::from("1"));
            attachments.push(AttachmentUpload::new(
                AttachmentSlot::SubmissionLetter,
                "letter.pdf",
                b"letter".to_vec(),
            ));
        }
        CaseKind::DropOut => {
            details.insert(String::from("reason"), String::from("Exceeded study period"));
        }
        CaseKind::DeathOfStudent => {
            details.insert(String::from("date_of_death"), String::from("2026-08-30"));
            attachments.push(AttachmentUpload::new(
                AttachmentSlot::SupportingDocument,
                "certificate.pdf",
                b"certificate".to_vec(),
            ));
        }
        CaseKind::Resignation => {
            details.insert(String::from("reason"), String::from("Moving abroad"));
            attachments.push(AttachmentUpload::new(
                AttachmentSlot::SubmissionLetter,
                "letter.pdf",
                b"letter".to_vec(),
            ));
        }
    }

    DraftPayload {
        student_id: String::from(student_id),
        details,
        attachments,
    }
}

/// A case built directly, for pure transition tests.
pub fn create_test_case(kind: CaseKind, status: CaseStatus) -> Case {
    let payload: DraftPayload = create_valid_payload(kind, "0420240032");
    let attachments: BTreeMap<AttachmentSlot, BlobRef> = payload
        .attachments
        .iter()
        .map(|upload| (upload.slot, BlobRef::new(upload.file_name.clone())))
        .collect();

    let mut case: Case = Case::new_draft(
        CaseId::draft("1789000000000123"),
        kind,
        payload.student_id,
        payload.details,
        attachments,
        String::from("staff-akademik"),
        create_test_time(),
    );
    if status != CaseStatus::Draft {
        case.id = CaseId::official("001/PMA/XX/IX/2026");
    }
    case.status = status;
    case
}
