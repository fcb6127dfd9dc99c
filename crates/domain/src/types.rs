// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of administrative case.
///
/// The kind selects the approval policy (role sequence, identifier
/// templates, document requirement) the workflow applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseKind {
    /// Temporary academic leave (cuti akademik).
    AcademicLeave,
    /// Student dropped out of the program.
    DropOut,
    /// Record of a student's death.
    DeathOfStudent,
    /// Student resigned from the program.
    Resignation,
}

impl CaseKind {
    /// All case kinds, in a stable order.
    pub const ALL: [Self; 4] = [
        Self::AcademicLeave,
        Self::DropOut,
        Self::DeathOfStudent,
        Self::Resignation,
    ];

    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AcademicLeave => "academic_leave",
            Self::DropOut => "drop_out",
            Self::DeathOfStudent => "death_of_student",
            Self::Resignation => "resignation",
        }
    }
}

impl FromStr for CaseKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "academic_leave" => Ok(Self::AcademicLeave),
            "drop_out" => Ok(Self::DropOut),
            "death_of_student" => Ok(Self::DeathOfStudent),
            "resignation" => Ok(Self::Resignation),
            _ => Err(DomainError::InvalidCaseKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for CaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed set of approver roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleTag {
    /// Head of the study program.
    Prodi,
    /// Student affairs office.
    Kemahasiswaan,
    /// First vice director (academic affairs).
    Wadir1,
    /// Director.
    Direktur,
}

impl RoleTag {
    /// Returns the string representation used for persistence.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Prodi => "prodi",
            Self::Kemahasiswaan => "kemahasiswaan",
            Self::Wadir1 => "wadir1",
            Self::Direktur => "direktur",
        }
    }
}

impl FromStr for RoleTag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prodi" => Ok(Self::Prodi),
            "kemahasiswaan" => Ok(Self::Kemahasiswaan),
            "wadir1" => Ok(Self::Wadir1),
            "direktur" => Ok(Self::Direktur),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for RoleTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Named attachment slots a case can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttachmentSlot {
    /// Letter submitted with the request.
    SubmissionLetter,
    /// Supporting evidence (e.g. a death certificate).
    SupportingDocument,
    /// The issued decision document.
    Sk,
    /// Supplementary pages of the decision document.
    SkSupplementary,
}

impl AttachmentSlot {
    /// Returns the slot name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SubmissionLetter => "submission-letter",
            Self::SupportingDocument => "supporting-document",
            Self::Sk => "sk",
            Self::SkSupplementary => "sk-supplementary",
        }
    }

    /// Returns true for slots that hold the issued decision document.
    #[must_use]
    pub const fn is_document(&self) -> bool {
        matches!(self, Self::Sk | Self::SkSupplementary)
    }
}

impl FromStr for AttachmentSlot {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submission-letter" => Ok(Self::SubmissionLetter),
            "supporting-document" => Ok(Self::SupportingDocument),
            "sk" => Ok(Self::Sk),
            "sk-supplementary" => Ok(Self::SkSupplementary),
            _ => Err(DomainError::InvalidAttachmentSlot(s.to_string())),
        }
    }
}

impl std::fmt::Display for AttachmentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which form a case identifier currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdKind {
    /// Temporary identifier assigned at creation.
    Draft,
    /// Formatted, period-scoped identifier assigned at finalization.
    Official,
}

impl IdKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Official => "official",
        }
    }
}

impl FromStr for IdKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "official" => Ok(Self::Official),
            _ => Err(DomainError::InvalidIdKind(s.to_string())),
        }
    }
}

/// A case identifier together with its explicit form tag.
///
/// Draft and official identifiers share one identifier space per kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseId {
    value: String,
    kind: IdKind,
}

impl CaseId {
    /// Creates a draft identifier.
    #[must_use]
    pub fn draft(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: IdKind::Draft,
        }
    }

    /// Creates an official identifier.
    #[must_use]
    pub fn official(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: IdKind::Official,
        }
    }

    /// Rebuilds an identifier from its stored parts.
    #[must_use]
    pub fn from_parts(value: impl Into<String>, kind: IdKind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub const fn id_kind(&self) -> IdKind {
        self.kind
    }

    #[must_use]
    pub const fn is_official(&self) -> bool {
        matches!(self.kind, IdKind::Official)
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// The identifier space an allocated sequence number belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdSeries {
    /// Case identifiers (draft and official).
    Case,
    /// Decision document numbers.
    Document,
}

impl IdSeries {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Case => "case",
            Self::Document => "document",
        }
    }
}

impl std::fmt::Display for IdSeries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference name returned by a blob store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobRef(String);

impl BlobRef {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BlobRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
