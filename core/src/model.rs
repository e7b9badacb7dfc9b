use serde::{Deserialize, Serialize};

use crate::semantic::SemanticVerdict;
use crate::spec_source::SpecRow;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Warning,
    Failed,
    Skipped,
}

impl Status {
    pub fn name(&self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::Warning => "warning",
            Status::Failed => "failed",
            Status::Skipped => "skipped",
        }
    }

    /// 페이지 상태에 검사 상태를 합친다. failed > warning > passed, skipped는 영향 없음.
    pub fn escalate(self, check: Status) -> Status {
        match (self, check) {
            (Status::Failed, _) | (_, Status::Failed) => Status::Failed,
            (Status::Passed, Status::Warning) => Status::Warning,
            (current, _) => current,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    FileExistence,
    Placeholder,
    ContentKeywords,
    BrokenLinks,
    Links,
    Buttons,
    Structure,
    ConsoleErrors,
    ContentLength,
    EmptyContent,
    Screenshot,
    BrowserError,
    AiSemantic,
    AiVerification,
}

impl CheckKind {
    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::FileExistence => "file_existence",
            CheckKind::Placeholder => "placeholder",
            CheckKind::ContentKeywords => "content_keywords",
            CheckKind::BrokenLinks => "broken_links",
            CheckKind::Links => "links",
            CheckKind::Buttons => "buttons",
            CheckKind::Structure => "structure",
            CheckKind::ConsoleErrors => "console_errors",
            CheckKind::ContentLength => "content_length",
            CheckKind::EmptyContent => "empty_content",
            CheckKind::Screenshot => "screenshot",
            CheckKind::BrowserError => "browser_error",
            CheckKind::AiSemantic => "ai_semantic",
            CheckKind::AiVerification => "ai_verification",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Check {
    pub kind: CheckKind,
    pub status: Status,
    pub message: String,
}

impl Check {
    pub fn new(kind: CheckKind, status: Status, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
        }
    }

    pub fn passed(kind: CheckKind, message: impl Into<String>) -> Self {
        Self::new(kind, Status::Passed, message)
    }

    pub fn warning(kind: CheckKind, message: impl Into<String>) -> Self {
        Self::new(kind, Status::Warning, message)
    }

    pub fn failed(kind: CheckKind, message: impl Into<String>) -> Self {
        Self::new(kind, Status::Failed, message)
    }

    pub fn skipped(kind: CheckKind, message: impl Into<String>) -> Self {
        Self::new(kind, Status::Skipped, message)
    }
}

/// 스펙 한 행(식별자가 있는 행)에 대한 검증 기록.
///
/// 검사는 덧붙이기만 하고, 상태는 `push`를 거쳐서만 올라간다.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub id: String,
    pub storyboard: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    status: Status,
    checks: Vec<Check>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_details: Option<SemanticVerdict>,
}

impl PageResult {
    pub fn new(id: impl Into<String>, row: &SpecRow) -> Self {
        Self {
            id: id.into(),
            storyboard: row.id.clone(),
            description: row.description.clone(),
            file_name: None,
            status: Status::Passed,
            checks: Vec::new(),
            screenshot: None,
            semantic_score: None,
            semantic_details: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn push(&mut self, check: Check) {
        self.status = self.status.escalate(check.status);
        self.checks.push(check);
    }

    pub fn checks_with(&self, status: Status) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(move |check| check.status == status)
    }

    pub fn has_check(&self, kind: CheckKind) -> bool {
        self.checks.iter().any(|check| check.kind == kind)
    }
}
