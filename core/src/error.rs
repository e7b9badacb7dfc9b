use std::fmt;

/// 실행 전체를 멈추는 오류. 페이지 단위 문제는 검사 결과(Check)로 남는다.
#[derive(Debug)]
pub enum VerifyError {
    SpecUnreadable { path: String, message: String },
    PageDirUnreadable { path: String, message: String },
    ReportWrite { path: String, message: String },
}

impl VerifyError {
    pub fn code(&self) -> &'static str {
        match self {
            VerifyError::SpecUnreadable { .. } => "E_SPEC_UNREADABLE",
            VerifyError::PageDirUnreadable { .. } => "E_PAGE_DIR_UNREADABLE",
            VerifyError::ReportWrite { .. } => "E_REPORT_WRITE",
        }
    }

    pub fn report_write(path: &std::path::Path, err: impl fmt::Display) -> Self {
        VerifyError::ReportWrite {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::SpecUnreadable { path, message } => {
                write!(f, "스펙 파일을 읽을 수 없습니다: {} ({})", path, message)
            }
            VerifyError::PageDirUnreadable { path, message } => {
                write!(f, "페이지 디렉터리를 읽을 수 없습니다: {} ({})", path, message)
            }
            VerifyError::ReportWrite { path, message } => {
                write!(f, "리포트 저장 실패: {} ({})", path, message)
            }
        }
    }
}

impl std::error::Error for VerifyError {}
