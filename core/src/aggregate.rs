use serde::{Deserialize, Serialize};

use crate::config::Level;
use crate::model::{Check, PageResult, Status};

/// 검사 목록을 페이지 상태 하나로 접는다. `PageResult::push`가 누적하는 값과 같다.
pub fn fold_status(checks: &[Check]) -> Status {
    checks
        .iter()
        .fold(Status::Passed, |status, check| status.escalate(check.status))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub total: usize,
    pub passed: usize,
    pub warnings: usize,
    pub failed: usize,
}

impl SummaryCounts {
    pub fn tally(pages: &[PageResult]) -> Self {
        let mut counts = SummaryCounts::default();
        for page in pages {
            counts.total += 1;
            match page.status() {
                Status::Passed | Status::Skipped => counts.passed += 1,
                Status::Warning => counts.warnings += 1,
                Status::Failed => counts.failed += 1,
            }
        }
        counts
    }

    /// 통과율(%). 페이지가 없으면 0.
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.passed as f64 / self.total as f64 * 100.0
    }
}

/// 한 번의 실행 결과. 파이프라인이 만들어 돌려주고, 이후로는 읽기만 한다.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub timestamp: String,
    pub level: Level,
    pub summary: SummaryCounts,
    pub pages: Vec<PageResult>,
}

impl RunSummary {
    pub fn from_pages(timestamp: String, level: Level, pages: Vec<PageResult>) -> Self {
        Self {
            timestamp,
            level,
            summary: SummaryCounts::tally(&pages),
            pages,
        }
    }

    pub fn failed_pages(&self) -> impl Iterator<Item = &PageResult> {
        self.pages
            .iter()
            .filter(|page| page.status() == Status::Failed)
    }

    /// 자동화용 종료 코드: 실패 페이지가 없으면 0.
    pub fn exit_code(&self) -> i32 {
        if self.summary.failed > 0 {
            1
        } else {
            0
        }
    }
}
