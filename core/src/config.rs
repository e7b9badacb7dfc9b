use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const SPEC_FILE_NAME: &str = "메뉴구조도.csv";
pub const DEFAULT_OUT_DIR: &str = "verify";
pub const SCREENSHOT_DIR: &str = "screenshots";
pub const DEFAULT_OBSERVE_MS: u64 = 1000;
pub const DEFAULT_AI_PAGE_LIMIT: usize = 10;

/// 검증 단계. 높은 단계는 낮은 단계를 모두 포함한다.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Level {
    Static = 1,
    Render = 2,
    Semantic = 3,
}

impl Level {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Level::Static => "정적분석",
            Level::Render => "정적+브라우저",
            Level::Semantic => "전체",
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level.as_u8()
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Level::Static),
            2 => Ok(Level::Render),
            3 => Ok(Level::Semantic),
            other => Err(format!("검증 레벨은 1, 2, 3 중 하나여야 합니다: {}", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct VerifyConfig {
    pub level: Level,
    pub pages_dir: PathBuf,
    pub spec_path: PathBuf,
    pub out_dir: PathBuf,
    pub screenshot_dir: PathBuf,
    pub observe_window: Duration,
    pub ai_page_limit: usize,
}

impl VerifyConfig {
    /// 페이지 디렉터리 기준 기본 배치: `{pages}/메뉴구조도.csv`, `{pages}/verify/`.
    pub fn for_pages_dir(pages_dir: &Path, level: Level) -> Self {
        let out_dir = pages_dir.join(DEFAULT_OUT_DIR);
        Self {
            level,
            pages_dir: pages_dir.to_path_buf(),
            spec_path: pages_dir.join(SPEC_FILE_NAME),
            screenshot_dir: out_dir.join(SCREENSHOT_DIR),
            out_dir,
            observe_window: Duration::from_millis(DEFAULT_OBSERVE_MS),
            ai_page_limit: DEFAULT_AI_PAGE_LIMIT,
        }
    }
}
