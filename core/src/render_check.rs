//! Level 2: 헤드리스 브라우저로 실제 렌더링 결과를 확인한다.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::locator::{PageArtifact, PAGE_EXTENSION};
use crate::model::{Check, CheckKind, PageResult};
use crate::platform::PageBrowser;
use crate::text::truncate_chars;

pub const MIN_RENDERED_CHARS: usize = 50;
const CONSOLE_EXCERPT_CHARS: usize = 50;
const BROWSER_ERROR_CHARS: usize = 100;

#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub screenshot_dir: PathBuf,
    pub observe_window: Duration,
}

/// 한 페이지를 새 브라우저 세션에서 검사한다.
///
/// 도중에 실패하면 `browser_error` 하나만 남기고 나머지 렌더 검사는 건너뛴다.
/// 이미 기록된 정적 검사는 그대로 둔다.
pub fn run(
    page: &mut PageResult,
    artifact: &PageArtifact,
    browser: &dyn PageBrowser,
    options: &RenderOptions,
) {
    if let Err(message) = drive(page, artifact, browser, options) {
        log::warn!("render failed for {}: {}", artifact.file_name, message);
        page.push(Check::failed(
            CheckKind::BrowserError,
            format!("브라우저 에러: {}", truncate_chars(&message, BROWSER_ERROR_CHARS)),
        ));
    }
}

fn drive(
    page: &mut PageResult,
    artifact: &PageArtifact,
    browser: &dyn PageBrowser,
    options: &RenderOptions,
) -> Result<(), String> {
    let mut session = browser.open()?;
    session.navigate(&file_url(&artifact.path)?)?;

    let errors = session.console_errors(options.observe_window)?;
    page.push(console_check(&errors));

    let text = session.rendered_text()?;
    page.push(content_check(text.trim().chars().count()));

    let png = session.screenshot()?;
    fs::create_dir_all(&options.screenshot_dir)
        .map_err(|e| format!("스크린샷 디렉터리 생성 실패: {}", e))?;
    let target = options.screenshot_dir.join(screenshot_name(&artifact.file_name));
    fs::write(&target, png).map_err(|e| format!("스크린샷 저장 실패: {}", e))?;
    page.screenshot = Some(target.display().to_string());
    page.push(Check::passed(
        CheckKind::Screenshot,
        format!("스크린샷 저장: {}", screenshot_name(&artifact.file_name)),
    ));
    Ok(())
}

pub fn console_check(errors: &[String]) -> Check {
    match errors.first() {
        Some(first) => Check::warning(
            CheckKind::ConsoleErrors,
            format!(
                "콘솔 에러 {}개: {}...",
                errors.len(),
                truncate_chars(first, CONSOLE_EXCERPT_CHARS)
            ),
        ),
        None => Check::passed(CheckKind::ConsoleErrors, "콘솔 에러 없음"),
    }
}

/// 렌더링된 본문 글자 수 검사. 원본 마크업이 아니라 실제 출력 기준이라 더 엄격하다.
pub fn content_check(rendered_chars: usize) -> Check {
    if rendered_chars < MIN_RENDERED_CHARS {
        Check::failed(
            CheckKind::EmptyContent,
            format!("콘텐츠 부족: {}자", rendered_chars),
        )
    } else {
        Check::passed(
            CheckKind::ContentLength,
            format!("콘텐츠 길이: {}자", rendered_chars),
        )
    }
}

/// `6-1-1 캐릭터 등록.html` -> `6-1-1 캐릭터 등록.png`
pub fn screenshot_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(PAGE_EXTENSION).unwrap_or(file_name);
    format!("{}.png", stem)
}

pub fn file_url(path: &Path) -> Result<String, String> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| format!("현재 디렉터리 확인 실패: {}", e))?
            .join(path)
    };
    url::Url::from_file_path(&absolute)
        .map(|url| url.to_string())
        .map_err(|_| format!("file URL 변환 실패: {}", absolute.display()))
}
