use std::path::Path;
use std::time::Duration;

use super::fixtures::{page_markup, row, write_page, FakeBrowser, FakeModel};
use crate::aggregate::RunSummary;
use crate::config::{Level, VerifyConfig};
use crate::locator::PageDir;
use crate::model::{CheckKind, PageResult, Status};
use crate::pipeline::Pipeline;
use crate::platform::LanguageModel;
use crate::progress::{ProgressEvent, VecProgressSink};
use crate::spec_source::SpecRow;

const GOOD_REPLY: &str = "{\"score\": 85, \"missing\": [], \"present\": [\"캐릭터\"], \"issues\": []}";

fn config(root: &Path, level: Level) -> VerifyConfig {
    let mut config = VerifyConfig::for_pages_dir(root, level);
    config.observe_window = Duration::ZERO;
    config
}

fn run(
    root: &Path,
    rows: &[SpecRow],
    level: Level,
    browser: &FakeBrowser,
    model: Option<&dyn LanguageModel>,
) -> (RunSummary, VecProgressSink) {
    let config = config(root, level);
    let pages = PageDir::open(root).expect("open pages");
    let mut progress = VecProgressSink::default();
    let timestamp = "2026-01-01T00:00:00Z".to_string();
    let summary = Pipeline::new(&config, browser, model).run(rows, &pages, timestamp, &mut progress);
    (summary, progress)
}

fn good_page(root: &Path, name: &str) {
    write_page(root, name, &page_markup("<h1>캐릭터 등록</h1><button>저장</button>"));
}

fn find<'a>(summary: &'a RunSummary, id: &str) -> &'a PageResult {
    summary
        .pages
        .iter()
        .find(|page| page.id == id)
        .expect("page in summary")
}

#[test]
fn section_rows_are_never_counted() {
    let dir = tempfile::tempdir().expect("tempdir");
    good_page(dir.path(), "1-1 홈.html");
    let rows = vec![
        row("[크리에이터 섹션]", "", "", ""),
        row("[1-1 홈]", "홈", "캐릭터", ""),
        row("", "", "", ""),
        row("[1-2 목록]", "목록", "캐릭터", ""),
    ];
    let (summary, _) = run(dir.path(), &rows, Level::Static, &FakeBrowser::rendering(""), None);

    let ids: Vec<&str> = summary.pages.iter().map(|page| page.id.as_str()).collect();
    assert_eq!(ids, vec!["1-1", "1-2"]);
    assert_eq!(summary.summary.total, 2);
    assert_eq!(summary.summary.passed, 1);
    assert_eq!(summary.summary.failed, 1);
    let counts = summary.summary;
    assert_eq!(counts.total, counts.passed + counts.warnings + counts.failed);
}

#[test]
fn static_level_never_touches_browser_or_model() {
    let dir = tempfile::tempdir().expect("tempdir");
    good_page(dir.path(), "1-1 홈.html");
    let browser = FakeBrowser::rendering("가".repeat(80).as_str());
    let model = FakeModel::replying(GOOD_REPLY);
    let rows = vec![row("[1-1 홈]", "홈", "캐릭터", "")];

    let (summary, _) = run(dir.path(), &rows, Level::Static, &browser, Some(&model));
    assert_eq!(browser.log.borrow().opened, 0);
    assert!(model.prompts.borrow().is_empty());
    assert_eq!(summary.level, Level::Static);
    assert!(summary.pages[0].screenshot.is_none());
}

#[test]
fn render_tier_adds_checks_and_screenshot() {
    let dir = tempfile::tempdir().expect("tempdir");
    good_page(dir.path(), "1-1 홈.html");
    let browser = FakeBrowser::rendering(&"가".repeat(60));
    let rows = vec![
        row("[1-1 홈]", "홈", "캐릭터", ""),
        row("[1-2 목록]", "목록", "", ""),
    ];
    let (summary, _) = run(dir.path(), &rows, Level::Render, &browser, None);

    // 파일이 없는 페이지는 렌더링하지 않는다.
    assert_eq!(browser.log.borrow().opened, 1);
    assert!(browser.log.borrow().urls[0].starts_with("file://"));
    assert!(browser.log.borrow().urls[0].ends_with("1-1%20%ED%99%88.html"));

    let home = find(&summary, "1-1");
    assert_eq!(home.status(), Status::Passed);
    assert!(home.has_check(CheckKind::ConsoleErrors));
    assert!(home.has_check(CheckKind::ContentLength));
    assert!(home.has_check(CheckKind::Screenshot));
    let shot = dir.path().join("verify").join("screenshots").join("1-1 홈.png");
    assert!(shot.exists());
    assert_eq!(home.screenshot.as_deref(), Some(shot.display().to_string().as_str()));

    let missing = find(&summary, "1-2");
    assert_eq!(missing.checks().len(), 1);
}

#[test]
fn short_render_and_console_errors_are_recorded() {
    let dir = tempfile::tempdir().expect("tempdir");
    good_page(dir.path(), "1-1 홈.html");
    let mut browser = FakeBrowser::rendering(&"가".repeat(49));
    browser.console = vec!["Uncaught TypeError: x is undefined".to_string()];
    let rows = vec![row("[1-1 홈]", "홈", "캐릭터", "")];
    let (summary, _) = run(dir.path(), &rows, Level::Render, &browser, None);

    let home = find(&summary, "1-1");
    assert_eq!(home.status(), Status::Failed);
    let messages: Vec<&str> = home.checks().iter().map(|c| c.message.as_str()).collect();
    assert!(messages.contains(&"콘텐츠 부족: 49자"));
    assert!(messages
        .iter()
        .any(|m| m.starts_with("콘솔 에러 1개: Uncaught TypeError")));
}

#[test]
fn browser_failure_keeps_static_checks() {
    let dir = tempfile::tempdir().expect("tempdir");
    good_page(dir.path(), "1-1 홈.html");
    let browser = FakeBrowser::failing("Chrome launch failed: no binary");
    let rows = vec![row("[1-1 홈]", "홈", "캐릭터", "")];
    let (summary, _) = run(dir.path(), &rows, Level::Render, &browser, None);

    let home = find(&summary, "1-1");
    assert_eq!(home.status(), Status::Failed);
    assert!(home.has_check(CheckKind::FileExistence));
    assert!(home.has_check(CheckKind::Structure));
    let last = home.checks().last().expect("checks");
    assert_eq!(last.kind, CheckKind::BrowserError);
    assert_eq!(last.message, "브라우저 에러: Chrome launch failed: no binary");
    assert!(!home.has_check(CheckKind::Screenshot));
}

#[test]
fn missing_credential_skips_semantic_check() {
    let dir = tempfile::tempdir().expect("tempdir");
    good_page(dir.path(), "1-1 홈.html");
    let browser = FakeBrowser::rendering(&"가".repeat(60));
    let rows = vec![row("[1-1 홈]", "홈", "캐릭터", "")];
    let (summary, _) = run(dir.path(), &rows, Level::Semantic, &browser, None);

    let home = find(&summary, "1-1");
    let last = home.checks().last().expect("checks");
    assert_eq!(last.kind, CheckKind::AiVerification);
    assert_eq!(last.status, Status::Skipped);
    assert_eq!(home.status(), Status::Passed);
    assert!(home.semantic_score.is_none());
}

#[test]
fn semantic_verdict_is_stored_on_the_page() {
    let dir = tempfile::tempdir().expect("tempdir");
    good_page(dir.path(), "1-1 홈.html");
    let browser = FakeBrowser::rendering(&"가".repeat(60));
    let model = FakeModel::replying(&format!("결과:\n{}", GOOD_REPLY));
    let rows = vec![row("[1-1 홈]", "홈", "캐릭터 등록", "")];
    let (summary, progress) = run(dir.path(), &rows, Level::Semantic, &browser, Some(&model));

    let home = find(&summary, "1-1");
    assert_eq!(home.semantic_score, Some(85.0));
    assert_eq!(
        home.semantic_details.as_ref().map(|d| d.present.clone()),
        Some(vec!["캐릭터".to_string()])
    );
    assert!(model.prompts.borrow()[0].contains("캐릭터 등록"));
    assert!(progress.events.contains(&ProgressEvent::SemanticScored {
        file_name: "1-1 홈.html".to_string(),
        score: Some(85.0),
    }));
}

#[test]
fn service_errors_only_warn() {
    let dir = tempfile::tempdir().expect("tempdir");
    good_page(dir.path(), "1-1 홈.html");
    let browser = FakeBrowser::rendering(&"가".repeat(60));
    let model = FakeModel::erroring("HTTP 529 overloaded");
    let rows = vec![row("[1-1 홈]", "홈", "캐릭터", "")];
    let (summary, _) = run(dir.path(), &rows, Level::Semantic, &browser, Some(&model));

    let home = find(&summary, "1-1");
    assert_eq!(home.status(), Status::Warning);
    let last = home.checks().last().expect("checks");
    assert_eq!(last.kind, CheckKind::AiVerification);
    assert_eq!(last.message, "AI 검증 에러: HTTP 529 overloaded");
}

#[test]
fn unparseable_verdict_only_warns() {
    let dir = tempfile::tempdir().expect("tempdir");
    good_page(dir.path(), "1-1 홈.html");
    let browser = FakeBrowser::rendering(&"가".repeat(60));
    let model = FakeModel::replying("판단할 수 없습니다");
    let rows = vec![row("[1-1 홈]", "홈", "캐릭터", "")];
    let (summary, progress) = run(dir.path(), &rows, Level::Semantic, &browser, Some(&model));

    let home = find(&summary, "1-1");
    let last = home.checks().last().expect("checks");
    assert_eq!(last.kind, CheckKind::AiSemantic);
    assert_eq!(last.status, Status::Warning);
    assert_eq!(last.message, "AI 응답 파싱 실패");
    assert!(home.semantic_score.is_none());
    assert!(home.semantic_details.is_none());
    assert_eq!(home.status(), Status::Warning);
    assert!(progress.events.contains(&ProgressEvent::SemanticScored {
        file_name: "1-1 홈.html".to_string(),
        score: None,
    }));
}

#[test]
fn non_utf8_page_reaches_every_tier() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut bytes = page_markup("<h1>캐릭터 등록</h1><button>저장</button>").into_bytes();
    bytes.extend_from_slice(b"<!-- \xff -->");
    std::fs::write(dir.path().join("1-1 홈.html"), bytes).expect("write page");
    let browser = FakeBrowser::rendering(&"가".repeat(60));
    let model = FakeModel::replying(GOOD_REPLY);
    let rows = vec![row("[1-1 홈]", "홈", "캐릭터", "")];
    let (summary, _) = run(dir.path(), &rows, Level::Semantic, &browser, Some(&model));

    let home = find(&summary, "1-1");
    assert_eq!(home.file_name.as_deref(), Some("1-1 홈.html"));
    assert_eq!(browser.log.borrow().opened, 1);
    assert_eq!(model.prompts.borrow().len(), 1);
    assert_eq!(home.semantic_score, Some(85.0));
    assert_eq!(home.status(), Status::Passed);
}

#[test]
fn semantic_tier_takes_first_ten_located_pages() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut rows = vec![row("[9-9 없음]", "없음", "캐릭터", "")];
    for n in 1..=12 {
        good_page(dir.path(), &format!("5-{} 페이지.html", n));
        rows.push(row(&format!("[5-{} 페이지]", n), "페이지", "캐릭터", ""));
    }
    let browser = FakeBrowser::rendering(&"가".repeat(60));
    let model = FakeModel::replying(GOOD_REPLY);
    let (summary, progress) = run(dir.path(), &rows, Level::Semantic, &browser, Some(&model));

    assert_eq!(model.prompts.borrow().len(), 10);
    for n in 1..=10 {
        let page = find(&summary, &format!("5-{}", n));
        assert!(page.has_check(CheckKind::AiSemantic), "5-{}", n);
    }
    for n in 11..=12 {
        let page = find(&summary, &format!("5-{}", n));
        assert!(!page.has_check(CheckKind::AiSemantic), "5-{}", n);
        assert!(page.semantic_score.is_none());
    }
    assert!(progress.events.contains(&ProgressEvent::TierStarted {
        level: Level::Semantic,
        pages: 10,
    }));
    assert_eq!(summary.summary.total, 13);
}

#[test]
fn progress_follows_tier_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    good_page(dir.path(), "1-1 홈.html");
    good_page(dir.path(), "1-2 목록.html");
    let rows = vec![
        row("[1-1 홈]", "홈", "캐릭터", ""),
        row("[1-2 목록]", "목록", "캐릭터", ""),
    ];
    let browser = FakeBrowser::rendering(&"가".repeat(60));
    let (_, progress) = run(dir.path(), &rows, Level::Render, &browser, None);

    let levels: Vec<Level> = progress
        .events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::PageChecked { level, .. } => Some(*level),
            _ => None,
        })
        .collect();
    assert_eq!(
        levels,
        vec![Level::Static, Level::Static, Level::Render, Level::Render]
    );
    assert_eq!(progress.events[0], ProgressEvent::SpecLoaded { rows: 2 });
}

#[test]
fn static_tier_counts_only_identified_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    good_page(dir.path(), "1-1 홈.html");
    let rows = vec![
        row("[크리에이터 섹션]", "", "", ""),
        row("[1-1 홈]", "홈", "캐릭터", ""),
        row("[1-2 목록]", "목록", "캐릭터", ""),
    ];
    let (_, progress) = run(dir.path(), &rows, Level::Static, &FakeBrowser::rendering(""), None);

    assert_eq!(progress.events[0], ProgressEvent::SpecLoaded { rows: 3 });
    assert_eq!(
        progress.events[1],
        ProgressEvent::TierStarted {
            level: Level::Static,
            pages: 2,
        }
    );
}
