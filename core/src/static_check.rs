//! Level 1: 페이지 원본 마크업만 보고 하는 정적 검사.
//!
//! 검사 순서는 고정이다: 파일 존재 → 플레이스홀더 → 키워드 → 링크 → 버튼 → 기본 구조.
//! 파일이 없을 때만 중간에 멈추고, 나머지는 앞선 결과와 상관없이 모두 수행한다.

use std::sync::OnceLock;

use kuchiki::traits::TendrilSink;
use kuchiki::NodeRef;
use regex::Regex;

use crate::locator::{PageArtifact, PageDir, PAGE_EXTENSION};
use crate::model::{Check, CheckKind, PageResult};
use crate::spec_source::SpecRow;
use crate::text::{nfc, read_lossy, truncate_chars};

pub const PLACEHOLDER_SENTINELS: [&str; 3] = [
    "메뉴구조도.csv 스펙에 따라",
    "페이지 콘텐츠가 여기에 표시됩니다",
    "이 페이지의 상세 콘텐츠는",
];
pub const MAX_KEYWORD_PHRASES: usize = 5;
pub const BUTTON_SELECTOR: &str = "button, .btn, [class*=\"btn\"]";
pub const HEADER_SELECTOR: &str = "#header-placeholder, header";
pub const MAIN_SELECTOR: &str = "main";
pub const FOOTER_SELECTOR: &str = "#footer-placeholder, footer";

const PLACEHOLDER_EXCERPT_CHARS: usize = 30;

fn hangul_run() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[\x{AC00}-\x{D7AF}]{2,}").expect("hangul pattern"))
}

fn action_target() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"→\[([^\]]+)\]").expect("action target pattern"))
}

pub fn run(page: &mut PageResult, row: &SpecRow, artifact: Option<&PageArtifact>, dir: &PageDir) {
    let Some(artifact) = artifact else {
        page.push(Check::failed(
            CheckKind::FileExistence,
            format!("파일 없음: {}*{}", page.id, PAGE_EXTENSION),
        ));
        return;
    };
    let markup = match read_lossy(&artifact.path) {
        Ok(markup) => markup,
        Err(e) => {
            page.push(Check::failed(
                CheckKind::FileExistence,
                format!("파일 읽기 실패: {} ({})", artifact.file_name, e),
            ));
            return;
        }
    };
    page.file_name = Some(artifact.file_name.clone());
    page.push(Check::passed(
        CheckKind::FileExistence,
        format!("파일 존재: {}", artifact.file_name),
    ));
    check_markup(page, row, &markup, dir);
}

/// 파일 존재 이후의 검사들. 마크업 문자열만으로 재현 가능하다.
pub fn check_markup(page: &mut PageResult, row: &SpecRow, markup: &str, dir: &PageDir) {
    let document = kuchiki::parse_html().one(markup);

    let mut placeholder_found = false;
    for sentinel in PLACEHOLDER_SENTINELS {
        if markup.contains(sentinel) {
            placeholder_found = true;
            page.push(Check::failed(
                CheckKind::Placeholder,
                format!(
                    "플레이스홀더 텍스트 발견: \"{}...\"",
                    truncate_chars(sentinel, PLACEHOLDER_EXCERPT_CHARS)
                ),
            ));
        }
    }
    if !placeholder_found {
        page.push(Check::passed(CheckKind::Placeholder, "플레이스홀더 텍스트 없음"));
    }

    let text = body_text(&document);
    let (found, missing) = match_keywords(&row.expected_content, &text);
    if !found.is_empty() {
        page.push(Check::passed(
            CheckKind::ContentKeywords,
            format!("키워드 발견: {}", found.join(", ")),
        ));
    }
    if !missing.is_empty() {
        page.push(Check::warning(
            CheckKind::ContentKeywords,
            format!("키워드 미발견: {}", missing.join(", ")),
        ));
    }

    let links = internal_links(&document);
    let mut broken: Vec<&str> = Vec::new();
    for link in &links {
        if !broken.contains(&link.as_str()) && !dir.link_target_exists(link) {
            broken.push(link);
        }
    }
    if !broken.is_empty() {
        page.push(Check::failed(
            CheckKind::BrokenLinks,
            format!("깨진 링크: {}", broken.join(", ")),
        ));
    } else if !links.is_empty() {
        page.push(Check::passed(
            CheckKind::Links,
            format!("링크 {}개 정상", links.len()),
        ));
    }

    let buttons = count_matches(&document, BUTTON_SELECTOR);
    let expected_actions = expected_action_targets(&row.expected_actions);
    if buttons == 0 && !expected_actions.is_empty() {
        page.push(Check::warning(
            CheckKind::Buttons,
            format!("버튼 요소가 없음 (기대 액션 {}개)", expected_actions.len()),
        ));
    } else {
        page.push(Check::passed(
            CheckKind::Buttons,
            format!("버튼 {}개 존재", buttons),
        ));
    }

    let regions = [
        ("header", HEADER_SELECTOR),
        ("main", MAIN_SELECTOR),
        ("footer", FOOTER_SELECTOR),
    ];
    let absent: Vec<&str> = regions
        .iter()
        .filter(|(_, selector)| document.select_first(selector).is_err())
        .map(|(name, _)| *name)
        .collect();
    if absent.is_empty() {
        page.push(Check::passed(
            CheckKind::Structure,
            "기본 구조 정상 (header, main, footer)",
        ));
    } else {
        page.push(Check::warning(
            CheckKind::Structure,
            format!("기본 구조 불완전: {} 없음", absent.join(", ")),
        ));
    }
}

/// `<body>` 텍스트(NFC).
pub fn body_text(document: &NodeRef) -> String {
    let text = document
        .select_first("body")
        .map(|body| body.text_contents())
        .unwrap_or_else(|_| document.text_contents());
    nfc(&text)
}

/// 쉼표로 나눈 앞 5개 구절에서 뽑은 핵심 키워드.
pub fn expected_keywords(expected_content: &str) -> Vec<String> {
    expected_content
        .split(',')
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .take(MAX_KEYWORD_PHRASES)
        .filter_map(main_keyword)
        .collect()
}

/// 구절 안에서 처음 나오는 2글자 이상 한글 연속 구간.
pub fn main_keyword(phrase: &str) -> Option<String> {
    let phrase = nfc(phrase);
    hangul_run().find(&phrase).map(|m| m.as_str().to_string())
}

/// (발견, 미발견) 키워드. `text`는 NFC로 정규화되어 있어야 한다.
pub fn match_keywords(expected_content: &str, text: &str) -> (Vec<String>, Vec<String>) {
    expected_keywords(expected_content)
        .into_iter()
        .partition(|keyword| text.contains(keyword.as_str()))
}

/// `→[대상]` 표기에서 뽑은 이동 대상.
pub fn expected_action_targets(expected_actions: &str) -> Vec<String> {
    action_target()
        .captures_iter(expected_actions)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn is_absolute_href(href: &str) -> bool {
    let lower = href.to_ascii_lowercase();
    lower.starts_with("http:")
        || lower.starts_with("https:")
        || lower.starts_with("file:")
        || lower.starts_with("//")
}

/// `.html`로 끝나는 상대 링크 href 목록(문서 순서).
pub fn internal_links(document: &NodeRef) -> Vec<String> {
    let Ok(anchors) = document.select("a[href]") else {
        return Vec::new();
    };
    anchors
        .filter_map(|anchor| {
            let attrs = anchor.attributes.borrow();
            attrs.get("href").map(|href| href.trim().to_string())
        })
        .filter(|href| href.ends_with(PAGE_EXTENSION) && !is_absolute_href(href))
        .collect()
}

pub fn count_matches(document: &NodeRef, selector: &str) -> usize {
    document
        .select(selector)
        .map(|matches| matches.count())
        .unwrap_or(0)
}
