//! 수동/외부 도구 검증용 계획 파일.
//!
//! 브라우저를 직접 띄우지 않고, 페이지마다 실행할 DOM 평가 스크립트 목록을 만든다.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::VerifyError;
use crate::locator::{resolve_id, PageDir};
use crate::render_check::file_url;
use crate::report::sha256_hex;
use crate::spec_source::SpecRow;

pub const PLAN_FILE_NAME: &str = "verification-plan.json";
pub const MIN_MAIN_CHARS: usize = 100;
const MAX_PLAN_KEYWORDS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    Pending,
    Missing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    pub script: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedPage {
    pub storyboard: String,
    pub description: String,
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub status: PlanStatus,
    pub expected_content: String,
    pub expected_actions: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checklist: Vec<ChecklistItem>,
}

impl PlannedPage {
    pub fn is_pending(&self) -> bool {
        self.status == PlanStatus::Pending
    }
}

pub fn build_plan(rows: &[SpecRow], dir: &PageDir) -> Vec<PlannedPage> {
    let mut planned = Vec::new();
    for row in rows {
        let Some(id) = resolve_id(&row.id) else {
            continue;
        };
        let mut page = PlannedPage {
            storyboard: row.id.clone(),
            description: row.description.clone(),
            file_name: None,
            file_path: None,
            file_url: None,
            status: PlanStatus::Missing,
            expected_content: row.expected_content.clone(),
            expected_actions: row.expected_actions.clone(),
            checklist: Vec::new(),
        };
        if let Some(artifact) = dir.locate(&id) {
            page.file_url = match file_url(&artifact.path) {
                Ok(url) => Some(url),
                Err(message) => {
                    log::warn!("{}", message);
                    None
                }
            };
            page.file_path = Some(artifact.path.display().to_string());
            page.file_name = Some(artifact.file_name);
            page.status = PlanStatus::Pending;
            page.checklist = checklist(&row.expected_content);
        }
        planned.push(page);
    }
    planned
}

/// 쉼표로 나눈 항목 중 세 글자 이상인 것, 앞 5개.
pub fn plan_keywords(expected_content: &str) -> Vec<String> {
    expected_content
        .split(',')
        .map(str::trim)
        .filter(|phrase| phrase.chars().count() > 2)
        .take(MAX_PLAN_KEYWORDS)
        .map(str::to_string)
        .collect()
}

pub fn checklist(expected_content: &str) -> Vec<ChecklistItem> {
    let mut items = vec![
        item(
            "placeholder",
            "플레이스홀더 텍스트가 없어야 함",
            r#"() => {
  const text = document.body.innerText;
  const patterns = ['메뉴구조도.csv 스펙에 따라', '페이지 콘텐츠가 여기에 표시됩니다'];
  for (const p of patterns) {
    if (text.includes(p)) return { found: true, pattern: p };
  }
  return { found: false };
}"#
            .to_string(),
        ),
        item(
            "content_length",
            &format!("충분한 콘텐츠가 있어야 함 (최소 {}자)", MIN_MAIN_CHARS),
            format!(
                r#"() => {{
  const mainText = document.querySelector('main')?.innerText || '';
  return {{ length: mainText.length, sufficient: mainText.length >= {} }};
}}"#,
                MIN_MAIN_CHARS
            ),
        ),
        item(
            "structure",
            "기본 구조 (header, main, footer)",
            r#"() => ({
  header: !!document.querySelector('#header-placeholder, header'),
  main: !!document.querySelector('main'),
  footer: !!document.querySelector('#footer-placeholder, footer')
})"#
            .to_string(),
        ),
        item(
            "links",
            "내부 링크가 유효해야 함",
            r#"() => {
  const links = [...document.querySelectorAll('a[href$=".html"]')];
  return {
    count: links.length,
    links: links.map(a => ({ href: a.href, text: a.innerText.slice(0, 30) }))
  };
}"#
            .to_string(),
        ),
    ];

    if !expected_content.trim().is_empty() {
        let keywords = plan_keywords(expected_content);
        let mut keyword_item = item(
            "keywords",
            &format!("필수 키워드 존재: {}", keywords.join(", ")),
            r#"(keywords) => {
  const text = document.body.innerText;
  const found = keywords.filter(k => text.includes(k));
  const missing = keywords.filter(k => !text.includes(k));
  return { found, missing, score: found.length / keywords.length };
}"#
            .to_string(),
        );
        keyword_item.keywords = Some(keywords);
        items.push(keyword_item);
    }
    items
}

fn item(id: &str, description: &str, script: String) -> ChecklistItem {
    ChecklistItem {
        id: id.to_string(),
        description: description.to_string(),
        keywords: None,
        script,
    }
}

/// 검증 가능한(`pending`) 페이지만 파일에 쓴다. 반환값은 파일 내용의 sha256.
pub fn write_plan(pages: &[PlannedPage], out_file: &Path) -> Result<String, VerifyError> {
    if let Some(parent) = out_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| VerifyError::report_write(parent, e))?;
    }
    let pending: Vec<&PlannedPage> = pages.iter().filter(|page| page.is_pending()).collect();
    let text = serde_json::to_string_pretty(&pending)
        .map(|text| text + "\n")
        .map_err(|e| VerifyError::report_write(out_file, e))?;
    fs::write(out_file, &text).map_err(|e| VerifyError::report_write(out_file, e))?;
    Ok(sha256_hex(text.as_bytes()))
}
