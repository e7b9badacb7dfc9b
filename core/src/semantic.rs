//! Level 3: 언어모델로 페이지 본문이 요구 콘텐츠를 담고 있는지 판정한다.
//!
//! 서비스 문제(자격 증명 없음, 전송 실패, 응답 형식 오류)는 실패로 올리지 않는다.
//! 점수가 낮을 때만 `failed`가 된다.

use kuchiki::traits::TendrilSink;
use kuchiki::NodeRef;
use serde::{Deserialize, Serialize};

use crate::locator::PageArtifact;
use crate::model::{Check, CheckKind, PageResult};
use crate::platform::LanguageModel;
use crate::spec_source::SpecRow;
use crate::text::{read_lossy, truncate_chars};

pub const HTML_CHAR_BUDGET: usize = 8000;
pub const PASS_SCORE: f64 = 80.0;
pub const WARN_SCORE: f64 = 50.0;
pub const CREDENTIAL_ENV: &str = "ANTHROPIC_API_KEY";
const SERVICE_ERROR_CHARS: usize = 50;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticVerdict {
    pub score: f64,
    #[serde(default)]
    pub missing: Vec<String>,
    #[serde(default)]
    pub present: Vec<String>,
    #[serde(default)]
    pub issues: Vec<String>,
}

pub fn run(
    page: &mut PageResult,
    row: &SpecRow,
    artifact: &PageArtifact,
    model: Option<&dyn LanguageModel>,
) {
    let Some(model) = model else {
        page.push(Check::skipped(
            CheckKind::AiVerification,
            format!("{} 환경변수 필요", CREDENTIAL_ENV),
        ));
        return;
    };
    let markup = match read_lossy(&artifact.path) {
        Ok(markup) => markup,
        Err(e) => {
            page.push(service_error(&e.to_string()));
            return;
        }
    };
    let prompt = build_prompt(&row.expected_content, &content_excerpt(&markup));
    match model.complete(&prompt) {
        Ok(reply) => match parse_verdict(&reply) {
            Some(verdict) => {
                page.push(classify(&verdict));
                page.semantic_score = Some(verdict.score);
                page.semantic_details = Some(verdict);
            }
            None => {
                log::debug!("unparseable verdict for {}: {}", artifact.file_name, reply);
                page.push(Check::warning(CheckKind::AiSemantic, "AI 응답 파싱 실패"));
            }
        },
        Err(message) => {
            log::warn!("language model error for {}: {}", artifact.file_name, message);
            page.push(service_error(&message));
        }
    }
}

fn service_error(message: &str) -> Check {
    Check::warning(
        CheckKind::AiVerification,
        format!("AI 검증 에러: {}", truncate_chars(message, SERVICE_ERROR_CHARS)),
    )
}

pub fn classify(verdict: &SemanticVerdict) -> Check {
    let score = verdict.score;
    if score >= PASS_SCORE {
        return Check::passed(CheckKind::AiSemantic, format!("AI 검증 점수: {}/100", score));
    }
    let missing = if verdict.missing.is_empty() {
        "N/A".to_string()
    } else {
        verdict.missing.join(", ")
    };
    let message = format!("AI 검증 점수: {}/100, 누락: {}", score, missing);
    if score >= WARN_SCORE {
        Check::warning(CheckKind::AiSemantic, message)
    } else {
        Check::failed(CheckKind::AiSemantic, message)
    }
}

/// `<main>` 안쪽 HTML(없거나 비면 `<body>`), 앞 8000자.
pub fn content_excerpt(markup: &str) -> String {
    let document = kuchiki::parse_html().one(markup);
    let main = document
        .select_first("main")
        .map(|main| inner_html(main.as_node()))
        .unwrap_or_default();
    let html = if main.trim().is_empty() {
        document
            .select_first("body")
            .map(|body| inner_html(body.as_node()))
            .unwrap_or_default()
    } else {
        main
    };
    truncate_chars(&html, HTML_CHAR_BUDGET)
}

fn inner_html(node: &NodeRef) -> String {
    node.children().map(|child| child.to_string()).collect()
}

pub fn build_prompt(expected_content: &str, html: &str) -> String {
    format!(
        r#"
당신은 웹 페이지 QA 전문가입니다. 아래 HTML이 요구사항을 충족하는지 검증해주세요.

## 요구사항 (콘텐츠/데이터)
{expected_content}

## 실제 HTML
```html
{html}
```

## 검증 결과를 다음 JSON 형식으로만 응답하세요:
{{
  "score": 0-100,
  "missing": ["누락된 항목들"],
  "present": ["존재하는 항목들"],
  "issues": ["문제점들"]
}}
"#
    )
}

/// 응답 안의 첫 번째 JSON 객체. 앞뒤의 대화체 문장은 무시한다.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let mut from = 0;
    while let Some(offset) = text[from..].find('{') {
        let start = from + offset;
        if let Some(len) = balanced_len(&text[start..]) {
            let candidate = &text[start..start + len];
            let is_object = serde_json::from_str::<serde_json::Value>(candidate)
                .map(|value| value.is_object())
                .unwrap_or(false);
            if is_object {
                return Some(candidate);
            }
        }
        from = start + 1;
    }
    None
}

/// `{`로 시작하는 텍스트에서 짝이 맞는 `}`까지의 바이트 길이. 문자열 안의 괄호는 세지 않는다.
fn balanced_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
    }
    None
}

pub fn parse_verdict(reply: &str) -> Option<SemanticVerdict> {
    let object = extract_json_object(reply)?;
    serde_json::from_str::<SemanticVerdict>(object).ok()
}
