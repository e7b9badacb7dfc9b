use std::path::Path;

use crate::error::VerifyError;
use crate::text::read_lossy;

pub const COLUMN_ID: &str = "스토리보드 번호";
pub const COLUMN_DESCRIPTION: &str = "설명";
pub const COLUMN_CONTENT: &str = "콘텐츠/데이터";
pub const COLUMN_ACTIONS: &str = "링크/버튼/액션";

/// 메뉴구조도 한 행. 섹션 헤더 행은 `id`에 식별자가 없다.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecRow {
    pub id: String,
    pub description: String,
    pub expected_content: String,
    pub expected_actions: String,
}

pub fn load(path: &Path) -> Result<Vec<SpecRow>, VerifyError> {
    let unreadable = |message: String| VerifyError::SpecUnreadable {
        path: path.display().to_string(),
        message,
    };
    let text = read_lossy(path).map_err(|e| unreadable(e.to_string()))?;
    let rows = parse(&text).map_err(unreadable)?;
    log::debug!("spec rows loaded: {} from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn parse(text: &str) -> Result<Vec<SpecRow>, String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| format!("헤더 행 파싱 실패: {}", e))?
        .clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err("헤더 행이 없습니다.".to_string());
    }
    let position = |name: &str| headers.iter().position(|h| h.trim() == name);
    let id_col = position(COLUMN_ID);
    let description_col = position(COLUMN_DESCRIPTION);
    let content_col = position(COLUMN_CONTENT);
    let actions_col = position(COLUMN_ACTIONS);

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| format!("{}번째 행 파싱 실패: {}", idx + 1, e))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let field = |col: Option<usize>| {
            col.and_then(|c| record.get(c))
                .unwrap_or("")
                .to_string()
        };
        rows.push(SpecRow {
            id: field(id_col),
            description: field(description_col),
            expected_content: field(content_col),
            expected_actions: field(actions_col),
        });
    }
    Ok(rows)
}
