use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::aggregate::RunSummary;
use crate::error::VerifyError;
use crate::text::escape_html;

pub const REPORT_JSON: &str = "report.json";
pub const REPORT_HTML: &str = "report.html";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WrittenReports {
    pub json_path: PathBuf,
    pub html_path: PathBuf,
    pub json_hash: String,
}

pub fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

pub fn render_json(summary: &RunSummary) -> Result<String, String> {
    serde_json::to_string_pretty(summary)
        .map(|text| text + "\n")
        .map_err(|e| e.to_string())
}

const HTML_STYLE: &str = r#"    * { margin: 0; padding: 0; box-sizing: border-box; }
    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #f5f5f5; padding: 20px; }
    .container { max-width: 1200px; margin: 0 auto; }
    .header { background: linear-gradient(135deg, #6366f1, #ec4899); color: white; padding: 30px; border-radius: 12px; margin-bottom: 20px; }
    .header h1 { font-size: 24px; margin-bottom: 10px; }
    .header .meta { opacity: 0.9; font-size: 14px; }
    .summary { display: grid; grid-template-columns: repeat(4, 1fr); gap: 16px; margin-bottom: 20px; }
    .summary-card { background: white; padding: 20px; border-radius: 12px; text-align: center; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
    .summary-card .value { font-size: 36px; font-weight: bold; margin-bottom: 5px; }
    .summary-card .label { color: #666; font-size: 14px; }
    .summary-card.total .value { color: #6366f1; }
    .summary-card.passed .value { color: #22c55e; }
    .summary-card.warning .value { color: #f59e0b; }
    .summary-card.failed .value { color: #ef4444; }
    .pages { background: white; border-radius: 12px; overflow: hidden; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
    .page-item { padding: 16px 20px; border-bottom: 1px solid #eee; }
    .page-item:last-child { border-bottom: none; }
    .page-item.passed { border-left: 4px solid #22c55e; }
    .page-item.warning { border-left: 4px solid #f59e0b; }
    .page-item.failed { border-left: 4px solid #ef4444; }
    .page-title { font-weight: 600; margin-bottom: 8px; }
    .page-checks { display: flex; flex-wrap: wrap; gap: 8px; }
    .check { font-size: 12px; padding: 4px 8px; border-radius: 4px; background: #f5f5f5; }
    .check.passed { background: #dcfce7; color: #166534; }
    .check.warning { background: #fef3c7; color: #92400e; }
    .check.failed { background: #fee2e2; color: #991b1b; }
"#;

/// 사람이 보는 정적 리포트. 요약 카드와 페이지별 검사 칩.
pub fn render_html(summary: &RunSummary) -> String {
    let counts = &summary.summary;
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"ko\">\n<head>\n");
    out.push_str("  <meta charset=\"UTF-8\">\n");
    out.push_str(
        "  <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    out.push_str("  <title>INABOOTH 페이지 검증 리포트</title>\n  <style>\n");
    out.push_str(HTML_STYLE);
    out.push_str("  </style>\n</head>\n<body>\n  <div class=\"container\">\n");
    out.push_str("    <div class=\"header\">\n      <h1>INABOOTH 페이지 검증 리포트</h1>\n");
    out.push_str(&format!(
        "      <div class=\"meta\">생성: {} | 검증 레벨: {} | 통과율: {:.1}%</div>\n    </div>\n",
        escape_html(&summary.timestamp),
        summary.level.as_u8(),
        counts.pass_rate()
    ));
    out.push_str("    <div class=\"summary\">\n");
    for (class, value, label) in [
        ("total", counts.total, "총 페이지"),
        ("passed", counts.passed, "통과"),
        ("warning", counts.warnings, "경고"),
        ("failed", counts.failed, "실패"),
    ] {
        out.push_str(&format!(
            "      <div class=\"summary-card {}\"><div class=\"value\">{}</div><div class=\"label\">{}</div></div>\n",
            class, value, label
        ));
    }
    out.push_str("    </div>\n    <div class=\"pages\">\n");
    for page in &summary.pages {
        let title = match &page.file_name {
            Some(file_name) => format!("{} ({})", page.storyboard, file_name),
            None => page.storyboard.clone(),
        };
        out.push_str(&format!(
            "      <div class=\"page-item {}\">\n        <div class=\"page-title\">{}</div>\n        <div class=\"page-checks\">\n",
            page.status().name(),
            escape_html(&title)
        ));
        for check in page.checks() {
            out.push_str(&format!(
                "          <span class=\"check {}\" title=\"{}\">{}: {}</span>\n",
                check.status.name(),
                escape_html(&check.message),
                check.kind.name(),
                check.status.name()
            ));
        }
        out.push_str("        </div>\n      </div>\n");
    }
    out.push_str("    </div>\n  </div>\n</body>\n</html>\n");
    out
}

/// `report.json`과 `report.html`을 쓴다. 저장 실패는 실행 실패다.
pub fn write_reports(summary: &RunSummary, out_dir: &Path) -> Result<WrittenReports, VerifyError> {
    fs::create_dir_all(out_dir).map_err(|e| VerifyError::report_write(out_dir, e))?;

    let json_path = out_dir.join(REPORT_JSON);
    let json = render_json(summary).map_err(|e| VerifyError::report_write(&json_path, e))?;
    fs::write(&json_path, &json).map_err(|e| VerifyError::report_write(&json_path, e))?;

    let html_path = out_dir.join(REPORT_HTML);
    fs::write(&html_path, render_html(summary))
        .map_err(|e| VerifyError::report_write(&html_path, e))?;

    Ok(WrittenReports {
        json_hash: sha256_hex(json.as_bytes()),
        json_path,
        html_path,
    })
}
