use std::io::{self, Write};

use geomjeung_core::report::{now_rfc3339, write_reports, WrittenReports};
use geomjeung_core::{
    spec_source, LanguageModel, PageDir, Pipeline, RunSummary, VerifyConfig, VerifyError,
};

use super::anthropic::AnthropicClient;
use super::chrome::ChromeBrowser;
use super::console::{print_banner, print_failed_pages, print_summary, ConsoleProgress};

pub struct VerifyOptions {
    pub config: VerifyConfig,
    pub model: String,
    pub max_tokens: u32,
}

fn coded(err: VerifyError) -> String {
    format!("{} {}", err.code(), err)
}

/// 검증을 끝까지 돌리고 종료 코드를 돌려준다. 리포트를 못 쓰면 Err.
pub fn run(opts: VerifyOptions) -> Result<i32, String> {
    let config = &opts.config;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_banner(&mut out, config.level).map_err(|e| format!("E_CLI_STDOUT {}", e))?;

    let rows = spec_source::load(&config.spec_path).map_err(coded)?;
    let pages = PageDir::open(&config.pages_dir).map_err(coded)?;
    log::info!(
        "pages_dir={} html_files={}",
        pages.root().display(),
        pages.page_names().len()
    );

    let browser = ChromeBrowser;
    let client = AnthropicClient::from_env(opts.model.clone(), opts.max_tokens);
    let model = client.as_ref().map(|client| client as &dyn LanguageModel);

    let mut progress = ConsoleProgress::new(&mut out);
    let pipeline = Pipeline::new(config, &browser, model);
    let summary = pipeline.run(&rows, &pages, now_rfc3339(), &mut progress);

    print_summary(&mut out, &summary).map_err(|e| format!("E_CLI_STDOUT {}", e))?;
    let written = write_reports(&summary, &config.out_dir).map_err(coded)?;

    print_result_lines(&mut out, &summary, &written)
        .and_then(|_| print_failed_pages(&mut out, &summary))
        .map_err(|e| format!("E_CLI_STDOUT {}", e))?;

    Ok(summary.exit_code())
}

/// 자동화가 읽는 `key=value` 줄.
fn print_result_lines(
    out: &mut impl Write,
    summary: &RunSummary,
    written: &WrittenReports,
) -> io::Result<()> {
    let counts = &summary.summary;
    writeln!(out, "verify_level={}", summary.level.as_u8())?;
    writeln!(out, "verify_total={}", counts.total)?;
    writeln!(out, "verify_passed={}", counts.passed)?;
    writeln!(out, "verify_warnings={}", counts.warnings)?;
    writeln!(out, "verify_failed={}", counts.failed)?;
    writeln!(out, "report_json_written: {}", written.json_path.display())?;
    writeln!(out, "report_html_written: {}", written.html_path.display())?;
    writeln!(out, "report_hash=sha256:{}", written.json_hash)
}
