use std::io::Write;

use crossterm::style::Stylize;

use geomjeung_core::{Level, ProgressEvent, ProgressSink, RunSummary, Status};

const RULE: &str = "═══════════════════════════════════════════════════════════";

/// 진행 상황을 터미널에 색으로 찍는다.
pub struct ConsoleProgress<W: Write> {
    out: W,
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ProgressSink for ConsoleProgress<W> {
    fn on_event(&mut self, event: ProgressEvent) {
        if let Err(e) = write_event(&mut self.out, event) {
            log::debug!("progress write failed: {}", e);
        }
    }
}

fn write_event(out: &mut impl Write, event: ProgressEvent) -> std::io::Result<()> {
    match event {
        ProgressEvent::SpecLoaded { rows } => {
            writeln!(out, "{}", "메뉴구조도 파싱 중...".cyan())?;
            writeln!(out, "   총 {}개 행 발견\n", rows)
        }
        ProgressEvent::TierStarted { level, pages } => match level {
            Level::Static => writeln!(out, "{}", "Level 1: 정적 분석 시작\n".cyan()),
            Level::Render => writeln!(out, "{}", "\nLevel 2: 브라우저 검증 시작\n".cyan()),
            Level::Semantic => {
                writeln!(out, "{}", "\nLevel 3: AI 시맨틱 검증 시작\n".cyan())?;
                writeln!(out, "   {}개 페이지 AI 검증 예정\n", pages)
            }
        },
        ProgressEvent::PageChecked {
            level: Level::Static,
            storyboard,
            status,
            failures,
            ..
        } => {
            let line = match status {
                Status::Warning => format!("  ⚠ {}", storyboard).yellow(),
                Status::Failed => format!("  ✗ {}", storyboard).red(),
                Status::Passed | Status::Skipped => format!("  ✓ {}", storyboard).green(),
            };
            writeln!(out, "{}", line)?;
            for message in failures {
                writeln!(out, "{}", format!("      → {}", message).dim())?;
            }
            Ok(())
        }
        ProgressEvent::PageChecked {
            level: Level::Render,
            file_name,
            status,
            ..
        } => {
            let mark = if status == Status::Failed {
                " ✗".red()
            } else {
                " ✓".green()
            };
            writeln!(out, "  검증 중: {}...{}", file_name.unwrap_or_default(), mark)
        }
        // AI 단계 결과는 SemanticScored로 찍는다.
        ProgressEvent::PageChecked { .. } => Ok(()),
        ProgressEvent::SemanticScored { file_name, score } => match score {
            Some(score) => writeln!(out, "  AI 검증: {}... {}점", file_name, score),
            None => writeln!(out, "  AI 검증: {}... skipped", file_name),
        },
    }
}

pub fn print_banner(out: &mut impl Write, level: Level) -> std::io::Result<()> {
    writeln!(out, "{}", format!("\n{}", RULE).bold())?;
    writeln!(out, "{}", "  INABOOTH 페이지 검증 시스템".bold())?;
    writeln!(
        out,
        "{}",
        format!("  검증 레벨: {} ({})", level.as_u8(), level.label()).bold()
    )?;
    writeln!(out, "{}", format!("{}\n", RULE).bold())
}

pub fn print_summary(out: &mut impl Write, summary: &RunSummary) -> std::io::Result<()> {
    let counts = &summary.summary;
    writeln!(out, "{}", format!("\n{}", RULE).bold())?;
    writeln!(out, "{}", "  검증 결과 요약".bold())?;
    writeln!(out, "{}", format!("{}\n", RULE).bold())?;
    writeln!(out, "  총 검증: {}개 페이지", counts.total)?;
    writeln!(out, "{}", format!("  ✓ 통과: {}개", counts.passed).green())?;
    writeln!(out, "{}", format!("  ⚠ 경고: {}개", counts.warnings).yellow())?;
    writeln!(out, "{}", format!("  ✗ 실패: {}개", counts.failed).red())?;
    writeln!(out, "\n  통과율: {:.1}%\n", counts.pass_rate())
}

pub fn print_failed_pages(out: &mut impl Write, summary: &RunSummary) -> std::io::Result<()> {
    if summary.summary.failed == 0 {
        return Ok(());
    }
    writeln!(out, "{}", "\n══ 실패한 페이지 상세 ══\n".bold())?;
    for page in summary.failed_pages() {
        writeln!(out, "{}", format!("  {}", page.storyboard).red())?;
        for check in page.checks_with(Status::Failed) {
            writeln!(out, "{}", format!("    → {}", check.message).dim())?;
        }
    }
    Ok(())
}
