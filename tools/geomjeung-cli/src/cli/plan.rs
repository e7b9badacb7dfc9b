use std::path::Path;

use crossterm::style::Stylize;

use geomjeung_core::{build_plan, spec_source, write_plan, PageDir};

pub fn run(pages_dir: &Path, spec_path: &Path, out: &Path) -> Result<(), String> {
    let coded = |err: geomjeung_core::VerifyError| format!("{} {}", err.code(), err);
    let rows = spec_source::load(spec_path).map_err(coded)?;
    let pages = PageDir::open(pages_dir).map_err(coded)?;
    let plan = build_plan(&rows, &pages);

    println!("총 {}개 페이지 검증 대상", plan.len());
    let missing: Vec<_> = plan.iter().filter(|page| !page.is_pending()).collect();
    if !missing.is_empty() {
        println!("{}", "누락된 파일:".red());
        for page in &missing {
            println!("   - {}", page.storyboard);
        }
    }
    let pending = plan.len() - missing.len();
    println!("{}", format!("검증 가능: {}개", pending).green());

    let hash = write_plan(&plan, out).map_err(coded)?;
    println!("plan_pending={}", pending);
    println!("plan_missing={}", missing.len());
    println!("plan_written: {}", out.display());
    println!("plan_hash=sha256:{}", hash);

    if let Some(first) = plan.iter().find(|page| page.is_pending()) {
        if let Some(url) = &first.file_url {
            log::info!("first pending page: {}", url);
        }
    }
    Ok(())
}
