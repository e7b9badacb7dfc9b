//! 단계별 순차 실행기.
//!
//! 모든 페이지가 Level 1을 마친 뒤 Level 2가, Level 2를 마친 뒤 Level 3이 시작된다.
//! 한 번에 한 페이지만 검사하며, 결과는 `RunSummary` 값으로만 밖에 나간다.

use crate::aggregate::RunSummary;
use crate::config::{Level, VerifyConfig};
use crate::locator::{resolve_id, PageArtifact, PageDir};
use crate::model::{PageResult, Status};
use crate::platform::{LanguageModel, PageBrowser};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::render_check::{self, RenderOptions};
use crate::semantic;
use crate::spec_source::SpecRow;
use crate::static_check;

pub struct Pipeline<'a> {
    config: &'a VerifyConfig,
    browser: &'a dyn PageBrowser,
    model: Option<&'a dyn LanguageModel>,
}

struct Entry<'r> {
    row: &'r SpecRow,
    artifact: Option<PageArtifact>,
    page: PageResult,
}

impl Entry<'_> {
    /// 파일을 찾았고 읽을 수 있었던 페이지만 다음 단계로 간다.
    fn located(&self) -> Option<&PageArtifact> {
        self.page.file_name.as_ref()?;
        self.artifact.as_ref()
    }
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a VerifyConfig,
        browser: &'a dyn PageBrowser,
        model: Option<&'a dyn LanguageModel>,
    ) -> Self {
        Self {
            config,
            browser,
            model,
        }
    }

    pub fn run(
        &self,
        rows: &[SpecRow],
        pages: &PageDir,
        timestamp: String,
        progress: &mut dyn ProgressSink,
    ) -> RunSummary {
        progress.on_event(ProgressEvent::SpecLoaded { rows: rows.len() });

        let mut entries = self.run_static(rows, pages, progress);
        if self.config.level >= Level::Render {
            self.run_render(&mut entries, progress);
        }
        if self.config.level >= Level::Semantic {
            self.run_semantic(&mut entries, progress);
        }

        let pages = entries.into_iter().map(|entry| entry.page).collect();
        RunSummary::from_pages(timestamp, self.config.level, pages)
    }

    fn run_static<'r>(
        &self,
        rows: &'r [SpecRow],
        pages: &PageDir,
        progress: &mut dyn ProgressSink,
    ) -> Vec<Entry<'r>> {
        let mut entries = Vec::new();
        let identified = rows
            .iter()
            .filter(|row| resolve_id(&row.id).is_some())
            .count();
        progress.on_event(ProgressEvent::TierStarted {
            level: Level::Static,
            pages: identified,
        });
        for row in rows {
            let Some(id) = resolve_id(&row.id) else {
                log::debug!("section row skipped: {:?}", row.id);
                continue;
            };
            let artifact = pages.locate(&id);
            let mut page = PageResult::new(id, row);
            static_check::run(&mut page, row, artifact.as_ref(), pages);
            emit_page(progress, Level::Static, &page);
            entries.push(Entry {
                row,
                artifact,
                page,
            });
        }
        entries
    }

    fn run_render(&self, entries: &mut [Entry<'_>], progress: &mut dyn ProgressSink) {
        let options = RenderOptions {
            screenshot_dir: self.config.screenshot_dir.clone(),
            observe_window: self.config.observe_window,
        };
        let eligible = entries.iter().filter(|entry| entry.located().is_some()).count();
        progress.on_event(ProgressEvent::TierStarted {
            level: Level::Render,
            pages: eligible,
        });
        for entry in entries.iter_mut() {
            let Some(artifact) = entry.located().cloned() else {
                continue;
            };
            render_check::run(&mut entry.page, &artifact, self.browser, &options);
            emit_page(progress, Level::Render, &entry.page);
        }
    }

    /// 비용 때문에 스펙 순서상 앞쪽 N개 페이지만 AI 검증한다.
    fn run_semantic(&self, entries: &mut [Entry<'_>], progress: &mut dyn ProgressSink) {
        let limit = self.config.ai_page_limit;
        let eligible = entries
            .iter()
            .filter(|entry| entry.located().is_some())
            .take(limit)
            .count();
        progress.on_event(ProgressEvent::TierStarted {
            level: Level::Semantic,
            pages: eligible,
        });
        let selected = entries
            .iter_mut()
            .filter(|entry| entry.located().is_some())
            .take(limit);
        for entry in selected {
            let Some(artifact) = entry.located().cloned() else {
                continue;
            };
            semantic::run(&mut entry.page, entry.row, &artifact, self.model);
            progress.on_event(ProgressEvent::SemanticScored {
                file_name: artifact.file_name.clone(),
                score: entry.page.semantic_score,
            });
            emit_page(progress, Level::Semantic, &entry.page);
        }
    }
}

fn emit_page(progress: &mut dyn ProgressSink, level: Level, page: &PageResult) {
    let failures = page
        .checks_with(Status::Failed)
        .map(|check| check.message.clone())
        .collect();
    progress.on_event(ProgressEvent::PageChecked {
        level,
        storyboard: page.storyboard.clone(),
        file_name: page.file_name.clone(),
        status: page.status(),
        failures,
    });
}
