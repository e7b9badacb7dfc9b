pub mod error;
pub mod text;
pub mod model;
pub mod config;
pub mod spec_source;
pub mod locator;
pub mod platform;
pub mod progress;
pub mod static_check;
pub mod render_check;
pub mod semantic;
pub mod aggregate;
pub mod pipeline;
pub mod report;
pub mod plan;

pub use error::VerifyError;
pub use model::{Check, CheckKind, PageResult, Status};
pub use config::{Level, VerifyConfig};
pub use spec_source::SpecRow;
pub use locator::{resolve_id, PageArtifact, PageDir};
pub use platform::{BrowserSession, LanguageModel, PageBrowser};
pub use progress::{ProgressEvent, ProgressSink, VecProgressSink};
pub use semantic::SemanticVerdict;
pub use aggregate::{fold_status, RunSummary, SummaryCounts};
pub use pipeline::Pipeline;
pub use report::{write_reports, WrittenReports};
pub use plan::{build_plan, write_plan, PlanStatus, PlannedPage};

#[cfg(test)]
mod tests;
