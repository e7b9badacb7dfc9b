use crate::config::Level;
use crate::model::Status;

/// 파이프라인이 단계마다 내보내는 진행 알림.
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    SpecLoaded {
        rows: usize,
    },
    TierStarted {
        level: Level,
        pages: usize,
    },
    PageChecked {
        level: Level,
        storyboard: String,
        file_name: Option<String>,
        status: Status,
        failures: Vec<String>,
    },
    SemanticScored {
        file_name: String,
        score: Option<f64>,
    },
}

pub trait ProgressSink {
    fn on_event(&mut self, event: ProgressEvent);
}

#[derive(Default)]
pub struct VecProgressSink {
    pub events: Vec<ProgressEvent>,
}

impl ProgressSink for VecProgressSink {
    fn on_event(&mut self, event: ProgressEvent) {
        self.events.push(event);
    }
}
