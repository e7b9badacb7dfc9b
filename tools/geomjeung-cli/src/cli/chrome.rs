//! headless Chrome 위의 `PageBrowser` 구현.

use std::ffi::OsStr;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use headless_chrome::protocol::cdp::types::Event;
use headless_chrome::protocol::cdp::Page::{CaptureScreenshotFormatOption, Viewport};
use headless_chrome::protocol::cdp::Runtime;
use headless_chrome::{Browser, LaunchOptionsBuilder, Tab};
use serde_json::Value as JsonValue;

use geomjeung_core::{BrowserSession, PageBrowser};

const WINDOW_SIZE: (u32, u32) = (1280, 800);
const IDLE_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Default)]
pub struct ChromeBrowser;

impl PageBrowser for ChromeBrowser {
    fn open(&self) -> Result<Box<dyn BrowserSession>, String> {
        let options = LaunchOptionsBuilder::default()
            .headless(true)
            .window_size(Some(WINDOW_SIZE))
            .idle_browser_timeout(IDLE_TIMEOUT)
            .args(vec![
                OsStr::new("--allow-file-access-from-files"),
                OsStr::new("--disable-gpu"),
                OsStr::new("--disable-dev-shm-usage"),
                OsStr::new("--no-sandbox"),
                OsStr::new("--disable-extensions"),
                OsStr::new("--hide-scrollbars"),
            ])
            .build()
            .map_err(|e| format!("Chrome 실행 옵션 오류: {}", e))?;
        let browser = Browser::new(options).map_err(|e| format!("Chrome 실행 실패: {}", e))?;
        let tab = browser.new_tab().map_err(|e| format!("탭 생성 실패: {}", e))?;
        Ok(Box::new(ChromeSession {
            tab,
            _browser: browser,
        }))
    }
}

/// 탭 하나와 그 탭을 소유한 브라우저 프로세스. drop되면 프로세스가 종료된다.
struct ChromeSession {
    tab: Arc<Tab>,
    _browser: Browser,
}

impl ChromeSession {
    fn evaluate(&self, expression: &str) -> Result<Option<JsonValue>, String> {
        self.tab
            .evaluate(expression, false)
            .map(|object| object.value)
            .map_err(|e| format!("스크립트 실행 실패: {}", e))
    }

    fn document_extent(&self) -> Result<(f64, f64), String> {
        let width = self
            .evaluate("document.documentElement.scrollWidth")?
            .and_then(|v| v.as_f64())
            .unwrap_or(f64::from(WINDOW_SIZE.0));
        let height = self
            .evaluate("document.documentElement.scrollHeight")?
            .and_then(|v| v.as_f64())
            .unwrap_or(f64::from(WINDOW_SIZE.1));
        Ok((width.max(1.0), height.max(1.0)))
    }
}

impl BrowserSession for ChromeSession {
    fn navigate(&mut self, url: &str) -> Result<(), String> {
        self.tab
            .navigate_to(url)
            .map_err(|e| format!("페이지 이동 실패: {}", e))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| format!("페이지 로드 대기 실패: {}", e))?;
        Ok(())
    }

    fn console_errors(&mut self, window: Duration) -> Result<Vec<String>, String> {
        let collected: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&collected);
        let listener = self
            .tab
            .add_event_listener(Arc::new(move |event: &Event| {
                if let Some(message) = console_error_text(event) {
                    if let Ok(mut errors) = sink.lock() {
                        errors.push(message);
                    }
                }
            }))
            .map_err(|e| format!("콘솔 리스너 등록 실패: {}", e))?;
        self.tab
            .call_method(Runtime::Enable(None))
            .map_err(|e| format!("Runtime 활성화 실패: {}", e))?;
        self.tab
            .enable_log()
            .map_err(|e| format!("Log 활성화 실패: {}", e))?;

        thread::sleep(window);

        if let Err(e) = self.tab.remove_event_listener(&listener) {
            log::debug!("console listener removal failed: {}", e);
        }
        let errors = collected
            .lock()
            .map(|errors| errors.clone())
            .map_err(|_| "콘솔 수집 잠금 실패".to_string())?;
        Ok(errors)
    }

    fn rendered_text(&mut self) -> Result<String, String> {
        let value = self.evaluate("document.body ? document.body.innerText : ''")?;
        Ok(value
            .as_ref()
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
            .to_string())
    }

    fn screenshot(&mut self) -> Result<Vec<u8>, String> {
        let (width, height) = self.document_extent()?;
        let clip = Viewport {
            x: 0.0,
            y: 0.0,
            width,
            height,
            scale: 1.0,
        };
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, Some(clip), true)
            .map_err(|e| format!("스크린샷 실패: {}", e))
    }
}

/// `console.error(...)` 호출과 브라우저 로그의 error 항목을 한 줄 메시지로.
fn console_error_text(event: &Event) -> Option<String> {
    match event {
        Event::RuntimeConsoleAPICalled(called) => {
            let params = serde_json::to_value(&called.params).ok()?;
            console_api_error(&params)
        }
        Event::LogEntryAdded(added) => {
            let params = serde_json::to_value(&added.params).ok()?;
            log_entry_error(&params)
        }
        _ => None,
    }
}

fn console_api_error(params: &JsonValue) -> Option<String> {
    if params.get("type").and_then(JsonValue::as_str) != Some("error") {
        return None;
    }
    let parts: Vec<String> = params
        .get("args")
        .and_then(JsonValue::as_array)?
        .iter()
        .filter_map(|arg| {
            arg.get("value")
                .map(|value| match value {
                    JsonValue::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .or_else(|| {
                    arg.get("description")
                        .and_then(JsonValue::as_str)
                        .map(str::to_string)
                })
        })
        .collect();
    Some(parts.join(" "))
}

fn log_entry_error(params: &JsonValue) -> Option<String> {
    let entry = params.get("entry")?;
    if entry.get("level").and_then(JsonValue::as_str) != Some("error") {
        return None;
    }
    entry
        .get("text")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn console_api_errors_join_arguments() {
        let params = json!({
            "type": "error",
            "args": [
                { "type": "string", "value": "로드 실패:" },
                { "type": "number", "value": 404 },
                { "type": "object", "description": "Error: boom" }
            ]
        });
        assert_eq!(
            console_api_error(&params).as_deref(),
            Some("로드 실패: 404 Error: boom")
        );
        assert_eq!(console_api_error(&json!({ "type": "log", "args": [] })), None);
    }

    #[test]
    fn log_entries_keep_only_errors() {
        let error = json!({ "entry": { "level": "error", "text": "Failed to load resource" } });
        let warning = json!({ "entry": { "level": "warning", "text": "deprecated" } });
        assert_eq!(
            log_entry_error(&error).as_deref(),
            Some("Failed to load resource")
        );
        assert_eq!(log_entry_error(&warning), None);
    }
}
