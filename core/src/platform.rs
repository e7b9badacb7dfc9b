use std::time::Duration;

// ---------- 외부 협력자 경계 ----------
//
// 파이프라인은 실제 브라우저/언어모델을 직접 알지 못한다.
// CLI가 headless Chrome과 Anthropic 클라이언트를 넣고, 테스트는 가짜 구현을 넣는다.

/// 페이지마다 새 세션을 여는 브라우저. 세션이 drop되면 브라우저도 닫힌다.
pub trait PageBrowser {
    fn open(&self) -> Result<Box<dyn BrowserSession>, String>;
}

pub trait BrowserSession {
    /// 이동 후 로드가 끝날 때까지 기다린다.
    fn navigate(&mut self, url: &str) -> Result<(), String>;
    /// `window` 동안 쌓인 console error 메시지.
    fn console_errors(&mut self, window: Duration) -> Result<Vec<String>, String>;
    /// 스크립트 실행 뒤의 `document.body.innerText`.
    fn rendered_text(&mut self) -> Result<String, String>;
    /// 전체 페이지 PNG.
    fn screenshot(&mut self) -> Result<Vec<u8>, String>;
}

pub trait LanguageModel {
    fn complete(&self, prompt: &str) -> Result<String, String>;
}
