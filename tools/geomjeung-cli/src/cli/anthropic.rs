use std::env;
use std::time::Duration;

use serde_json::{json, Value as JsonValue};

use geomjeung_core::semantic::CREDENTIAL_ENV;
use geomjeung_core::LanguageModel;

pub const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
pub const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Messages API 한 번 호출로 프롬프트 하나에 답한다.
pub struct AnthropicClient {
    agent: ureq::Agent,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    /// 자격 증명이 없으면 None. 이때 AI 단계는 `skipped`로 기록된다.
    pub fn from_env(model: String, max_tokens: u32) -> Option<Self> {
        let api_key = env::var(CREDENTIAL_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())?;
        Some(Self {
            agent: ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build(),
            api_key,
            model,
            max_tokens,
        })
    }
}

impl LanguageModel for AnthropicClient {
    fn complete(&self, prompt: &str) -> Result<String, String> {
        let body = request_body(&self.model, self.max_tokens, prompt);
        let response = self
            .agent
            .post(MESSAGES_URL)
            .set("x-api-key", &self.api_key)
            .set("anthropic-version", API_VERSION)
            .set("content-type", "application/json")
            .send_string(&body);
        let text = match response {
            Ok(response) => response.into_string().map_err(|e| e.to_string())?,
            Err(ureq::Error::Status(code, response)) => {
                let detail = response.into_string().unwrap_or_default();
                return Err(format!("HTTP {} {}", code, detail));
            }
            Err(err) => return Err(err.to_string()),
        };
        reply_text(&text)
    }
}

pub fn request_body(model: &str, max_tokens: u32, prompt: &str) -> String {
    json!({
        "model": model,
        "max_tokens": max_tokens,
        "messages": [{ "role": "user", "content": prompt }],
    })
    .to_string()
}

/// 응답 본문의 첫 텍스트 블록.
pub fn reply_text(body: &str) -> Result<String, String> {
    let value: JsonValue =
        serde_json::from_str(body).map_err(|e| format!("응답 JSON 파싱 실패: {}", e))?;
    value
        .get("content")
        .and_then(JsonValue::as_array)
        .and_then(|blocks| {
            blocks
                .iter()
                .find(|block| block.get("type").and_then(JsonValue::as_str) == Some("text"))
        })
        .and_then(|block| block.get("text"))
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| "응답에 텍스트 블록이 없습니다".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_carries_model_and_prompt() {
        let body: JsonValue =
            serde_json::from_str(&request_body(DEFAULT_MODEL, 500, "검증해줘")).expect("json");
        assert_eq!(body["model"], "claude-sonnet-4-20250514");
        assert_eq!(body["max_tokens"], 500);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "검증해줘");
    }

    #[test]
    fn reply_text_reads_first_text_block() {
        let body = r#"{"id":"msg_1","type":"message","role":"assistant",
            "content":[{"type":"text","text":"{\"score\": 90}"}],
            "stop_reason":"end_turn"}"#;
        assert_eq!(reply_text(body).as_deref(), Ok("{\"score\": 90}"));
    }

    #[test]
    fn reply_without_text_is_an_error() {
        assert!(reply_text(r#"{"content":[]}"#).is_err());
        assert!(reply_text(r#"{"type":"error","error":{"message":"overloaded"}}"#).is_err());
        assert!(reply_text("not json").is_err());
    }
}
