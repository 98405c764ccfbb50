use anyhow::{anyhow, Result};
use cypherqa_core::types::{Response, Usage};
use serde_json::Value;

/// Shared response parsing utilities for engines
pub struct ResponseParser;

impl ResponseParser {
    /// Parse an OpenAI-style chat completion response. `model` is used when
    /// the body does not name the model that answered.
    pub fn parse_openai_chat_response(response: &Value, model: &str) -> Result<Response> {
        let content = response["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow!("Failed to extract content from response"))?
            .to_string();

        let usage = Usage {
            prompt_tokens: response["usage"]["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            completion_tokens: response["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
            total_tokens: response["usage"]["total_tokens"].as_u64().unwrap_or(0) as u32,
        };

        let finish_reason = response["choices"][0]["finish_reason"]
            .as_str()
            .map(String::from);

        Ok(Response {
            content,
            usage,
            model: response["model"].as_str().unwrap_or(model).to_string(),
            finish_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_groq_completion() {
        let body = json!({
            "id": "chatcmpl-1",
            "model": "mixtral-8x7b-32768",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "MATCH (m:Movie) RETURN count(m)"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 412, "completion_tokens": 12, "total_tokens": 424}
        });
        let response = ResponseParser::parse_openai_chat_response(&body, "fallback").unwrap();
        assert_eq!(response.content, "MATCH (m:Movie) RETURN count(m)");
        assert_eq!(response.model, "mixtral-8x7b-32768");
        assert_eq!(response.usage.total_tokens, 424);
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn missing_content_is_an_error() {
        let body = json!({"choices": []});
        assert!(ResponseParser::parse_openai_chat_response(&body, "m").is_err());
    }
}
