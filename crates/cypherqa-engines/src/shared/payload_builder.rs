use anyhow::{anyhow, Result};
use cypherqa_core::config::EngineConfig;
use cypherqa_core::types::Request;
use log::debug;
use serde_json::{json, Value};

/// Builds chat completion payloads from engine parameters.
pub struct PayloadBuilder;

impl PayloadBuilder {
    /// A single user message carrying the request payload.
    pub fn build_chat_payload(request: &Request, model: &str) -> Value {
        json!({
            "model": model,
            "messages": [
                {
                    "role": "user",
                    "content": request.payload
                }
            ]
        })
    }

    pub fn build_chat_payload_with_config(request: &Request, config: &EngineConfig) -> Result<Value> {
        let model = config
            .model_name()
            .ok_or_else(|| anyhow!("Model not specified or not a string"))?;
        let mut payload = Self::build_chat_payload(request, model);

        if let Some(temperature) = config.parameters.get("temperature").and_then(Value::as_f64) {
            payload["temperature"] = json!(temperature);
        }

        // max_tokens may arrive as a string from `-o max_tokens=...`
        if let Some(max_tokens) = config.parameters.get("max_tokens") {
            if let Some(n) = max_tokens.as_u64() {
                payload["max_tokens"] = json!(n);
            } else if let Some(n) = max_tokens.as_str().and_then(|s| s.parse::<u64>().ok()) {
                payload["max_tokens"] = json!(n);
            }
        }

        for &param in &["frequency_penalty", "presence_penalty", "top_p", "seed", "stop", "response_format"] {
            if let Some(value) = config.parameters.get(param) {
                payload[param] = value.clone();
            }
        }

        debug!("Chat payload for {} ({} chars of prompt)", model, request.payload.len());
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request {
            flowname: "cypher_generation".to_string(),
            payload: "The question is:\nWho directed Casino?".to_string(),
        }
    }

    #[test]
    fn default_config_uses_mixtral_at_zero_temperature() {
        let payload = PayloadBuilder::build_chat_payload_with_config(&request(), &EngineConfig::default()).unwrap();
        assert_eq!(payload["model"], "mixtral-8x7b-32768");
        assert_eq!(payload["temperature"], 0.0);
        assert_eq!(payload["messages"][0]["role"], "user");
        assert_eq!(payload["messages"][0]["content"], "The question is:\nWho directed Casino?");
        assert!(payload.get("max_tokens").is_none());
    }

    #[test]
    fn string_max_tokens_is_parsed() {
        let mut config = EngineConfig::default();
        config.parameters.insert("max_tokens".to_string(), json!("256"));
        config.parameters.insert("stop".to_string(), json!(["\n\n"]));
        let payload = PayloadBuilder::build_chat_payload_with_config(&request(), &config).unwrap();
        assert_eq!(payload["max_tokens"], 256);
        assert_eq!(payload["stop"], json!(["\n\n"]));
    }

    #[test]
    fn missing_model_is_an_error() {
        let mut config = EngineConfig::default();
        config.parameters.remove("modelName");
        assert!(PayloadBuilder::build_chat_payload_with_config(&request(), &config).is_err());
    }
}
