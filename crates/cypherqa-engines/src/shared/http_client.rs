use std::time::Duration;

use anyhow::{Context, Result};
use cypherqa_core::config::EngineConfig;
use reqwest::Client;
use serde_json::Value;

/// Build the long-lived client for an engine, honouring `timeout_secs`.
pub fn build_client(config: &EngineConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("Failed to build HTTP client")
}

/// Common HTTP utilities
pub struct HttpUtils;

impl HttpUtils {
    /// Extract error message from API response
    pub fn extract_error_message(response: &Value) -> Option<String> {
        if let Some(error) = response.get("error") {
            if let Some(message) = error.get("message") {
                return message.as_str().map(String::from);
            }
            if let Some(error_str) = error.as_str() {
                return Some(error_str.to_string());
            }
        }

        if let Some(message) = response.get("message") {
            return message.as_str().map(String::from);
        }

        if let Some(detail) = response.get("detail") {
            return detail.as_str().map(String::from);
        }

        None
    }

    /// Check if response indicates rate limiting
    pub fn is_rate_limited(response: &Value) -> bool {
        if let Some(error) = response.get("error") {
            if let Some(code_str) = error.get("code").and_then(Value::as_str) {
                return code_str.contains("rate_limit") || code_str.contains("quota");
            }
            if let Some(msg_str) = error.get("message").and_then(Value::as_str) {
                let msg_lower = msg_str.to_lowercase();
                return msg_lower.contains("rate limit")
                    || msg_lower.contains("quota")
                    || msg_lower.contains("too many requests");
            }
        }
        false
    }
}
