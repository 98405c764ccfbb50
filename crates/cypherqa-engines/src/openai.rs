use std::future::Future;

use anyhow::{anyhow, Context, Result};
use cypherqa_core::config::EngineConfig;
use cypherqa_core::traits::Engine;
use cypherqa_core::types::{Request, Response};
use log::{debug, warn};
use reqwest::Client;
use serde_json::Value;

use crate::shared::{build_client, HttpUtils, PayloadBuilder, ResponseParser};

/// Engine for any service speaking the OpenAI chat completions protocol,
/// Groq included.
pub struct OpenAICompatibleEngine {
    config: EngineConfig,
    client: Client,
    url: String,
    model: String,
}

impl OpenAICompatibleEngine {
    /// Validate the endpoint and credentials up front so a misconfigured
    /// engine fails at startup rather than on the first question.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let url = config.connection.url()?.to_string();
        if config.bearer_token().is_none() {
            return Err(anyhow!(
                "bearer_token is not set for engine '{}' (set GROQ_API_KEY or -o bearer_token=...)",
                config.name
            ));
        }
        let model = config
            .model_name()
            .ok_or_else(|| anyhow!("Model not specified or not a string"))?
            .to_string();
        let client = build_client(&config)?;

        Ok(Self {
            config,
            client,
            url,
            model,
        })
    }
}

impl Engine for OpenAICompatibleEngine {
    fn execute<'a>(&'a self, request: &'a Request) -> Box<dyn Future<Output = Result<Response>> + Send + 'a> {
        Box::new(async move {
            let payload = PayloadBuilder::build_chat_payload_with_config(request, &self.config)?;
            let auth_token = self
                .config
                .bearer_token()
                .ok_or_else(|| anyhow!("Bearer token not found in configuration"))?;

            debug!("POST {} ({})", self.url, request.flowname);
            let res = self
                .client
                .post(&self.url)
                .bearer_auth(auth_token)
                .json(&payload)
                .send()
                .await
                .with_context(|| format!("Request to {} failed", self.url))?;

            let status = res.status();
            let body = res.text().await.context("Failed to read response body")?;
            let response_body: Value = serde_json::from_str(&body).map_err(|e| {
                anyhow!("Completion service returned {} with a non-JSON body: {}", status, e)
            })?;

            if !status.is_success() || response_body.get("error").is_some() {
                if HttpUtils::is_rate_limited(&response_body) {
                    warn!("Completion service is rate limiting requests");
                }
                let message = HttpUtils::extract_error_message(&response_body)
                    .unwrap_or_else(|| format!("HTTP {}", status));
                return Err(anyhow!("Completion API error: {}", message));
            }

            let response = ResponseParser::parse_openai_chat_response(&response_body, &self.model)?;
            debug!(
                "Completion used {} tokens (finish reason {:?})",
                response.usage.total_tokens, response.finish_reason
            );
            Ok(response)
        })
    }

    fn model(&self) -> &str {
        &self.model
    }
}
