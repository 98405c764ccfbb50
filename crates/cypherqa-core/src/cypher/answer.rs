use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use log::debug;

use crate::cypher::prompt::PromptTemplate;
use crate::error::{QaError, QaResult};
use crate::traits::Engine;
use crate::types::{QueryResult, Question, Request};

/// Phrases query rows as a human-readable answer.
pub struct AnswerGenerator {
    engine: Arc<dyn Engine>,
    template: PromptTemplate,
}

impl AnswerGenerator {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self {
            engine,
            template: PromptTemplate::cypher_qa(),
        }
    }

    pub async fn answer(&self, question: &Question, result: &QueryResult) -> QaResult<String> {
        let context = result.to_context();
        let prompt = self.template.format(&HashMap::from([
            ("context", context.as_str()),
            ("question", question.as_str()),
        ]))?;
        debug!("Answer prompt context: {}", context);

        let request = Request {
            flowname: "cypher_qa".to_string(),
            payload: prompt,
        };
        let response = Pin::from(self.engine.execute(&request))
            .await
            .map_err(|e| QaError::Translation(format!("answer generation failed: {}", e)))?;

        let answer = response.content.trim();
        if answer.is_empty() {
            return Err(QaError::Translation(
                "completion service returned an empty answer".to_string(),
            ));
        }
        Ok(answer.to_string())
    }
}
