use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::cypher::examples::FewShotSet;
use crate::cypher::extract::is_valid_cypher;
use crate::cypher::prompt::PromptTemplate;
use crate::error::{QaError, QaResult};
use crate::traits::Engine;
use crate::types::{GeneratedQuery, Question, Request, SchemaDescription};

/// Render a generation prompt without sending it anywhere.
pub fn render_prompt(
    template: &PromptTemplate,
    examples: &FewShotSet,
    schema: &SchemaDescription,
    question: &Question,
) -> QaResult<String> {
    let examples = examples.render();
    template.format(&HashMap::from([
        ("schema", schema.as_str()),
        ("examples", examples.as_str()),
        ("question", question.as_str()),
    ]))
}

/// Turns a question into Cypher text through the completion service.
pub struct QuerySynthesizer {
    engine: Arc<dyn Engine>,
    template: PromptTemplate,
    examples: FewShotSet,
}

impl QuerySynthesizer {
    pub fn new(engine: Arc<dyn Engine>, template: PromptTemplate, examples: FewShotSet) -> Self {
        Self {
            engine,
            template,
            examples,
        }
    }

    /// The exact prompt sent for a (schema, question) pair.
    pub fn build_prompt(&self, schema: &SchemaDescription, question: &Question) -> QaResult<String> {
        render_prompt(&self.template, &self.examples, schema, question)
    }

    /// Send the prompt and return the completion text unmodified. Fails
    /// with `Translation` when the service errors or the text is not a
    /// Cypher statement.
    pub async fn synthesize(&self, schema: &SchemaDescription, question: &Question) -> QaResult<GeneratedQuery> {
        let query = self.complete(schema, question).await?;
        Self::validate(&query)?;
        Ok(query)
    }

    /// Ask the completion service for a statement without judging the reply.
    pub async fn complete(&self, schema: &SchemaDescription, question: &Question) -> QaResult<GeneratedQuery> {
        let prompt = self.build_prompt(schema, question)?;
        debug!(
            "Cypher generation prompt ({} chars, examples {})",
            prompt.len(),
            self.examples.version
        );

        let request = Request {
            flowname: "cypher_generation".to_string(),
            payload: prompt,
        };
        let response = Pin::from(self.engine.execute(&request))
            .await
            .map_err(|e| QaError::Translation(format!("completion service failed: {}", e)))?;

        if response.content.trim().is_empty() {
            return Err(QaError::Translation(
                "completion service returned an empty query".to_string(),
            ));
        }

        info!("Generated Cypher ({}):\n{}", response.model, response.content);
        Ok(GeneratedQuery::new(response.content))
    }

    /// Refusals and prose are translation failures, never sent to the
    /// database.
    pub fn validate(query: &GeneratedQuery) -> QaResult<()> {
        if is_valid_cypher(&query.statement()) {
            return Ok(());
        }
        warn!("Completion is not a Cypher statement: {}", query.raw());
        Err(QaError::Translation(
            "completion service did not return a Cypher statement".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_statement_passes_validation() {
        let query = GeneratedQuery::new("```cypher\nMATCH (m:Movie) RETURN m.title\n```");
        QuerySynthesizer::validate(&query).unwrap();
    }

    #[test]
    fn refusal_fails_validation_as_translation_error() {
        let query = GeneratedQuery::new("I'm sorry, I cannot answer that question.");
        let err = QuerySynthesizer::validate(&query).unwrap_err();
        assert!(matches!(err, QaError::Translation(_)));
    }
}
