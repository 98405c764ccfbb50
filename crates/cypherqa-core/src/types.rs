// crates/cypherqa-core/src/types.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{QaError, QaResult};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Request {
    pub flowname: String,
    pub payload: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Response {
    pub content: String,
    pub usage: Usage,
    pub model: String,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A natural-language question typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question(String);

impl Question {
    pub fn new(text: &str) -> QaResult<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(QaError::InvalidQuestion(
                "question cannot be empty".to_string(),
            ));
        }
        Ok(Question(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Textual summary of the labels, relationship types and properties in the
/// target database, ready to be embedded in a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDescription(String);

impl SchemaDescription {
    pub fn new(text: impl Into<String>) -> Self {
        SchemaDescription(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SchemaDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw completion text returned for a question. Untrusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedQuery {
    raw: String,
}

impl GeneratedQuery {
    pub fn new(raw: impl Into<String>) -> Self {
        GeneratedQuery { raw: raw.into() }
    }

    /// The completion text exactly as the service returned it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The statement to send to the database: the body of a surrounding
    /// Markdown code fence if there is one, otherwise the trimmed raw text.
    pub fn statement(&self) -> String {
        crate::cypher::extract::strip_code_fence(&self.raw)
    }
}

impl std::fmt::Display for GeneratedQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Rows returned by the database for a generated statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub rows: Vec<Value>,
    /// Rows the database returned before the `top_k` cut.
    pub total_rows: usize,
}

impl QueryResult {
    pub fn new(rows: Vec<Value>, top_k: usize) -> Self {
        let total_rows = rows.len();
        let rows = rows.into_iter().take(top_k).collect();
        QueryResult { rows, total_rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Compact JSON rendering used as answer context and as direct output.
    pub fn to_context(&self) -> String {
        serde_json::to_string(&self.rows).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn question_rejects_blank_input() {
        assert!(Question::new("   \n").is_err());
        assert_eq!(Question::new("  Who? ").unwrap().as_str(), "Who?");
    }

    #[test]
    fn query_result_applies_top_k() {
        let rows = (0..15).map(|i| json!({ "i": i })).collect();
        let result = QueryResult::new(rows, 10);
        assert_eq!(result.rows.len(), 10);
        assert_eq!(result.total_rows, 15);
        assert!(result.to_context().starts_with("[{\"i\":0}"));
    }

    #[test]
    fn generated_query_keeps_raw_text() {
        let query = GeneratedQuery::new("```cypher\nMATCH (n) RETURN n\n```");
        assert_eq!(query.raw(), "```cypher\nMATCH (n) RETURN n\n```");
        assert_eq!(query.statement(), "MATCH (n) RETURN n");
    }
}
