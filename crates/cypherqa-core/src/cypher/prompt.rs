use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::{QaError, QaResult};

static RE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));

pub const CYPHER_GENERATION_TEMPLATE: &str = "Task: Generate a Cypher statement to query a graph database.
Instructions:
Use only the provided relationship types and properties in the schema.
Do not use any other relationship types or properties that are not provided.
Schema:
{schema}
Note: Do not include any explanations or apologies in your responses.
Do not respond to any questions that might ask anything else than for you to construct a Cypher statement.
Do not include any text except the generated Cypher statement.
Examples: Here are a few examples of generated Cypher statements for particular questions:

{examples}

The question is:
{question}";

pub const CYPHER_QA_TEMPLATE: &str = "You are an assistant that helps to form nice and human understandable answers.
The information part contains the provided information that you must use to construct an answer.
The provided information is authoritative, you must never doubt it or try to use your internal knowledge to correct it.
Make the answer sound as a response to the question. Do not mention that you based the result on the given information.
If the provided information is empty, say that you don't know the answer.
Information:
{context}

Question: {question}
Helpful Answer:";

/// Text with `{name}` placeholders for a fixed set of variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    /// Every declared variable must occur in the text.
    pub fn new(template: impl Into<String>, input_variables: &[&str]) -> QaResult<Self> {
        let template = template.into();
        for var in input_variables {
            if !template.contains(&format!("{{{}}}", var)) {
                return Err(QaError::Config(format!(
                    "prompt template is missing the {{{}}} placeholder",
                    var
                )));
            }
        }
        Ok(PromptTemplate {
            template,
            input_variables: input_variables.iter().map(|v| v.to_string()).collect(),
        })
    }

    pub fn cypher_generation() -> Self {
        PromptTemplate {
            template: CYPHER_GENERATION_TEMPLATE.to_string(),
            input_variables: vec!["schema".into(), "examples".into(), "question".into()],
        }
    }

    pub fn cypher_qa() -> Self {
        PromptTemplate {
            template: CYPHER_QA_TEMPLATE.to_string(),
            input_variables: vec!["context".into(), "question".into()],
        }
    }

    /// Load a custom generation template. `{schema}` and `{question}` are
    /// required, `{examples}` is substituted when present.
    pub fn cypher_generation_from_file(path: &std::path::Path) -> QaResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            QaError::Config(format!("failed to read template {}: {}", path.display(), e))
        })?;
        let mut template = Self::new(text, &["schema", "question"])?;
        if template.template.contains("{examples}") {
            template.input_variables.push("examples".into());
        }
        Ok(template)
    }

    /// Substitute the declared variables in a single pass, so braces inside
    /// substituted values (schema property maps, for one) are left alone.
    pub fn format(&self, values: &HashMap<&str, &str>) -> QaResult<String> {
        for var in &self.input_variables {
            if !values.contains_key(var.as_str()) {
                return Err(QaError::Config(format!("missing prompt variable '{}'", var)));
            }
        }

        let rendered = RE_PLACEHOLDER.replace_all(&self.template, |caps: &Captures| {
            let name = &caps[1];
            match values.get(name) {
                Some(value) if self.input_variables.iter().any(|v| v == name) => value.to_string(),
                _ => caps[0].to_string(),
            }
        });
        Ok(rendered.into_owned())
    }
}
