//! The question answering pipeline.
//!
//! One call to [`CypherQaChain::run`] walks a question through schema lookup,
//! Cypher synthesis, the optional read-only guard, execution, answer
//! phrasing and wrapping. A failure reports the stage that had been reached
//! and, once synthesis succeeded, the generated query.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::ChainConfig;
use crate::cypher::answer::AnswerGenerator;
use crate::cypher::examples::FewShotSet;
use crate::cypher::guard::QueryGuard;
use crate::cypher::prompt::PromptTemplate;
use crate::cypher::synthesizer::QuerySynthesizer;
use crate::error::{QaError, QaResult};
use crate::neo4j::{QueryExecutor, SchemaIntrospector};
use crate::traits::{Engine, GraphClient};
use crate::types::{GeneratedQuery, QueryResult, Question, SchemaDescription};
use crate::utils::wrap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Idle,
    SchemaFetched,
    QuerySynthesized,
    Executed,
    Displayed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Idle => "idle",
            PipelineStage::SchemaFetched => "schema fetched",
            PipelineStage::QuerySynthesized => "query synthesized",
            PipelineStage::Executed => "executed",
            PipelineStage::Displayed => "displayed",
        };
        f.write_str(name)
    }
}

/// Everything produced for one question.
#[derive(Debug, Clone, Serialize)]
pub struct QaOutcome {
    pub question: Question,
    pub query: GeneratedQuery,
    pub result: QueryResult,
    /// Phrased answer, absent when rows are returned directly.
    pub answer: Option<String>,
    /// Wrapped text ready to print.
    pub display: String,
}

#[derive(Debug, Error)]
#[error("{error}")]
pub struct QaFailure {
    /// Last stage completed before the failure.
    pub stage: PipelineStage,
    #[source]
    pub error: QaError,
    pub generated_query: Option<GeneratedQuery>,
}

impl QaFailure {
    fn new(stage: PipelineStage, error: QaError, generated_query: Option<GeneratedQuery>) -> Self {
        QaFailure {
            stage,
            error,
            generated_query,
        }
    }
}

/// The few-shot set selected by `settings`: an examples file wins over the
/// built-in movie set, which wins over the default set.
pub fn load_examples(settings: &ChainConfig) -> QaResult<FewShotSet> {
    match &settings.examples_file {
        Some(path) => FewShotSet::from_yaml_file(Path::new(path)).map_err(|e| QaError::Config(format!("{:#}", e))),
        None if settings.movie_examples => Ok(FewShotSet::movies()),
        None => Ok(FewShotSet::default()),
    }
}

pub fn load_template(settings: &ChainConfig) -> QaResult<PromptTemplate> {
    match &settings.template_file {
        Some(path) => PromptTemplate::cypher_generation_from_file(Path::new(path)),
        None => Ok(PromptTemplate::cypher_generation()),
    }
}

pub struct CypherQaChain {
    graph: Arc<dyn GraphClient>,
    synthesizer: QuerySynthesizer,
    answerer: AnswerGenerator,
    guard: QueryGuard,
    settings: ChainConfig,
    schema: RwLock<Option<SchemaDescription>>,
}

impl CypherQaChain {
    /// Build a chain from its collaborators. Custom examples and templates
    /// named in `settings` are loaded here.
    pub fn new(graph: Arc<dyn GraphClient>, engine: Arc<dyn Engine>, settings: ChainConfig) -> QaResult<Self> {
        let examples = load_examples(&settings)?;
        let template = load_template(&settings)?;

        Ok(CypherQaChain {
            graph,
            synthesizer: QuerySynthesizer::new(engine.clone(), template, examples),
            answerer: AnswerGenerator::new(engine),
            guard: QueryGuard::new(settings.read_only),
            settings,
            schema: RwLock::new(None),
        })
    }

    /// Fetch and cache the schema.
    pub async fn initialize(&self) -> QaResult<()> {
        self.refresh_schema().await.map(|_| ())
    }

    pub async fn refresh_schema(&self) -> QaResult<SchemaDescription> {
        let schema = SchemaIntrospector::new(self.graph.as_ref()).get_schema().await?;
        *self.schema.write().await = Some(schema.clone());
        Ok(schema)
    }

    /// The cached schema, if it has been fetched.
    pub async fn schema(&self) -> Option<SchemaDescription> {
        self.schema.read().await.clone()
    }

    async fn current_schema(&self) -> QaResult<SchemaDescription> {
        match self.schema().await {
            Some(schema) => Ok(schema),
            None => self.refresh_schema().await,
        }
    }

    pub async fn run(&self, question: &str) -> Result<QaOutcome, QaFailure> {
        let mut stage = PipelineStage::Idle;
        let question = Question::new(question).map_err(|e| QaFailure::new(stage, e, None))?;

        let schema = self
            .current_schema()
            .await
            .map_err(|e| QaFailure::new(stage, e, None))?;
        stage = PipelineStage::SchemaFetched;

        let query = self
            .synthesizer
            .complete(&schema, &question)
            .await
            .map_err(|e| QaFailure::new(stage, e, None))?;
        if let Err(e) = QuerySynthesizer::validate(&query) {
            return Err(QaFailure::new(stage, e, Some(query)));
        }
        stage = PipelineStage::QuerySynthesized;

        if let Err(e) = self.guard.check(&query.statement()) {
            return Err(QaFailure::new(stage, e, Some(query)));
        }

        let executor = QueryExecutor::new(self.graph.as_ref(), self.settings.top_k);
        let result = match executor.execute(&query).await {
            Ok(result) => result,
            Err(e) => return Err(QaFailure::new(stage, e, Some(query))),
        };
        stage = PipelineStage::Executed;
        if result.is_empty() {
            warn!("Generated query matched nothing");
        } else {
            debug!("Query returned {} rows", result.total_rows);
        }

        let answer = if self.settings.return_direct {
            None
        } else {
            match self.answerer.answer(&question, &result).await {
                Ok(answer) => Some(answer),
                Err(e) => {
                    warn!("Answer generation failed after a successful query");
                    return Err(QaFailure::new(stage, e, Some(query)));
                }
            }
        };

        let text = answer.clone().unwrap_or_else(|| result.to_context());
        let display = wrap::fill(&text, self.settings.wrap_width);
        stage = PipelineStage::Displayed;
        info!("Pipeline {} for question: {}", stage, question);

        Ok(QaOutcome {
            question,
            query,
            result,
            answer,
            display,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Request, Response, Usage};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::Mutex;

    struct ScriptedEngine {
        replies: Mutex<VecDeque<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedEngine {
        fn new(replies: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    impl Engine for ScriptedEngine {
        fn execute<'a>(&'a self, request: &'a Request) -> Box<dyn Future<Output = Result<Response>> + Send + 'a> {
            Box::new(async move {
                self.prompts.lock().unwrap().push(request.payload.clone());
                let reply = self.replies.lock().unwrap().pop_front();
                match reply {
                    Some(Ok(content)) => Ok(Response {
                        content,
                        usage: Usage::default(),
                        model: "scripted".to_string(),
                        finish_reason: Some("stop".to_string()),
                    }),
                    Some(Err(e)) => Err(e),
                    None => Err(anyhow!("no scripted reply")),
                }
            })
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    struct ScriptedGraph {
        answer: Result<Vec<Value>, String>,
        executed: Mutex<Vec<String>>,
    }

    impl ScriptedGraph {
        fn new(answer: Result<Vec<Value>, String>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                executed: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl GraphClient for ScriptedGraph {
        async fn execute_cypher(&self, cypher: &str) -> Result<Vec<Value>> {
            if cypher.contains("nodeTypeProperties") {
                return Ok(vec![
                    json!({"nodeLabels": ["Manager"], "propertyName": "managerName", "propertyTypes": ["String"]}),
                    json!({"nodeLabels": ["Address"], "propertyName": "city", "propertyTypes": ["String"]}),
                ]);
            }
            if cypher.contains("relTypeProperties") {
                return Ok(vec![]);
            }
            if cypher.contains("startLabel") {
                return Ok(vec![json!({"startLabel": "Manager", "relType": "LOCATED_AT", "endLabel": "Address"})]);
            }
            self.executed.lock().unwrap().push(cypher.to_string());
            self.answer.clone().map_err(|e| anyhow!(e))
        }
    }

    const SF_QUERY: &str = "MATCH (mgr:Manager)-[:LOCATED_AT]->(a:Address) WHERE a.city = 'San Francisco' RETURN mgr.managerName";

    #[tokio::test]
    async fn answers_question_end_to_end() {
        let graph = ScriptedGraph::new(Ok(vec![json!({"mgr.managerName": "Dodge & Cox"})]));
        let engine = ScriptedEngine::new(vec![
            Ok(SF_QUERY.to_string()),
            Ok("Dodge & Cox is an investment firm in San Francisco.".to_string()),
        ]);
        let chain = CypherQaChain::new(graph.clone(), engine.clone(), ChainConfig::default()).unwrap();
        chain.initialize().await.unwrap();

        let outcome = chain.run("What investment firms are in San Francisco?").await.unwrap();
        assert_eq!(outcome.question.as_str(), "What investment firms are in San Francisco?");
        assert_eq!(outcome.query.raw(), SF_QUERY);
        assert_eq!(outcome.result.rows.len(), 1);
        assert_eq!(outcome.display, "Dodge & Cox is an investment firm in San Francisco.");
        assert_eq!(graph.executed.lock().unwrap().as_slice(), [SF_QUERY.to_string()]);

        let prompts = engine.prompts.lock().unwrap();
        assert!(prompts[0].contains("(:Manager)-[:LOCATED_AT]->(:Address)"));
        assert!(prompts[1].contains("Dodge & Cox"));
    }

    #[tokio::test]
    async fn execution_failure_keeps_generated_query() {
        let graph = ScriptedGraph::new(Err("Variable `m` not defined".to_string()));
        let engine = ScriptedEngine::new(vec![Ok("```cypher\nMATCH (n) RETURN m\n```".to_string())]);
        let chain = CypherQaChain::new(graph, engine, ChainConfig::default()).unwrap();

        let failure = chain.run("Broken?").await.unwrap_err();
        assert_eq!(failure.stage, PipelineStage::QuerySynthesized);
        assert!(matches!(failure.error, QaError::Execution { ref query, .. } if query == "MATCH (n) RETURN m"));
        assert_eq!(
            failure.generated_query.unwrap().raw(),
            "```cypher\nMATCH (n) RETURN m\n```"
        );
    }

    #[tokio::test]
    async fn chain_serves_next_question_after_failure() {
        let graph = ScriptedGraph::new(Ok(vec![json!({"count": 3})]));
        let engine = ScriptedEngine::new(vec![
            Err(anyhow!("rate limited")),
            Ok("MATCH (m:Manager) RETURN count(m) AS count".to_string()),
        ]);
        let settings = ChainConfig {
            return_direct: true,
            ..ChainConfig::default()
        };
        let chain = CypherQaChain::new(graph, engine, settings).unwrap();

        let failure = chain.run("How many managers?").await.unwrap_err();
        assert_eq!(failure.stage, PipelineStage::SchemaFetched);
        assert!(matches!(failure.error, QaError::Translation(_)));
        assert!(failure.generated_query.is_none());

        let outcome = chain.run("How many managers?").await.unwrap();
        assert!(outcome.answer.is_none());
        assert_eq!(outcome.display, "[{\"count\":3}]");
    }

    #[tokio::test]
    async fn refusal_is_a_translation_failure_and_never_executed() {
        let graph = ScriptedGraph::new(Ok(vec![]));
        let engine = ScriptedEngine::new(vec![Ok("I'm sorry, I cannot answer that question.".to_string())]);
        let chain = CypherQaChain::new(graph.clone(), engine, ChainConfig::default()).unwrap();

        let failure = chain.run("What is the meaning of life?").await.unwrap_err();
        assert_eq!(failure.stage, PipelineStage::SchemaFetched);
        assert!(matches!(failure.error, QaError::Translation(_)));
        assert_eq!(
            failure.generated_query.unwrap().raw(),
            "I'm sorry, I cannot answer that question."
        );
        assert!(graph.executed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_only_guard_stops_writes_before_execution() {
        let graph = ScriptedGraph::new(Ok(vec![]));
        let engine = ScriptedEngine::new(vec![Ok("MATCH (n) DETACH DELETE n".to_string())]);
        let settings = ChainConfig {
            read_only: true,
            ..ChainConfig::default()
        };
        let chain = CypherQaChain::new(graph.clone(), engine, settings).unwrap();

        let failure = chain.run("Delete everything").await.unwrap_err();
        assert!(matches!(failure.error, QaError::Rejected { .. }));
        assert!(graph.executed.lock().unwrap().is_empty());
    }

    #[test]
    fn examples_follow_settings() {
        assert_eq!(load_examples(&ChainConfig::default()).unwrap().version, "2024-investment-v1");
        let movies = ChainConfig {
            movie_examples: true,
            ..ChainConfig::default()
        };
        assert_eq!(load_examples(&movies).unwrap().version, "2024-movies-v1");
        let missing = ChainConfig {
            examples_file: Some("/nonexistent/examples.yaml".to_string()),
            ..movies
        };
        assert!(matches!(load_examples(&missing), Err(QaError::Config(_))));
    }

    #[tokio::test]
    async fn blank_question_fails_before_any_call() {
        let graph = ScriptedGraph::new(Ok(vec![]));
        let engine = ScriptedEngine::new(vec![]);
        let chain = CypherQaChain::new(graph, engine.clone(), ChainConfig::default()).unwrap();

        let failure = chain.run("   ").await.unwrap_err();
        assert_eq!(failure.stage, PipelineStage::Idle);
        assert!(matches!(failure.error, QaError::InvalidQuestion(_)));
        assert!(engine.prompts.lock().unwrap().is_empty());
    }
}
