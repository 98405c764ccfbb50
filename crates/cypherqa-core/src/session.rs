//! Session bootstrap: database first, then the completion engine, then the
//! chain with its schema cache warmed.

use std::sync::Arc;

use anyhow::Result;
use log::{error, info};

use crate::config::{ChainConfig, Config, EngineConfig};
use crate::cypher::chain::{CypherQaChain, QaFailure, QaOutcome};
use crate::error::{QaError, QaResult};
use crate::neo4j::{MovieSeeder, SeedReport};
use crate::neo4j_client::Neo4jClient;
use crate::traits::{Engine, GraphClient};

pub struct QaSession {
    graph: Arc<dyn GraphClient>,
    chain: CypherQaChain,
    model: String,
}

impl QaSession {
    /// Connect to the configured database and build the engine with
    /// `engine_factory`. The factory is only called once the database
    /// answered.
    pub async fn connect<F>(config: &Config, engine_factory: F) -> QaResult<Self>
    where
        F: FnOnce(&EngineConfig) -> Result<Box<dyn Engine>>,
    {
        let graph = Neo4jClient::new(&config.neo4j)
            .await
            .map(|client| Arc::new(client) as Arc<dyn GraphClient>);
        let engine_config = config.engine.clone();
        Self::connect_with(graph, move || engine_factory(&engine_config), config.chain.clone()).await
    }

    pub async fn connect_with<F>(
        graph: QaResult<Arc<dyn GraphClient>>,
        engine_factory: F,
        settings: ChainConfig,
    ) -> QaResult<Self>
    where
        F: FnOnce() -> Result<Box<dyn Engine>>,
    {
        let graph = graph.map_err(|e| {
            error!("Database unavailable, question answering disabled: {}", e);
            match e {
                QaError::Connection(_) => e,
                other => QaError::Connection(other.to_string()),
            }
        })?;

        let engine: Arc<dyn Engine> = Arc::from(
            engine_factory().map_err(|e| QaError::Config(format!("Failed to create engine: {:#}", e)))?,
        );
        let model = engine.model().to_string();

        let chain = CypherQaChain::new(graph.clone(), engine, settings)?;
        chain.initialize().await?;
        info!("Session ready (model {})", model);

        Ok(QaSession { graph, chain, model })
    }

    #[cfg(test)]
    fn chain(&self) -> &CypherQaChain {
        &self.chain
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn ask(&self, question: &str) -> Result<QaOutcome, QaFailure> {
        self.chain.run(question).await
    }

    /// Import the movie dataset and refresh the cached schema so the new
    /// labels are visible to the next question.
    pub async fn seed(&self, csv_url: &str) -> QaResult<SeedReport> {
        let report = MovieSeeder::new(self.graph.as_ref()).seed(csv_url).await?;
        self.chain.refresh_schema().await?;
        Ok(report)
    }
}
