use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info};
use neo4rs::{query, ConfigBuilder, Database, Graph, Row};
use serde_json::Value;

use crate::config::Neo4jConfig;
use crate::error::{QaError, QaResult};
use crate::traits::GraphClient;

/// Long-lived connection to a Neo4j database.
pub struct Neo4jClient {
    graph: Graph,
    uri: String,
}

impl Neo4jClient {
    /// Connect and verify that the server answers a trivial query. Any
    /// failure is reported as a connection error.
    pub async fn new(config: &Neo4jConfig) -> QaResult<Self> {
        let mut builder = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password);
        if let Some(database) = &config.database {
            builder = builder.db(Database::from(database.as_str()));
        }
        let graph_config = builder.build().map_err(QaError::connection)?;

        let graph = Graph::connect(graph_config)
            .await
            .map_err(|e| QaError::Connection(format!("Failed connecting to {}: {}", config.uri, e)))?;

        let client = Neo4jClient {
            graph,
            uri: config.uri.clone(),
        };
        client.verify_connectivity().await?;
        info!("Connected to Neo4j at {}", client.uri);
        Ok(client)
    }

    pub async fn verify_connectivity(&self) -> QaResult<()> {
        let mut result = self
            .graph
            .execute(query("RETURN 1 AS ok"))
            .await
            .map_err(|e| QaError::Connection(format!("Failed connecting to {}: {}", self.uri, e)))?;
        result
            .next()
            .await
            .map_err(|e| QaError::Connection(format!("Failed connecting to {}: {}", self.uri, e)))?;
        Ok(())
    }

    /// Convert a Neo4j row to JSON
    fn row_to_json(row: &Row) -> Result<Value> {
        row.to::<Value>()
            .map_err(|e| anyhow!("Failed to convert row to JSON: {}", e))
    }
}

#[async_trait]
impl GraphClient for Neo4jClient {
    async fn execute_cypher(&self, cypher_query: &str) -> Result<Vec<Value>> {
        debug!("Executing Cypher query: {}", cypher_query);

        let mut txn = self.graph.start_txn().await?;
        let mut result = txn.execute(query(cypher_query)).await?;

        let mut rows = Vec::new();
        while let Some(row) = result.next(txn.handle()).await? {
            rows.push(Self::row_to_json(&row)?);
        }
        txn.commit().await?;

        debug!("Query returned {} rows", rows.len());
        Ok(rows)
    }
}
