//! Query execution and result processing for Neo4j
//!
//! Runs generated statements verbatim and turns failures into execution
//! errors that keep the offending statement for diagnosis.

use log::{info, warn};

use crate::error::{QaError, QaResult};
use crate::traits::GraphClient;
use crate::types::{GeneratedQuery, QueryResult};

/// Query executor for generated Cypher
pub struct QueryExecutor<'a> {
    client: &'a dyn GraphClient,
    top_k: usize,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(client: &'a dyn GraphClient, top_k: usize) -> Self {
        Self { client, top_k }
    }

    /// Execute a generated query and keep the first `top_k` rows
    pub async fn execute(&self, query: &GeneratedQuery) -> QaResult<QueryResult> {
        let statement = query.statement();
        if statement.is_empty() {
            return Err(QaError::Execution {
                query: query.raw().to_string(),
                message: "generated query is empty".to_string(),
            });
        }

        info!("Executing Cypher query: {}", statement);
        match self.client.execute_cypher(&statement).await {
            Ok(rows) => {
                let result = QueryResult::new(rows, self.top_k);
                if result.total_rows > result.rows.len() {
                    info!(
                        "Keeping {} of {} rows",
                        result.rows.len(),
                        result.total_rows
                    );
                }
                Ok(result)
            }
            Err(e) => {
                warn!("Generated query failed: {}", e);
                Err(QaError::Execution {
                    query: statement,
                    message: e.to_string(),
                })
            }
        }
    }
}
