use std::future::Future;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::types::{Request, Response};

/// A language-model completion service.
pub trait Engine: Send + Sync {
    fn execute<'a>(&'a self, request: &'a Request) -> Box<dyn Future<Output = Result<Response>> + Send + 'a>;

    /// Model identifier used for requests, for logging and display.
    fn model(&self) -> &str;
}

/// A connection to a graph database able to run Cypher text.
#[async_trait]
pub trait GraphClient: Send + Sync {
    /// Run `cypher` and return every row as a JSON object keyed by column.
    async fn execute_cypher(&self, cypher: &str) -> Result<Vec<Value>>;
}
