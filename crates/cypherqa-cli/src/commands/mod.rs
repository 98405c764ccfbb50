//! CLI command modules
pub mod ask;
pub mod interactive;
pub mod prompt;
pub mod schema;
pub mod seed;

use anyhow::Result;
use clap::ArgMatches;
use cypherqa_core::config::Config;
use cypherqa_core::neo4j_client::Neo4jClient;
use cypherqa_core::session::QaSession;
use cypherqa_engines::create_engine;
use log::debug;

use crate::error::CliError;
use crate::response_formatter::OutputOptions;

/// Effective configuration plus the global output flags.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
    pub output: OutputOptions,
}

/// Trait for CLI command handlers
#[allow(async_fn_in_trait)]
pub trait CommandHandler {
    /// Execute the command with the given arguments and configuration
    async fn execute(&self, matches: &ArgMatches, ctx: &AppContext) -> Result<()>;
}

/// Connect to the database only; for commands that never call the model.
pub async fn connect_graph(config: &Config) -> Result<Neo4jClient, CliError> {
    debug!("Connecting to {}", config.neo4j.uri);
    Ok(Neo4jClient::new(&config.neo4j).await?)
}

pub async fn connect_session(config: &Config) -> Result<QaSession, CliError> {
    Ok(QaSession::connect(config, create_engine).await?)
}
