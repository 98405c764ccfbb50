use anyhow::Result;
use clap::ArgMatches;
use cypherqa_core::neo4j::SchemaIntrospector;

use super::{connect_graph, AppContext, CommandHandler};
use crate::error::CliError;
use crate::response_formatter::format_schema;

pub struct SchemaCommand;

impl CommandHandler for SchemaCommand {
    async fn execute(&self, _matches: &ArgMatches, ctx: &AppContext) -> Result<()> {
        let client = connect_graph(&ctx.config).await?;
        let schema = SchemaIntrospector::new(&client)
            .get_schema()
            .await
            .map_err(CliError::from)?;
        println!("{}", format_schema(&schema));
        Ok(())
    }
}
