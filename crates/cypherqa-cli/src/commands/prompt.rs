use anyhow::Result;
use clap::ArgMatches;
use cypherqa_core::cypher::{load_examples, load_template, render_prompt};
use cypherqa_core::neo4j::SchemaIntrospector;
use cypherqa_core::types::{Question, SchemaDescription};

use super::{connect_graph, AppContext, CommandHandler};
use crate::error::CliError;

/// Print the generation prompt for a question. Useful for tuning examples
/// without spending completion tokens.
pub struct PromptCommand;

impl CommandHandler for PromptCommand {
    async fn execute(&self, matches: &ArgMatches, ctx: &AppContext) -> Result<()> {
        let text = matches
            .get_one::<String>("question")
            .map(String::as_str)
            .unwrap_or_default();
        let question = Question::new(text).map_err(CliError::from)?;
        let examples = load_examples(&ctx.config.chain).map_err(CliError::from)?;
        let template = load_template(&ctx.config.chain).map_err(CliError::from)?;

        let schema = match matches.get_one::<String>("schema-file") {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .map_err(|e| CliError::Config(format!("Failed to read schema file {}: {}", path, e)))?;
                SchemaDescription::new(text.trim_end())
            }
            None => {
                let client = connect_graph(&ctx.config).await?;
                SchemaIntrospector::new(&client)
                    .get_schema()
                    .await
                    .map_err(CliError::from)?
            }
        };

        let prompt = render_prompt(&template, &examples, &schema, &question).map_err(CliError::from)?;
        println!("{}", prompt);
        Ok(())
    }
}
