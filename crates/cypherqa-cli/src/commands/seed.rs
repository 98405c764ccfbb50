use anyhow::Result;
use clap::ArgMatches;
use cypherqa_core::config::DEFAULT_MOVIES_CSV;
use cypherqa_core::neo4j::{movies_import_query, MovieSeeder};

use super::{connect_graph, AppContext, CommandHandler};
use crate::error::CliError;
use crate::progress::QuestionSpinner;
use crate::response_formatter::{format_seed_report, OutputOptions};

/// The requested CSV source, checked before any connection is made.
pub fn csv_source(matches: &ArgMatches) -> Result<String, CliError> {
    let csv_url = matches
        .get_one::<String>("csv-url")
        .map(String::as_str)
        .unwrap_or(DEFAULT_MOVIES_CSV);
    movies_import_query(csv_url)?;
    Ok(csv_url.to_string())
}

/// One-time movie import. Safe to repeat, and needs no completion service.
pub struct SeedCommand;

impl CommandHandler for SeedCommand {
    async fn execute(&self, matches: &ArgMatches, ctx: &AppContext) -> Result<()> {
        let csv_url = csv_source(matches)?;
        let output = OutputOptions {
            json_format: matches.get_flag("json"),
            ..ctx.output.clone()
        };

        let client = connect_graph(&ctx.config).await?;
        let spinner = QuestionSpinner::start("Importing movies...", output.no_color);
        match MovieSeeder::new(&client).seed(&csv_url).await {
            Ok(report) => {
                spinner.clear();
                println!("{}", format_seed_report(&report, &output));
                Ok(())
            }
            Err(e) => {
                spinner.fail("Import failed");
                Err(CliError::from(e).into())
            }
        }
    }
}
