use anyhow::Result;
use clap::ArgMatches;
use dialoguer::Input;

use super::seed::csv_source;
use super::{connect_session, AppContext, CommandHandler};
use crate::error::CliError;
use crate::progress::{flash_banner, QuestionSpinner, BANNER_LINGER};
use crate::response_formatter::{
    connected_banner, format_failure, format_outcome, format_seed_report, OutputOptions,
};

/// Question loop. A failed question is reported and the loop goes on; only
/// an unreachable database ends the session.
pub struct InteractiveCommand;

impl CommandHandler for InteractiveCommand {
    async fn execute(&self, matches: &ArgMatches, ctx: &AppContext) -> Result<()> {
        let output = OutputOptions {
            show_query: matches.get_flag("show-query"),
            ..ctx.output.clone()
        };
        let mut initial = matches
            .get_one::<String>("default-question")
            .cloned()
            .unwrap_or_else(|| ctx.config.chain.default_question.clone());
        let seed_source = if matches.get_flag("seed") {
            Some(csv_source(matches)?)
        } else {
            None
        };

        let session = connect_session(&ctx.config).await?;
        flash_banner(connected_banner(&ctx.config.neo4j.uri, &output), BANNER_LINGER).await;

        if let Some(csv_url) = seed_source {
            let spinner = QuestionSpinner::start("Importing movies...", output.no_color);
            match session.seed(&csv_url).await {
                Ok(report) => {
                    spinner.clear();
                    eprintln!("{}\n", format_seed_report(&report, &output));
                }
                Err(e) => {
                    spinner.fail("Import failed");
                    return Err(CliError::from(e).into());
                }
            }
        }
        eprintln!("Enter an empty question to quit.");

        loop {
            let question: String = Input::new()
                .with_prompt("Question")
                .with_initial_text(std::mem::take(&mut initial))
                .allow_empty(true)
                .interact_text()?;
            if question.trim().is_empty() {
                break;
            }

            let spinner = QuestionSpinner::start("Thinking...", output.no_color);
            match session.ask(&question).await {
                Ok(outcome) => {
                    spinner.succeed("Done");
                    println!("{}\n", format_outcome(&outcome, &output));
                }
                Err(failure) => {
                    spinner.fail("Could not answer");
                    eprintln!("{}\n", format_failure(&failure, &output));
                }
            }
        }
        Ok(())
    }
}
