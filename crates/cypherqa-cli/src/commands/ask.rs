use anyhow::Result;
use clap::ArgMatches;
use cypherqa_core::types::Question;
use log::debug;

use super::{connect_session, AppContext, CommandHandler};
use crate::error::CliError;
use crate::progress::QuestionSpinner;
use crate::response_formatter::{format_failure, format_outcome, OutputOptions};

/// Answer one question and exit.
pub struct AskCommand;

impl CommandHandler for AskCommand {
    async fn execute(&self, matches: &ArgMatches, ctx: &AppContext) -> Result<()> {
        let text = matches
            .get_one::<String>("question")
            .map(String::as_str)
            .unwrap_or_default();
        // Reject a blank question before touching the network.
        Question::new(text).map_err(CliError::from)?;

        let mut config = ctx.config.clone();
        if matches.get_flag("direct") {
            config.chain.return_direct = true;
        }
        if matches.get_flag("read-only") {
            config.chain.read_only = true;
        }
        if let Some(&width) = matches.get_one::<usize>("width") {
            if width == 0 {
                return Err(CliError::Validation("--width must be at least 1".to_string()).into());
            }
            config.chain.wrap_width = width;
        }

        let output = OutputOptions {
            json_format: matches.get_flag("json"),
            show_query: matches.get_flag("show-query"),
            ..ctx.output.clone()
        };

        let session = connect_session(&config).await?;
        debug!("Asking with model {}", session.model());

        let spinner = QuestionSpinner::start("Generating Cypher...", output.no_color);
        match session.ask(text).await {
            Ok(outcome) => {
                spinner.clear();
                println!("{}", format_outcome(&outcome, &output));
                Ok(())
            }
            Err(failure) => {
                spinner.clear();
                eprintln!("{}", format_failure(&failure, &output));
                Err(CliError::from(failure).into())
            }
        }
    }
}
