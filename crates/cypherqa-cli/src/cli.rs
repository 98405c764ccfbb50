//! Main CLI entry point and command routing
//!
//! Loads `.env`, parses arguments, assembles the configuration and routes
//! the subcommand to its handler.

use anyhow::Result;
use clap::ArgMatches;
use cypherqa_core::config::{load_config, parse_key_value_pair, DEFAULT_MOVIES_QUESTION};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::cli_builder::build_cli;
use crate::commands::{
    ask::AskCommand, interactive::InteractiveCommand, prompt::PromptCommand, schema::SchemaCommand,
    seed::SeedCommand, AppContext, CommandHandler,
};
use crate::error::CliError;
use crate::response_formatter::OutputOptions;

pub const DEFAULT_CONFIG_FILE: &str = "cypherqa.yaml";

/// Main CLI entry point
pub async fn run() -> Result<()> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!("Loaded environment from {}", path.display());
    }

    let matches = match build_cli().try_get_matches() {
        Ok(matches) => matches,
        // Prints help/version with status 0, usage errors with status 2.
        Err(err) => err.exit(),
    };

    let ctx = build_context(&matches)?;

    match matches.subcommand() {
        Some(("ask", sub_matches)) => AskCommand.execute(sub_matches, &ctx).await,
        Some(("interactive", sub_matches)) => InteractiveCommand.execute(sub_matches, &ctx).await,
        Some(("schema", sub_matches)) => SchemaCommand.execute(sub_matches, &ctx).await,
        Some(("seed", sub_matches)) => SeedCommand.execute(sub_matches, &ctx).await,
        Some(("prompt", sub_matches)) => PromptCommand.execute(sub_matches, &ctx).await,
        _ => {
            build_cli().print_help()?;
            Ok(())
        }
    }
}

/// Turn global arguments into the effective configuration.
pub fn build_context(matches: &ArgMatches) -> Result<AppContext, CliError> {
    let mut overrides = HashMap::new();
    if let Some(values) = matches.get_many::<String>("override") {
        for pair in values {
            let (key, value) = parse_key_value_pair(pair)
                .ok_or_else(|| CliError::Config(format!("Invalid override '{}', expected KEY=VALUE", pair)))?;
            overrides.insert(key, value);
        }
    }

    let config_path: Option<PathBuf> = match matches.get_one::<String>("config") {
        Some(path) => Some(PathBuf::from(path)),
        None => {
            let default = Path::new(DEFAULT_CONFIG_FILE);
            default.exists().then(|| default.to_path_buf())
        }
    };

    let mut config =
        load_config(config_path.as_deref(), &overrides).map_err(|e| CliError::Config(format!("{:#}", e)))?;

    if let Some(examples) = matches.get_one::<String>("examples") {
        config.chain.examples_file = Some(examples.clone());
    }
    if matches.get_flag("movies") {
        config.chain.movie_examples = true;
        config.chain.default_question = DEFAULT_MOVIES_QUESTION.to_string();
    }

    Ok(AppContext {
        config,
        output: OutputOptions {
            no_color: matches.get_flag("no-color"),
            ..OutputOptions::default()
        },
    })
}
