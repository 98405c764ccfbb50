//! Command-line front end for asking questions of a Neo4j graph in plain
//! language.
//!
//! # Key Modules
//!
//! - [`cli`] - entry point, configuration loading and command routing
//! - [`cli_builder`] - the clap command tree
//! - [`commands`] - one handler per subcommand
//! - [`response_formatter`] - terminal and JSON output
//! - [`error`] - error kinds and their process exit codes

pub mod cli;
pub mod cli_builder;
pub mod commands;
pub mod error;
pub mod progress;
pub mod response_formatter;
