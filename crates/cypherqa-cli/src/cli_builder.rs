//! CLI argument parsing and command building

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the main CLI command structure
pub fn build_cli() -> Command {
    Command::new("cypherqa")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Ask questions of a Neo4j graph in plain language")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("YAML config file (default: cypherqa.yaml if present)")
                .global(true),
        )
        .arg(
            Arg::new("override")
                .short('o')
                .long("override")
                .value_name("KEY=VALUE")
                .help("Override engine parameters, e.g. -o modelName=llama3-70b-8192")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("examples")
                .long("examples")
                .value_name("FILE")
                .help("YAML file with few-shot question/Cypher examples")
                .global(true),
        )
        .arg(
            Arg::new("movies")
                .long("movies")
                .help("Use the movie graph examples and default question")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("ask")
                .about("Answer a single question")
                .arg(
                    Arg::new("question")
                        .help("The question to answer")
                        .required(true),
                )
                .arg(
                    Arg::new("show-query")
                        .long("show-query")
                        .help("Print the generated Cypher before the answer")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("direct")
                        .long("direct")
                        .help("Print the query rows instead of a phrased answer")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("width")
                        .long("width")
                        .value_name("COLUMNS")
                        .help("Wrap output to this many columns")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("json")
                        .short('j')
                        .long("json")
                        .help("Output the outcome as JSON")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("read-only")
                        .long("read-only")
                        .help("Refuse generated statements that write to the database")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("interactive")
                .about("Prompt for questions until an empty line is entered")
                .arg(
                    Arg::new("default-question")
                        .long("default-question")
                        .value_name("TEXT")
                        .help("Question pre-filled in the first prompt"),
                )
                .arg(
                    Arg::new("show-query")
                        .long("show-query")
                        .help("Print the generated Cypher before each answer")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Import the movie dataset before the first question")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("csv-url")
                        .long("csv-url")
                        .value_name("URL")
                        .requires("seed")
                        .help("CSV source for --seed (http, https or file URL)"),
                ),
        )
        .subcommand(Command::new("schema").about("Print the schema the prompt is built from"))
        .subcommand(
            Command::new("seed")
                .about("Import the movie dataset with MERGE and print graph counts")
                .arg(
                    Arg::new("csv-url")
                        .long("csv-url")
                        .value_name("URL")
                        .help("CSV source (http, https or file URL)"),
                )
                .arg(
                    Arg::new("json")
                        .short('j')
                        .long("json")
                        .help("Output the import report as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("prompt")
                .about("Print the Cypher generation prompt without calling the model")
                .arg(
                    Arg::new("question")
                        .help("The question to embed")
                        .required(true),
                )
                .arg(
                    Arg::new("schema-file")
                        .long("schema-file")
                        .value_name("FILE")
                        .help("Read the schema text from a file instead of the database"),
                ),
        )
}
