use cypherqa_cli::{cli, error::exit_code};
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(e) = cli::run().await {
        eprintln!("Error: {:#}", e);
        process::exit(exit_code(&e));
    }
}
