// crates/cypherqa-engines/src/lib.rs
use std::str::FromStr;

use anyhow::{anyhow, Result};
use cypherqa_core::config::EngineConfig;
use cypherqa_core::traits::Engine;
use log::debug;
use strum::{Display, EnumString};

pub mod openai;
pub mod shared;

pub use openai::OpenAICompatibleEngine;

/// Completion services reachable through the OpenAI chat completions wire
/// format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
pub enum EngineKind {
    #[strum(ascii_case_insensitive, to_string = "groq")]
    Groq,

    #[strum(ascii_case_insensitive, serialize = "openai_compatible", to_string = "openai")]
    OpenAI,
}

/// Build the engine named by `config.engine`.
pub fn create_engine(config: &EngineConfig) -> Result<Box<dyn Engine>> {
    let kind = EngineKind::from_str(&config.engine)
        .map_err(|_| anyhow!("Unknown engine type: {}", config.engine))?;
    debug!("Creating {} engine '{}'", kind, config.name);

    match kind {
        EngineKind::Groq | EngineKind::OpenAI => Ok(Box::new(OpenAICompatibleEngine::new(config.clone())?)),
    }
}
