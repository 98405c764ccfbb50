//! Natural-language to Cypher translation and the pipeline built on it.

pub mod answer;
pub mod chain;
pub mod examples;
pub mod extract;
pub mod guard;
pub mod prompt;
pub mod synthesizer;

pub use answer::AnswerGenerator;
pub use chain::{load_examples, load_template, CypherQaChain, PipelineStage, QaFailure, QaOutcome};
pub use examples::{FewShotExample, FewShotSet};
pub use guard::QueryGuard;
pub use prompt::PromptTemplate;
pub use synthesizer::{render_prompt, QuerySynthesizer};
