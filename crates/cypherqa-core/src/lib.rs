// crates/cypherqa-core/src/lib.rs
pub mod config;
pub mod cypher;
pub mod error;
pub mod neo4j;
pub mod neo4j_client;
pub mod session;
pub mod traits;
pub mod types;
pub mod utils;

pub use error::{QaError, QaResult};
