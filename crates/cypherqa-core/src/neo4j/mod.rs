//! Neo4j modules
//!
//! Schema introspection, statement execution and the movie dataset import,
//! all written against the [`GraphClient`](crate::traits::GraphClient) trait.

pub mod query_executor;
pub mod schema;
pub mod seed;

// Re-export commonly used types and functions
pub use query_executor::QueryExecutor;
pub use schema::{GraphSchema, PropertyDef, RelationshipPattern, SchemaIntrospector};
pub use seed::{movies_import_query, GraphCounts, MovieSeeder, SeedReport, COUNTS_QUERY};
