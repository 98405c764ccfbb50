//! One-time movie dataset import
//!
//! Loads the small movies CSV into the graph with `MERGE` on natural keys so
//! that running the import again leaves node and relationship counts as
//! they were.

use log::info;
use serde::Serialize;
use serde_json::Value;

use crate::error::{QaError, QaResult};
use crate::traits::GraphClient;

const MOVIES_IMPORT_TEMPLATE: &str = "\
LOAD CSV WITH HEADERS FROM '{csv_url}' AS row
WITH row,
    split(row.director, '|') AS directors,
    split(row.actors, '|') AS actors,
    split(row.genres, '|') AS genres
MERGE (m:Movie {id:row.movieId})
SET m.released = date(row.released),
    m.title = row.title,
    m.imdbRating = toFloat(row.imdbRating)
FOREACH (director in directors |
    MERGE (p:Person {name:trim(director)})
    MERGE (p)-[:DIRECTED]->(m))
FOREACH (actor in actors |
    MERGE (p:Person {name:trim(actor)})
    MERGE (p)-[:ACTED_IN]->(m))
FOREACH (genre in genres |
    MERGE (g:Genre {name:trim(genre)})
    MERGE (m)-[:IN_GENRE]->(g))";

pub const COUNTS_QUERY: &str = "\
CALL { MATCH (m:Movie) RETURN count(m) AS movies }
CALL { MATCH (p:Person) RETURN count(p) AS people }
CALL { MATCH (g:Genre) RETURN count(g) AS genres }
CALL { MATCH (:Person)-[r:DIRECTED]->(:Movie) RETURN count(r) AS directed }
CALL { MATCH (:Person)-[r:ACTED_IN]->(:Movie) RETURN count(r) AS acted_in }
CALL { MATCH (:Movie)-[r:IN_GENRE]->(:Genre) RETURN count(r) AS in_genre }
RETURN movies, people, genres, directed, acted_in, in_genre";

/// Node and relationship counts of the movie graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphCounts {
    pub movies: i64,
    pub people: i64,
    pub genres: i64,
    pub directed: i64,
    pub acted_in: i64,
    pub in_genre: i64,
}

impl GraphCounts {
    fn from_row(row: &Value) -> QaResult<Self> {
        let field = |name: &str| {
            row[name].as_i64().ok_or_else(|| QaError::Execution {
                query: COUNTS_QUERY.to_string(),
                message: format!("missing count column '{}'", name),
            })
        };
        Ok(GraphCounts {
            movies: field("movies")?,
            people: field("people")?,
            genres: field("genres")?,
            directed: field("directed")?,
            acted_in: field("acted_in")?,
            in_genre: field("in_genre")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub source: String,
    pub before: GraphCounts,
    pub after: GraphCounts,
}

impl SeedReport {
    /// True when the import added nothing, as on a repeated run.
    pub fn unchanged(&self) -> bool {
        self.before == self.after
    }
}

/// Build the import statement for a CSV source. Only http(s) and file URLs
/// are accepted and quotes are rejected, since the URL is spliced into the
/// statement text.
pub fn movies_import_query(csv_url: &str) -> QaResult<String> {
    let parsed = url::Url::parse(csv_url)
        .map_err(|e| QaError::Config(format!("invalid CSV URL '{}': {}", csv_url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https" | "file") {
        return Err(QaError::Config(format!(
            "unsupported CSV URL scheme '{}'",
            parsed.scheme()
        )));
    }
    if csv_url.contains('\'') || csv_url.contains('\\') {
        return Err(QaError::Config("CSV URL must not contain quotes".to_string()));
    }
    Ok(MOVIES_IMPORT_TEMPLATE.replace("{csv_url}", csv_url))
}

pub struct MovieSeeder<'a> {
    client: &'a dyn GraphClient,
}

impl<'a> MovieSeeder<'a> {
    pub fn new(client: &'a dyn GraphClient) -> Self {
        Self { client }
    }

    pub async fn counts(&self) -> QaResult<GraphCounts> {
        let rows = self
            .client
            .execute_cypher(COUNTS_QUERY)
            .await
            .map_err(|e| QaError::Execution {
                query: COUNTS_QUERY.to_string(),
                message: e.to_string(),
            })?;
        match rows.first() {
            Some(row) => GraphCounts::from_row(row),
            None => Ok(GraphCounts::default()),
        }
    }

    pub async fn seed(&self, csv_url: &str) -> QaResult<SeedReport> {
        let statement = movies_import_query(csv_url)?;
        let before = self.counts().await?;

        info!("Importing movies from {}", csv_url);
        self.client
            .execute_cypher(&statement)
            .await
            .map_err(|e| QaError::Execution {
                query: statement.clone(),
                message: e.to_string(),
            })?;

        let after = self.counts().await?;
        info!("Movie graph counts after import: {:?}", after);
        Ok(SeedReport {
            source: csv_url.to_string(),
            before,
            after,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MOVIES_CSV;

    #[test]
    fn import_only_merges() {
        let statement = movies_import_query(DEFAULT_MOVIES_CSV).unwrap();
        assert!(statement.contains(DEFAULT_MOVIES_CSV));
        assert!(!statement.to_uppercase().contains("CREATE"));
        assert_eq!(statement.matches("MERGE").count(), 7);
        for key in ["Movie {id:row.movieId}", "Person {name:trim(director)}", "Genre {name:trim(genre)}"] {
            assert!(statement.contains(key), "missing natural key {key}");
        }
    }

    #[test]
    fn rejects_bad_sources() {
        assert!(movies_import_query("ftp://example.com/movies.csv").is_err());
        assert!(movies_import_query("not a url").is_err());
        assert!(movies_import_query("https://example.com/x.csv' AS row DETACH DELETE row //").is_err());
    }
}
