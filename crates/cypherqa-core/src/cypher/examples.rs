//! Few-shot example sets for Cypher generation
//!
//! Examples live apart from the instruction text so a set can be swapped or
//! versioned without touching the template.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FewShotExample {
    pub question: String,
    pub cypher: String,
}

impl FewShotExample {
    pub fn new(question: &str, cypher: &str) -> Self {
        FewShotExample {
            question: question.to_string(),
            cypher: cypher.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FewShotSet {
    pub version: String,
    pub examples: Vec<FewShotExample>,
}

impl Default for FewShotSet {
    fn default() -> Self {
        FewShotSet {
            version: "2024-investment-v1".to_string(),
            examples: vec![
                FewShotExample::new(
                    "What investment firms are in San Francisco?",
                    "MATCH (mgr:Manager)-[:LOCATED_AT]->(mgrAddress:Address)\n    \
                     WHERE mgrAddress.city = 'San Francisco'\n\
                     RETURN mgr.managerName",
                ),
                FewShotExample::new(
                    "What investment firms are near Santa Clara?",
                    "MATCH (address:Address)\n    \
                     WHERE address.city = \"Santa Clara\"\n\
                     MATCH (mgr:Manager)-[:LOCATED_AT]->(managerAddress:Address)\n    \
                     WHERE point.distance(address.location,\n        \
                     managerAddress.location) < 10000\n\
                     RETURN mgr.managerName, mgr.managerAddress",
                ),
                FewShotExample::new(
                    "What does Palo Alto Networks do?",
                    "CALL db.index.fulltext.queryNodes(\n    \
                     \"fullTextCompanyNames\",\n    \
                     \"Palo Alto Networks\"\n    \
                     ) YIELD node, score\n\
                     WITH node as com\n\
                     MATCH (com)-[:FILED]->(f:Form),\n    \
                     (f)-[s:SECTION]->(c:Chunk)\n\
                     WHERE s.f10kItem = \"item1\"\n\
                     RETURN c.text",
                ),
            ],
        }
    }
}

impl FewShotSet {
    /// Examples for the imported movie graph.
    pub fn movies() -> Self {
        FewShotSet {
            version: "2024-movies-v1".to_string(),
            examples: vec![
                FewShotExample::new(
                    "Which movies did Tom Hanks act in?",
                    "MATCH (p:Person {name: 'Tom Hanks'})-[:ACTED_IN]->(m:Movie)\n\
                     RETURN m.title",
                ),
                FewShotExample::new(
                    "Who directed Casino?",
                    "MATCH (p:Person)-[:DIRECTED]->(m:Movie {title: 'Casino'})\n\
                     RETURN p.name",
                ),
                FewShotExample::new(
                    "What are the highest rated comedies?",
                    "MATCH (m:Movie)-[:IN_GENRE]->(:Genre {name: 'Comedy'})\n\
                     WHERE m.imdbRating IS NOT NULL\n\
                     RETURN m.title, m.imdbRating\n\
                     ORDER BY m.imdbRating DESC\n\
                     LIMIT 5",
                ),
            ],
        }
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let set: FewShotSet = serde_yaml::from_str(content).context("Invalid few-shot example file")?;
        if set.version.trim().is_empty() {
            return Err(anyhow!("Few-shot example set needs a version"));
        }
        if let Some(bad) = set
            .examples
            .iter()
            .find(|e| e.question.trim().is_empty() || e.cypher.trim().is_empty())
        {
            return Err(anyhow!("Few-shot example has an empty field: {:?}", bad));
        }
        Ok(set)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read examples file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Render as `# question` / statement blocks separated by blank lines.
    pub fn render(&self) -> String {
        self.examples
            .iter()
            .map(|e| format!("# {}\n{}", e.question.trim(), e.cypher.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
