//! Response formatting and output handling
//!
//! Prints pipeline outcomes, failures, the schema and seeding reports, in
//! color, plain text or JSON.

use cypherqa_core::cypher::{QaFailure, QaOutcome};
use cypherqa_core::neo4j::{GraphCounts, SeedReport};
use cypherqa_core::types::{GeneratedQuery, SchemaDescription};
use owo_colors::OwoColorize;
use serde_json::json;

/// Output formatting options
#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub json_format: bool,
    pub no_color: bool,
    pub show_query: bool,
}

impl OutputOptions {
    fn paint_green(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.green().to_string()
        }
    }

    fn paint_red(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.red().to_string()
        }
    }

    fn paint_dim(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.dimmed().to_string()
        }
    }
}

pub fn connected_banner(uri: &str, options: &OutputOptions) -> String {
    options.paint_green(&format!("Connected to Neo4j at {}", uri))
}

pub fn format_outcome(outcome: &QaOutcome, options: &OutputOptions) -> String {
    if options.json_format {
        return serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string());
    }

    let mut out = String::new();
    if options.show_query {
        out.push_str(&generated_cypher(&outcome.query, options));
        out.push_str("\n\n");
    }
    out.push_str(&outcome.display);
    if outcome.result.total_rows > outcome.result.rows.len() {
        out.push('\n');
        out.push_str(&options.paint_dim(&format!(
            "({} of {} rows used)",
            outcome.result.rows.len(),
            outcome.result.total_rows
        )));
    }
    out
}

/// The generated query is always shown on failure, it is what the user
/// needs to see to understand what went wrong.
pub fn format_failure(failure: &QaFailure, options: &OutputOptions) -> String {
    if options.json_format {
        let value = json!({
            "error": failure.error.to_string(),
            "stage": failure.stage,
            "query": failure.generated_query.as_ref().map(|q| q.raw()),
        });
        return serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string());
    }

    let mut out = options.paint_red(&format!("Failed after stage '{}': {}", failure.stage, failure.error));
    if let Some(query) = &failure.generated_query {
        out.push_str("\n\n");
        out.push_str(&generated_cypher(query, options));
    }
    out
}

/// The completion text exactly as the model returned it, fence included.
fn generated_cypher(query: &GeneratedQuery, options: &OutputOptions) -> String {
    options.paint_dim(&format!("Generated Cypher:\n{}", query.raw().trim()))
}

pub fn format_schema(schema: &SchemaDescription) -> String {
    schema.to_string()
}

pub fn format_counts(counts: &GraphCounts) -> String {
    format!(
        "Movies: {}\nPeople: {}\nGenres: {}\nDIRECTED: {}\nACTED_IN: {}\nIN_GENRE: {}",
        counts.movies, counts.people, counts.genres, counts.directed, counts.acted_in, counts.in_genre
    )
}

pub fn format_seed_report(report: &SeedReport, options: &OutputOptions) -> String {
    if options.json_format {
        return serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
    }
    let status = if report.unchanged() {
        "Import finished, graph already up to date"
    } else {
        "Import finished"
    };
    format!(
        "{}\nSource: {}\n{}",
        options.paint_green(status),
        report.source,
        format_counts(&report.after)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cypherqa_core::cypher::PipelineStage;
    use cypherqa_core::types::{QueryResult, Question};
    use cypherqa_core::QaError;
    use serde_json::json;

    fn outcome() -> QaOutcome {
        QaOutcome {
            question: Question::new("Who directed Casino?").unwrap(),
            query: GeneratedQuery::new("```cypher\nMATCH (p:Person)-[:DIRECTED]->(:Movie {title: 'Casino'}) RETURN p.name\n```"),
            result: QueryResult::new(vec![json!({"p.name": "Martin Scorsese"})], 10),
            answer: Some("Martin Scorsese directed Casino.".to_string()),
            display: "Martin Scorsese directed Casino.".to_string(),
        }
    }

    #[test]
    fn plain_outcome_is_the_display_text() {
        let options = OutputOptions {
            no_color: true,
            ..OutputOptions::default()
        };
        assert_eq!(format_outcome(&outcome(), &options), "Martin Scorsese directed Casino.");
    }

    #[test]
    fn show_query_prints_raw_completion_first() {
        let options = OutputOptions {
            no_color: true,
            show_query: true,
            ..OutputOptions::default()
        };
        let text = format_outcome(&outcome(), &options);
        assert!(text.starts_with("Generated Cypher:\n```cypher\nMATCH (p:Person)"));
        assert!(text.ends_with("```\n\nMartin Scorsese directed Casino."));
    }

    #[test]
    fn success_and_failure_show_the_same_query_text() {
        let options = OutputOptions {
            no_color: true,
            show_query: true,
            ..OutputOptions::default()
        };
        let success = outcome();
        let failure = QaFailure {
            stage: PipelineStage::QuerySynthesized,
            error: QaError::Execution {
                query: success.query.statement(),
                message: "boom".to_string(),
            },
            generated_query: Some(success.query.clone()),
        };
        let shown = format!("Generated Cypher:\n{}", success.query.raw().trim());
        assert!(format_outcome(&success, &options).contains(&shown));
        assert!(format_failure(&failure, &options).ends_with(&shown));
    }

    #[test]
    fn seed_report_as_json() {
        let report = SeedReport {
            source: "file:///movies_small.csv".to_string(),
            before: GraphCounts::default(),
            after: GraphCounts {
                movies: 9,
                ..GraphCounts::default()
            },
        };
        let options = OutputOptions {
            json_format: true,
            ..OutputOptions::default()
        };
        let value: serde_json::Value = serde_json::from_str(&format_seed_report(&report, &options)).unwrap();
        assert_eq!(value["after"]["movies"], 9);
        assert_eq!(value["source"], "file:///movies_small.csv");
    }

    #[test]
    fn json_outcome_keeps_question_and_raw_query() {
        let options = OutputOptions {
            json_format: true,
            ..OutputOptions::default()
        };
        let value: serde_json::Value = serde_json::from_str(&format_outcome(&outcome(), &options)).unwrap();
        assert_eq!(value["question"], "Who directed Casino?");
        assert!(value["query"]["raw"].as_str().unwrap().starts_with("```cypher"));
        assert_eq!(value["result"]["rows"][0]["p.name"], "Martin Scorsese");
    }

    #[test]
    fn failure_shows_generated_query() {
        let failure = QaFailure {
            stage: PipelineStage::QuerySynthesized,
            error: QaError::Execution {
                query: "MATCH (n) RETURN m".to_string(),
                message: "Variable `m` not defined".to_string(),
            },
            generated_query: Some(GeneratedQuery::new("MATCH (n) RETURN m")),
        };
        let options = OutputOptions {
            no_color: true,
            ..OutputOptions::default()
        };
        let text = format_failure(&failure, &options);
        assert!(text.starts_with("Failed after stage 'query synthesized': execution error"));
        assert!(text.ends_with("Generated Cypher:\nMATCH (n) RETURN m"));
    }
}
