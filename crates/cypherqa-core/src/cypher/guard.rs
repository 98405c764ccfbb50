//! Optional read-only check between synthesis and execution.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{QaError, QaResult};

static RE_WRITE_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(CREATE|MERGE|DELETE|DETACH|SET|REMOVE|DROP|FOREACH|LOAD\s+CSV)\b").expect("valid regex")
});

// apoc.cypher.doIt and friends run Cypher passed in as a string, which is
// blanked before the clause scan, so they are refused by name.
static RE_WRITE_PROCEDURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\bCALL\s+(",
        r"dbms\s*\.",
        r"|apoc\s*\.\s*(create|merge|refactor|periodic|schema|trigger|do|export|import|custom|systemdb|lock|atomic",
        r"|nodes\s*\.\s*(delete|link|collapse)",
        r"|cypher\s*\.\s*(doIt|runWrite|runSchema|runMany|runFile|runFiles|runSchemaFile|runSchemaFiles|parallel\d*))\b",
        r"|db\s*\.\s*(create|clearQueryCaches)",
        r"|db\s*\.\s*index\s*\.\s*(vector|fulltext)\s*\.\s*create",
        r")"
    ))
    .expect("valid regex")
});

/// Rejects statements that would modify the database when enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryGuard {
    read_only: bool,
}

impl QueryGuard {
    pub fn new(read_only: bool) -> Self {
        Self { read_only }
    }

    pub fn check(&self, statement: &str) -> QaResult<()> {
        if !self.read_only {
            return Ok(());
        }

        // Backticked names are kept for the procedure scan so that
        // CALL `apoc`.`cypher`.`doIt` is still recognised.
        let clauses = strip_literals_and_comments(statement, false);
        let procedures = strip_literals_and_comments(statement, true);
        let found = RE_WRITE_CLAUSE
            .find(&clauses)
            .or_else(|| RE_WRITE_PROCEDURE.find(&procedures));

        if let Some(found) = found {
            warn!("Refusing generated statement containing '{}'", found.as_str());
            return Err(QaError::Rejected {
                query: statement.to_string(),
                reason: format!(
                    "write operation '{}' is not allowed in read-only mode",
                    found.as_str().trim()
                ),
            });
        }
        Ok(())
    }
}

/// Blank out quoted strings and comments so keywords inside them are not
/// mistaken for clauses. Escaped identifiers are blanked too unless
/// `keep_identifiers` is set, in which case only the backticks go.
fn strip_literals_and_comments(statement: &str, keep_identifiers: bool) -> String {
    let mut out = String::with_capacity(statement.len());
    let mut chars = statement.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '`' if keep_identifiers => {
                for inner in chars.by_ref() {
                    if inner == '`' {
                        break;
                    }
                    out.push(inner);
                }
            }
            '\'' | '"' | '`' => {
                out.push(' ');
                let mut escaped = false;
                for inner in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if inner == '\\' {
                        escaped = true;
                    } else if inner == c {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for inner in chars.by_ref() {
                    if inner == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
                out.push(' ');
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_guard_allows_everything() {
        assert!(QueryGuard::default().check("MATCH (n) DETACH DELETE n").is_ok());
    }

    #[test]
    fn read_only_allows_reads() {
        let guard = QueryGuard::new(true);
        guard
            .check("MATCH (mgr:Manager)-[:LOCATED_AT]->(a:Address) WHERE a.city = 'San Francisco' RETURN mgr.managerName")
            .unwrap();
        guard
            .check("CALL db.index.fulltext.queryNodes(\"fullTextCompanyNames\", \"Palo Alto Networks\") YIELD node, score RETURN node")
            .unwrap();
    }

    #[test]
    fn read_only_rejects_writes() {
        let guard = QueryGuard::new(true);
        for statement in [
            "MATCH (n) DETACH DELETE n",
            "MERGE (p:Person {name: 'x'})",
            "match (n) set n.x = 1",
            "LOAD CSV FROM 'file:///x' AS row RETURN row",
            "CALL dbms.security.createUser('x', 'y', false)",
            "CALL apoc.cypher.doIt('MATCH (n) DETACH DELETE n', {}) YIELD value RETURN value",
            "CALL apoc.cypher.runWrite('CREATE (:X)', {}) YIELD value RETURN value",
            "CALL apoc.cypher.runSchema('CREATE INDEX FOR (n:X) ON (n.y)', {})",
            "CALL apoc.cypher.runMany('CREATE (:X);', {})",
            "CALL apoc.do.when(true, 'CREATE (:X)', '', {}) YIELD value RETURN value",
            "CALL apoc.periodic.iterate('MATCH (n) RETURN n', 'DELETE n', {})",
            "CALL `apoc`.`cypher`.`doIt`('MATCH (n) DELETE n', {}) YIELD value RETURN value",
            "CALL apoc . cypher . doIt('x', {}) YIELD value RETURN value",
        ] {
            let err = guard.check(statement).unwrap_err();
            assert!(matches!(err, QaError::Rejected { .. }), "{statement} was allowed");
        }
    }

    #[test]
    fn keywords_inside_literals_are_ignored() {
        let guard = QueryGuard::new(true);
        guard
            .check("MATCH (m:Movie) WHERE m.title = 'Set It Off' RETURN m.title // delete later")
            .unwrap();
        guard.check("MATCH (m:`Create`) RETURN m /* MERGE */").unwrap();
    }

    #[test]
    fn read_only_allows_read_procedures() {
        let guard = QueryGuard::new(true);
        guard
            .check("CALL apoc.cypher.run('MATCH (n) RETURN count(n) AS c', {}) YIELD value RETURN value")
            .unwrap();
        guard.check("CALL db.schema.nodeTypeProperties()").unwrap();
        guard.check("CALL apoc.meta.schema() YIELD value RETURN value").unwrap();
    }
}
