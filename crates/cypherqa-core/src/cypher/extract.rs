use once_cell::sync::Lazy;
use regex::Regex;

static RE_CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:[Cc]ypher|CYPHER)?[ \t]*\n?(.*?)```").expect("valid regex"));

// Leading comment lines are allowed before the first clause.
static RE_LEADING_CLAUSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:\s*//[^\n]*\n)*\s*(OPTIONAL\s+MATCH|MATCH|CREATE|MERGE|CALL|UNWIND|WITH|RETURN|LOAD\s+CSV|USE|EXPLAIN|PROFILE|SHOW|DROP|DETACH\s+DELETE|DELETE|FOREACH)\b",
    )
    .expect("valid regex")
});

/// Return the body of the first Markdown code fence in `content`, or the
/// trimmed content when there is no fence.
pub fn strip_code_fence(content: &str) -> String {
    RE_CODE_FENCE
        .captures(content)
        .and_then(|captures| captures.get(1))
        .map(|body| body.as_str().trim().to_string())
        .unwrap_or_else(|| content.trim().to_string())
}

/// A statement must open with a Cypher clause. Prose that merely mentions
/// a keyword ("I cannot match that") does not count.
pub fn is_valid_cypher(query: &str) -> bool {
    RE_LEADING_CLAUSE.is_match(query)
}
