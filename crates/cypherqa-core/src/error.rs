use thiserror::Error;

/// Errors raised by the question answering pipeline.
///
/// The first three variants map one-to-one onto the pipeline stages that can
/// fail: reaching the database, translating the question, and running the
/// generated statement.
#[derive(Debug, Error)]
pub enum QaError {
    /// The graph database could not be reached or introspected
    #[error("connection error: {0}")]
    Connection(String),

    /// The completion service failed or produced no usable output
    #[error("translation error: {0}")]
    Translation(String),

    /// The database rejected the generated statement
    #[error("execution error: {message} (query: {query})")]
    Execution { query: String, message: String },

    /// The query guard refused to run the generated statement
    #[error("query rejected: {reason} (query: {query})")]
    Rejected { query: String, reason: String },

    /// Missing or malformed configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// The question itself is unusable
    #[error("invalid question: {0}")]
    InvalidQuestion(String),
}

impl QaError {
    /// The generated statement attached to this error, if any.
    pub fn query(&self) -> Option<&str> {
        match self {
            QaError::Execution { query, .. } | QaError::Rejected { query, .. } => Some(query),
            _ => None,
        }
    }

    pub fn connection(err: impl std::fmt::Display) -> Self {
        QaError::Connection(err.to_string())
    }

    pub fn translation(err: impl std::fmt::Display) -> Self {
        QaError::Translation(err.to_string())
    }
}

pub type QaResult<T> = std::result::Result<T, QaError>;
