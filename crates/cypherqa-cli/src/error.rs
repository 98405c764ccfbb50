use cypherqa_core::cypher::QaFailure;
use cypherqa_core::QaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("connection error: {0}")]
    Connection(String),
    #[error("translation error: {0}")]
    Translation(String),
    #[error("execution error: {0}")]
    Execution(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Validation(_) => 10,
            CliError::Connection(_) => 11,
            CliError::Translation(_) => 12,
            CliError::Execution(_) => 13,
        }
    }
}

impl From<QaError> for CliError {
    fn from(err: QaError) -> Self {
        let message = err.to_string();
        match err {
            QaError::Connection(_) => CliError::Connection(message),
            QaError::Translation(_) => CliError::Translation(message),
            QaError::Execution { .. } | QaError::Rejected { .. } => CliError::Execution(message),
            QaError::Config(_) => CliError::Config(message),
            QaError::InvalidQuestion(_) => CliError::Validation(message),
        }
    }
}

impl From<QaFailure> for CliError {
    fn from(failure: QaFailure) -> Self {
        failure.error.into()
    }
}

fn qa_exit_code(err: &QaError) -> i32 {
    match err {
        QaError::Config(_) | QaError::InvalidQuestion(_) => 10,
        QaError::Connection(_) => 11,
        QaError::Translation(_) => 12,
        QaError::Execution { .. } | QaError::Rejected { .. } => 13,
    }
}

/// Process exit code for an error returned by [`crate::cli::run`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(cli_error) = err.downcast_ref::<CliError>() {
        cli_error.exit_code()
    } else if let Some(qa_error) = err.downcast_ref::<QaError>() {
        qa_exit_code(qa_error)
    } else if let Some(failure) = err.downcast_ref::<QaFailure>() {
        qa_exit_code(&failure.error)
    } else {
        1
    }
}
