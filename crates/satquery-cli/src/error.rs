use satquery_core::{QueryError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Command(_) => 2,
            Self::Query(error) => match error {
                QueryError::Validation(_) => 2,
                QueryError::Io(_) | QueryError::Csv(_) => 10,
                _ => 3,
            },
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
