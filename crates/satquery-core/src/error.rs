use thiserror::Error;

use crate::discos::DiscosError;
use crate::spacetrack::SpaceTrackError;

/// Validation and contract errors exposed by `satquery-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("constraint '{name}' expects {expected}, got '{value}'")]
    ConstraintShape {
        name: String,
        expected: &'static str,
        value: String,
    },
    #[error("unknown constraint '{name}', expected one of {}", .options.join(", "))]
    UnknownConstraint {
        name: String,
        options: Vec<&'static str>,
    },
    #[error(
        "unknown sort attribute '{given}', available options include {}; \
         prefix the option with '-' to sort in descending order",
        .options.join(", ")
    )]
    UnknownSortKey {
        given: String,
        options: Vec<&'static str>,
    },

    #[error("invalid NORAD catalog number '{value}'")]
    InvalidNoradId { value: String },
    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("identifier list cannot be empty")]
    EmptyIdList,
    #[error("identifier file '{path}' could not be read: {message}")]
    IdFile { path: String, message: String },

    #[error("missing credential '{name}': set {env} or create {path}")]
    MissingCredential {
        name: &'static str,
        env: &'static str,
        path: String,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Top-level error type for the query entry points.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Discos(#[from] DiscosError),

    #[error(transparent)]
    SpaceTrack(#[from] SpaceTrackError),

    #[error("csv error: {0}")]
    Csv(#[from] csv_async::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("snapshot is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("one-to-one join violated: duplicate key {key} in the {side} table")]
    JoinCardinality { side: &'static str, key: String },

    #[error("no entries found, please reset the filter parameters")]
    EmptyResult,

    #[error("dataset download from {url} failed: {message}")]
    Download { url: String, message: String },
}
