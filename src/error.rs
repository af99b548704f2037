use thiserror::Error;

/// Failures a query can report back to its caller.
///
/// Loading the table is not covered here: a failed load is fatal and is
/// reported through `anyhow` by the loader.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A day/month/year (or country) argument is malformed or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested country or date column is not in the table.
    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, QueryError>;
