//! Error types for duke-cells-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in duke-cells-core
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Address text does not match `[$]?[A-Z]+[$]?[0-9]+`
    #[error("Malformed cell address: {0}")]
    MalformedAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row number out of bounds
    #[error("Row number {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column number out of bounds
    #[error("Column number {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u32),

    /// Operation that makes no sense for the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Formula node attributes that cannot be interpreted
    #[error("Invalid formula: {0}")]
    InvalidFormula(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}
