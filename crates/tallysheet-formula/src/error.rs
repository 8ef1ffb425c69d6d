//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while parsing a formula
///
/// Evaluation never fails with one of these: evaluation problems are
/// [`FormulaErrorKind`](tallysheet_core::FormulaErrorKind) values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Range covers more cells than the parse options allow
    #[error("Range {range} covers {cells} cells, more than the limit of {limit}")]
    RangeTooLarge { range: String, cells: u64, limit: u64 },
}

impl From<FormulaError> for tallysheet_core::Error {
    fn from(err: FormulaError) -> Self {
        tallysheet_core::Error::FormulaParse(err.to_string())
    }
}
