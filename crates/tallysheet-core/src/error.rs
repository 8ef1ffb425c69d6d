//! Error types for tallysheet-core

use thiserror::Error;

use crate::cell::CellAddress;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported synchronously by edits.
///
/// None of these leave a sheet in a modified state: an edit that fails
/// is rejected before anything is committed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Address outside the sheet limits
    #[error("Cell {address} is outside the sheet ({max_rows} rows x {max_cols} columns)")]
    OutOfBounds {
        address: String,
        max_rows: u32,
        max_cols: u16,
    },

    /// Formula text could not be parsed
    #[error("Formula parse error: {0}")]
    FormulaParse(String),

    /// The edit would make the reference graph cyclic
    #[error("Circular reference detected involving cell {cell}: {}", format_path(.path))]
    CircularReference {
        cell: CellAddress,
        path: Vec<CellAddress>,
    },
}

fn format_path(path: &[CellAddress]) -> String {
    path.iter()
        .map(|addr| addr.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_reference_message() {
        let a1 = CellAddress::new(0, 0);
        let b1 = CellAddress::new(0, 1);
        let err = Error::CircularReference {
            cell: a1,
            path: vec![a1, b1, a1],
        };
        assert_eq!(
            err.to_string(),
            "Circular reference detected involving cell A1: A1 -> B1 -> A1"
        );
    }

    #[test]
    fn test_out_of_bounds_message() {
        let err = Error::OutOfBounds {
            address: "A20000".into(),
            max_rows: 16_384,
            max_cols: 16_384,
        };
        assert!(err.to_string().contains("A20000"));
    }
}
