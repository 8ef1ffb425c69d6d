//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - A rectangular block of cells (e.g., "A1:B10")
//! - [`CellValue`] - The resolved value of a cell

mod address;
mod value;

pub use address::{CellAddress, CellRange, Size};
pub use value::{parse_numeric_literal, CellValue, FormulaErrorKind};
