//! # tallysheet-core
//!
//! Core data structures for the tallysheet calculation engine.
//!
//! This crate provides the fundamental types used throughout tallysheet:
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`CellValue`] - The resolved value of a cell (number, text or formula error)
//! - [`FormulaErrorKind`] - The closed set of errors a formula can evaluate to
//! - [`Error`] - Edit-time failures (bad address, parse error, circular reference)
//!
//! ## Example
//!
//! ```rust
//! use tallysheet_core::{CellAddress, CellValue, FormulaErrorKind};
//!
//! let addr = CellAddress::parse("B3").unwrap();
//! assert_eq!((addr.row, addr.col), (2, 1));
//! assert_eq!(addr.to_string(), "B3");
//!
//! assert_eq!(CellValue::text("42").to_number(), Ok(42.0));
//! assert_eq!(CellValue::text("abc").to_number(), Err(FormulaErrorKind::Value));
//! ```

pub mod cell;
pub mod error;

pub use cell::{
    parse_numeric_literal, CellAddress, CellRange, CellValue, FormulaErrorKind, Size,
};
pub use error::{Error, Result};

/// Maximum number of rows in a sheet
pub const MAX_ROWS: u32 = 16_384;

/// Maximum number of columns in a sheet
pub const MAX_COLS: u16 = 16_384;

/// Leading character that turns cell input into a formula
pub const FORMULA_SIGN: char = '=';

/// Leading character that forces the rest of the input to be kept as literal text
pub const ESCAPE_SIGN: char = '\'';
