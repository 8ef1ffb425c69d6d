//! # tallysheet
//!
//! The calculation core of a spreadsheet: what a cell holds, which cells it
//! reads, and when its cached value has to be thrown away.
//!
//! ## Features
//!
//! - Empty, text and formula cell content
//! - Formulas with `+ - * / ^`, parentheses, cell references and
//!   `SUM`/`MIN`/`MAX`/`AVERAGE` over ranges
//! - Circular references rejected before an edit is committed
//! - Lazy evaluation with per-cell caching and transitive invalidation
//! - Formula errors (`#REF!`, `#VALUE!`, `#DIV/0!`, `#ARITHM!`) as values
//!
//! ## Example
//!
//! ```rust
//! use tallysheet::prelude::*;
//!
//! let mut sheet = Sheet::new();
//! sheet.set_cell("A1", "0").unwrap();
//! sheet.set_cell("B1", "=5/A1").unwrap();
//! sheet.set_cell("C1", "=B1+1").unwrap();
//! assert_eq!(
//!     sheet.value("C1").unwrap(),
//!     CellValue::Error(FormulaErrorKind::Div0)
//! );
//!
//! // A1 -> B1 -> A1 is refused and leaves A1 as it was
//! assert!(sheet.set_cell("A1", "=B1").is_err());
//! assert_eq!(sheet.text("A1").unwrap(), "0");
//! ```

pub mod cache;
pub mod cell;
pub mod graph;
pub mod prelude;
pub mod settings;
pub mod sheet;

pub use cache::CacheStats;
pub use cell::CellContent;
pub use graph::DependencyGraph;
pub use settings::SheetSettings;
pub use sheet::Sheet;

// Re-export core types
pub use tallysheet_core::{
    CellAddress, CellRange, CellValue, Error, FormulaErrorKind, Result, Size, ESCAPE_SIGN,
    FORMULA_SIGN, MAX_COLS, MAX_ROWS,
};

// Re-export formula types
pub use tallysheet_formula::{
    EvaluationContext, Formula, FormulaError, FormulaExpr, Function, ParseOptions,
};
