//! Prelude module - common imports for tallysheet users
//!
//! ```rust
//! use tallysheet::prelude::*;
//! ```

pub use crate::{
    CacheStats, CellAddress, CellContent, CellValue, Error, FormulaErrorKind, Result, Sheet,
    SheetSettings,
};
