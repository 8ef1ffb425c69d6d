//! Cell content and storage

use once_cell::unsync::OnceCell;
use tallysheet_core::{CellAddress, CellValue, Result, ESCAPE_SIGN, FORMULA_SIGN};
use tallysheet_formula::{EvaluationContext, Formula, ParseOptions};

/// What a cell was set to
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellContent {
    /// Never set, or cleared
    #[default]
    Empty,
    /// Literal text, kept exactly as entered (including any escape sign)
    Text(String),
    /// Parsed formula
    Formula(Formula),
}

impl CellContent {
    /// Select the content variant for raw input text
    ///
    /// `""` is empty, `=` followed by at least one character is a formula,
    /// and anything else (the lone `=` included) is text.
    pub fn from_input(text: &str, options: &ParseOptions) -> Result<Self> {
        if text.is_empty() {
            return Ok(CellContent::Empty);
        }

        match text.strip_prefix(FORMULA_SIGN) {
            Some(expression) if !expression.is_empty() => {
                let formula = Formula::parse_with(expression, options)?;
                Ok(CellContent::Formula(formula))
            }
            _ => Ok(CellContent::Text(text.to_string())),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellContent::Empty)
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, CellContent::Formula(_))
    }

    /// Unevaluated text; formulas render canonically after the formula sign
    pub fn text(&self) -> String {
        match self {
            CellContent::Empty => String::new(),
            CellContent::Text(text) => text.clone(),
            CellContent::Formula(formula) => format!("{}{}", FORMULA_SIGN, formula),
        }
    }

    /// Cells the content reads (sorted, deduplicated)
    pub fn referenced_cells(&self) -> &[CellAddress] {
        match self {
            CellContent::Formula(formula) => formula.referenced_cells(),
            CellContent::Empty | CellContent::Text(_) => &[],
        }
    }

    /// Compute the value without consulting any cache
    pub fn resolve(&self, ctx: &dyn EvaluationContext) -> CellValue {
        match self {
            CellContent::Empty => CellValue::default(),
            CellContent::Text(text) => {
                CellValue::text(text.strip_prefix(ESCAPE_SIGN).unwrap_or(text))
            }
            CellContent::Formula(formula) => formula.evaluate(ctx).into(),
        }
    }
}

/// A stored cell: its content and at most one cached value
///
/// Outgoing references are not duplicated here; the dependency graph's
/// forward index holds them.
#[derive(Debug, Default)]
pub(crate) struct Cell {
    pub(crate) content: CellContent,
    pub(crate) cache: OnceCell<CellValue>,
}

impl Cell {
    pub(crate) fn is_cached(&self) -> bool {
        self.cache.get().is_some()
    }
}
