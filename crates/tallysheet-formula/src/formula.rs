//! Parsed formula handle

use std::fmt;

use tallysheet_core::CellAddress;

use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::{evaluate, EvalResult, EvaluationContext};
use crate::parser::{parse_formula_with, ParseOptions};

/// A structurally valid formula together with the cells it reads
///
/// The reference list is computed once at parse time: sorted, deduplicated,
/// and limited to addresses inside the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    expr: FormulaExpr,
    referenced: Vec<CellAddress>,
}

impl Formula {
    /// Parse an expression (without the leading `=`) using default limits
    pub fn parse(expression: &str) -> FormulaResult<Self> {
        Self::parse_with(expression, &ParseOptions::default())
    }

    /// Parse an expression with explicit limits
    pub fn parse_with(expression: &str, options: &ParseOptions) -> FormulaResult<Self> {
        let expr = parse_formula_with(expression, options)?;
        Ok(Self::from_expr(expr))
    }

    /// Wrap an already-built expression
    pub fn from_expr(expr: FormulaExpr) -> Self {
        let mut referenced = Vec::new();
        expr.for_each_reference(&mut |addr| referenced.push(addr));
        referenced.sort_unstable();
        referenced.dedup();

        Self { expr, referenced }
    }

    /// Evaluate against a cell lookup
    pub fn evaluate(&self, ctx: &dyn EvaluationContext) -> EvalResult {
        evaluate(&self.expr, ctx)
    }

    /// Canonical rendering of the expression
    pub fn expression(&self) -> String {
        self.expr.to_string()
    }

    /// Cells read by the formula, in row-major order
    pub fn referenced_cells(&self) -> &[CellAddress] {
        &self.referenced
    }

    pub fn ast(&self) -> &FormulaExpr {
        &self.expr
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)
    }
}
