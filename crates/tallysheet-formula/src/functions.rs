//! Built-in functions
//!
//! Every built-in is an aggregate over its arguments. Scalar arguments are
//! coerced like any other operand; range arguments skip cells that have no
//! content, so a partly filled column aggregates only what is there.

use tallysheet_core::FormulaErrorKind;

use crate::ast::FormulaExpr;
use crate::evaluator::{evaluate, finite, EvalResult, EvaluationContext};

/// Built-in function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Sum,
    Min,
    Max,
    Average,
}

impl Function {
    /// Look up a function by (case-insensitive) name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "SUM" => Some(Function::Sum),
            "MIN" => Some(Function::Min),
            "MAX" => Some(Function::Max),
            "AVERAGE" => Some(Function::Average),
            _ => None,
        }
    }

    /// Canonical (upper-case) name
    pub fn name(&self) -> &'static str {
        match self {
            Function::Sum => "SUM",
            Function::Min => "MIN",
            Function::Max => "MAX",
            Function::Average => "AVERAGE",
        }
    }

    /// Minimum number of arguments
    pub fn min_args(&self) -> usize {
        1
    }

    /// Evaluate the function over already-parsed arguments
    pub fn call(&self, args: &[FormulaExpr], ctx: &dyn EvaluationContext) -> EvalResult {
        let values = collect_numbers(args, ctx)?;

        let result = match self {
            Function::Sum => values.iter().sum(),
            Function::Min => values.iter().copied().reduce(f64::min).unwrap_or(0.0),
            Function::Max => values.iter().copied().reduce(f64::max).unwrap_or(0.0),
            Function::Average => {
                if values.is_empty() {
                    return Err(FormulaErrorKind::Div0);
                }
                values.iter().sum::<f64>() / values.len() as f64
            }
        };

        finite(result)
    }
}

/// Flatten arguments into numbers, stopping at the first error
fn collect_numbers(
    args: &[FormulaExpr],
    ctx: &dyn EvaluationContext,
) -> Result<Vec<f64>, FormulaErrorKind> {
    let mut values = Vec::with_capacity(args.len());

    for arg in args {
        match arg {
            FormulaExpr::RangeRef(range) => {
                for addr in range.cells() {
                    if ctx.has_content(addr) {
                        values.push(ctx.cell_value(addr).to_number()?);
                    }
                }
            }
            other => values.push(evaluate(other, ctx)?),
        }
    }

    Ok(values)
}
