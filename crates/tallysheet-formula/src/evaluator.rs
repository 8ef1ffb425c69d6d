//! Formula evaluator
//!
//! Evaluates formula ASTs to a number or a [`FormulaErrorKind`]. Operands
//! are evaluated left to right and the first error encountered is the result.

use tallysheet_core::{CellAddress, CellValue, FormulaErrorKind};

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};

/// Outcome of evaluating an expression
pub type EvalResult = Result<f64, FormulaErrorKind>;

/// Cell lookup used while evaluating a formula
///
/// Implementors decide what a cell resolves to; a sheet routes this through
/// its value cache so every referenced cell is computed at most once.
pub trait EvaluationContext {
    /// Resolved value of the cell (never-set cells resolve to `0`)
    fn cell_value(&self, addr: CellAddress) -> CellValue;

    /// Whether the cell currently holds non-empty content
    fn has_content(&self, addr: CellAddress) -> bool;
}

/// Context in which every cell is empty
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyContext;

impl EvaluationContext for EmptyContext {
    fn cell_value(&self, addr: CellAddress) -> CellValue {
        if addr.is_valid() {
            CellValue::Number(0.0)
        } else {
            CellValue::Error(FormulaErrorKind::Ref)
        }
    }

    fn has_content(&self, _addr: CellAddress) -> bool {
        false
    }
}

/// Evaluate a formula expression
pub fn evaluate(expr: &FormulaExpr, ctx: &dyn EvaluationContext) -> EvalResult {
    match expr {
        FormulaExpr::Number(n) => Ok(*n),

        FormulaExpr::CellRef(addr) => ctx.cell_value(*addr).to_number(),
        FormulaExpr::InvalidRef(_) => Err(FormulaErrorKind::Ref),
        // Ranges only make sense as aggregate arguments
        FormulaExpr::RangeRef(_) => Err(FormulaErrorKind::Value),

        FormulaExpr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, ctx),
        FormulaExpr::UnaryOp { op, operand } => {
            let n = evaluate(operand, ctx)?;
            match op {
                UnaryOperator::Plus => Ok(n),
                UnaryOperator::Negate => Ok(-n),
            }
        }

        FormulaExpr::Function { func, args } => func.call(args, ctx),
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &FormulaExpr,
    right: &FormulaExpr,
    ctx: &dyn EvaluationContext,
) -> EvalResult {
    let l = evaluate(left, ctx)?;
    let r = evaluate(right, ctx)?;

    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => {
            if r == 0.0 {
                return Err(FormulaErrorKind::Div0);
            }
            l / r
        }
        BinaryOperator::Power => l.powf(r),
    };

    finite(result)
}

/// Map non-finite arithmetic results to `#ARITHM!`
pub(crate) fn finite(n: f64) -> EvalResult {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(FormulaErrorKind::Overflow)
    }
}
