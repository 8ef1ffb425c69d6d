//! Formula Abstract Syntax Tree types
//!
//! The `Display` impl is the canonical rendering of an expression: no
//! whitespace, upper-case function names, and only the parentheses needed
//! for the text to parse back into the same tree.

use std::fmt;

use tallysheet_core::{CellAddress, CellRange};

use crate::functions::Function;

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Numeric literal
    Number(f64),

    /// Single cell reference
    CellRef(CellAddress),
    /// Range reference, only produced as a function argument
    RangeRef(CellRange),
    /// Reference that is well-formed but points outside the grid (e.g. `A0`, `ZZZZ1`)
    InvalidRef(String),

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },

    /// Built-in function call
    Function {
        func: Function,
        args: Vec<FormulaExpr>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Negate,
}

const UNARY_PRECEDENCE: u8 = 4;
const PRIMARY_PRECEDENCE: u8 = 5;

impl BinaryOperator {
    pub fn symbol(&self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
            BinaryOperator::Power => '^',
        }
    }

    /// Binding strength; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => 1,
            BinaryOperator::Multiply | BinaryOperator::Divide => 2,
            BinaryOperator::Power => 3,
        }
    }

    pub fn is_right_associative(&self) -> bool {
        matches!(self, BinaryOperator::Power)
    }
}

impl UnaryOperator {
    pub fn symbol(&self) -> char {
        match self {
            UnaryOperator::Plus => '+',
            UnaryOperator::Negate => '-',
        }
    }
}

impl FormulaExpr {
    fn precedence(&self) -> u8 {
        match self {
            FormulaExpr::BinaryOp { op, .. } => op.precedence(),
            FormulaExpr::UnaryOp { .. } => UNARY_PRECEDENCE,
            _ => PRIMARY_PRECEDENCE,
        }
    }

    /// Visit every cell the expression reads, in source order (duplicates included)
    pub fn for_each_reference(&self, visit: &mut impl FnMut(CellAddress)) {
        match self {
            FormulaExpr::Number(_) | FormulaExpr::InvalidRef(_) => {}
            FormulaExpr::CellRef(addr) => visit(*addr),
            FormulaExpr::RangeRef(range) => range.cells().for_each(|addr| visit(addr)),
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.for_each_reference(visit);
                right.for_each_reference(visit);
            }
            FormulaExpr::UnaryOp { operand, .. } => operand.for_each_reference(visit),
            FormulaExpr::Function { args, .. } => {
                for arg in args {
                    arg.for_each_reference(visit);
                }
            }
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for FormulaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaExpr::Number(n) => write!(f, "{}", n),
            FormulaExpr::CellRef(addr) => write!(f, "{}", addr),
            FormulaExpr::RangeRef(range) => write!(f, "{}", range),
            FormulaExpr::InvalidRef(text) => write!(f, "{}", text),
            FormulaExpr::BinaryOp { op, left, right } => {
                let precedence = op.precedence();
                // Equal precedence on the non-associating side must keep its
                // parentheses, otherwise the tree would re-parse differently.
                let (left_parens, right_parens) = if op.is_right_associative() {
                    (
                        left.precedence() <= precedence,
                        right.precedence() < precedence,
                    )
                } else {
                    (
                        left.precedence() < precedence,
                        right.precedence() <= precedence,
                    )
                };
                left.fmt_operand(f, left_parens)?;
                write!(f, "{}", op.symbol())?;
                right.fmt_operand(f, right_parens)
            }
            FormulaExpr::UnaryOp { op, operand } => {
                write!(f, "{}", op.symbol())?;
                operand.fmt_operand(f, operand.precedence() < UNARY_PRECEDENCE)
            }
            FormulaExpr::Function { func, args } => {
                write!(f, "{}(", func.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn num(n: f64) -> Box<FormulaExpr> {
        Box::new(FormulaExpr::Number(n))
    }

    fn binary(
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    ) -> Box<FormulaExpr> {
        Box::new(FormulaExpr::BinaryOp { op, left, right })
    }

    #[test]
    fn test_render_minimal_parentheses() {
        // (1+2)*3
        let expr = binary(
            BinaryOperator::Multiply,
            binary(BinaryOperator::Add, num(1.0), num(2.0)),
            num(3.0),
        );
        assert_eq!(expr.to_string(), "(1+2)*3");

        // 1+2*3
        let expr = binary(
            BinaryOperator::Add,
            num(1.0),
            binary(BinaryOperator::Multiply, num(2.0), num(3.0)),
        );
        assert_eq!(expr.to_string(), "1+2*3");

        // 1-(2-3) keeps its grouping, (1-2)-3 does not need one
        let expr = binary(
            BinaryOperator::Subtract,
            num(1.0),
            binary(BinaryOperator::Subtract, num(2.0), num(3.0)),
        );
        assert_eq!(expr.to_string(), "1-(2-3)");
        let expr = binary(
            BinaryOperator::Subtract,
            binary(BinaryOperator::Subtract, num(1.0), num(2.0)),
            num(3.0),
        );
        assert_eq!(expr.to_string(), "1-2-3");
    }

    #[test]
    fn test_render_power_is_right_associative() {
        let expr = binary(
            BinaryOperator::Power,
            num(2.0),
            binary(BinaryOperator::Power, num(3.0), num(2.0)),
        );
        assert_eq!(expr.to_string(), "2^3^2");

        let expr = binary(
            BinaryOperator::Power,
            binary(BinaryOperator::Power, num(2.0), num(3.0)),
            num(2.0),
        );
        assert_eq!(expr.to_string(), "(2^3)^2");
    }

    #[test]
    fn test_render_unary() {
        let expr = FormulaExpr::UnaryOp {
            op: UnaryOperator::Negate,
            operand: binary(BinaryOperator::Add, num(1.0), num(2.0)),
        };
        assert_eq!(expr.to_string(), "-(1+2)");

        let expr = FormulaExpr::UnaryOp {
            op: UnaryOperator::Plus,
            operand: Box::new(FormulaExpr::CellRef(CellAddress::new(0, 0))),
        };
        assert_eq!(expr.to_string(), "+A1");
    }

    #[test]
    fn test_render_function_and_references() {
        let expr = FormulaExpr::Function {
            func: Function::Sum,
            args: vec![
                FormulaExpr::RangeRef(CellRange::new(
                    CellAddress::new(1, 1),
                    CellAddress::new(0, 0),
                )),
                FormulaExpr::Number(2.5),
                FormulaExpr::InvalidRef("ZZZZ1".into()),
            ],
        };
        assert_eq!(expr.to_string(), "SUM(A1:B2,2.5,ZZZZ1)");
    }

    #[test]
    fn test_for_each_reference_expands_ranges() {
        let expr = FormulaExpr::Function {
            func: Function::Max,
            args: vec![
                FormulaExpr::CellRef(CellAddress::new(3, 0)),
                FormulaExpr::RangeRef(CellRange::new(
                    CellAddress::new(0, 0),
                    CellAddress::new(1, 0),
                )),
                FormulaExpr::InvalidRef("A0".into()),
            ],
        };
        let mut seen = Vec::new();
        expr.for_each_reference(&mut |addr| seen.push(addr.to_string()));
        assert_eq!(seen, vec!["A4", "A1", "A2"]);
    }
}
