//! # tallysheet-formula
//!
//! Formula parser, renderer and evaluator for tallysheet.
//!
//! This crate provides:
//! - Formula parsing (text → AST)
//! - Canonical rendering (AST → text)
//! - Formula evaluation against a cell lookup ([`EvaluationContext`])
//! - Reference extraction for dependency tracking
//!
//! ## Example
//!
//! ```rust
//! use tallysheet_formula::{EmptyContext, Formula};
//!
//! let formula = Formula::parse("( 1 + 2 ) * A1").unwrap();
//! assert_eq!(formula.expression(), "(1+2)*A1");
//! assert_eq!(formula.evaluate(&EmptyContext), Ok(0.0));
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod functions;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, EmptyContext, EvalResult, EvaluationContext};
pub use formula::Formula;
pub use functions::Function;
pub use parser::{parse_formula, parse_formula_with, ParseOptions};
