//! Cell value types

use std::fmt;

use crate::ESCAPE_SIGN;

/// The resolved value of a cell
///
/// Formula errors are ordinary values: a cell that divides by zero resolves
/// to `Error(Div0)` and any formula reading it inherits that error.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// Numeric value
    Number(f64),

    /// Text value
    Text(String),

    /// Error value (#REF!, #VALUE!, ...)
    Error(FormulaErrorKind),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        CellValue::Text(s.into())
    }

    /// Coerce the value into a formula operand.
    ///
    /// Numbers pass through, errors propagate unchanged, and text becomes a
    /// number only if, after dropping one leading escape sign, it is a valid
    /// numeric literal. Anything else is `#VALUE!`.
    pub fn to_number(&self) -> Result<f64, FormulaErrorKind> {
        match self {
            CellValue::Number(n) => Ok(*n),
            CellValue::Text(s) => {
                let s = s.strip_prefix(ESCAPE_SIGN).unwrap_or(s);
                parse_numeric_literal(s).ok_or(FormulaErrorKind::Value)
            }
            CellValue::Error(e) => Err(*e),
        }
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Number(0.0)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

impl From<Result<f64, FormulaErrorKind>> for CellValue {
    fn from(result: Result<f64, FormulaErrorKind>) -> Self {
        result.map_or_else(CellValue::Error, CellValue::Number)
    }
}

/// Errors a formula can evaluate to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormulaErrorKind {
    /// #REF! - Reference to a cell outside the sheet
    Ref,
    /// #VALUE! - Operand cannot be coerced to a number
    Value,
    /// #DIV/0! - Division by zero
    Div0,
    /// #ARITHM! - Result is not a finite number
    Overflow,
}

impl FormulaErrorKind {
    /// Get the display string for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            FormulaErrorKind::Ref => "#REF!",
            FormulaErrorKind::Value => "#VALUE!",
            FormulaErrorKind::Div0 => "#DIV/0!",
            FormulaErrorKind::Overflow => "#ARITHM!",
        }
    }
}

impl fmt::Display for FormulaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse a numeric literal: `[+-]digits[.digits][(e|E)[+-]digits]`.
///
/// No surrounding whitespace, no `inf`/`nan`, and the result must be finite.
pub fn parse_numeric_literal(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut pos = 0;

    let skip_digits = |pos: &mut usize| {
        let start = *pos;
        while bytes.get(*pos).is_some_and(|b| b.is_ascii_digit()) {
            *pos += 1;
        }
        *pos - start
    };

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        pos += 1;
    }

    let int_digits = skip_digits(&mut pos);
    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        frac_digits = skip_digits(&mut pos);
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(pos), Some(b'e') | Some(b'E')) {
        pos += 1;
        if matches!(bytes.get(pos), Some(b'+') | Some(b'-')) {
            pos += 1;
        }
        if skip_digits(&mut pos) == 0 {
            return None;
        }
    }

    if pos != bytes.len() {
        return None;
    }

    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_numeric_literal_grammar() {
        assert_eq!(parse_numeric_literal("42"), Some(42.0));
        assert_eq!(parse_numeric_literal("-3.5"), Some(-3.5));
        assert_eq!(parse_numeric_literal("+.5"), Some(0.5));
        assert_eq!(parse_numeric_literal("5."), Some(5.0));
        assert_eq!(parse_numeric_literal("1e3"), Some(1000.0));
        assert_eq!(parse_numeric_literal("2.5E-1"), Some(0.25));

        assert_eq!(parse_numeric_literal(""), None);
        assert_eq!(parse_numeric_literal("."), None);
        assert_eq!(parse_numeric_literal("-"), None);
        assert_eq!(parse_numeric_literal(" 1"), None);
        assert_eq!(parse_numeric_literal("1 "), None);
        assert_eq!(parse_numeric_literal("1e"), None);
        assert_eq!(parse_numeric_literal("0x10"), None);
        assert_eq!(parse_numeric_literal("inf"), None);
        assert_eq!(parse_numeric_literal("NaN"), None);
        assert_eq!(parse_numeric_literal("1e999"), None);
    }

    #[test]
    fn test_coercion() {
        assert_eq!(CellValue::Number(1.5).to_number(), Ok(1.5));
        assert_eq!(CellValue::text("12").to_number(), Ok(12.0));
        assert_eq!(CellValue::text("'12").to_number(), Ok(12.0));
        assert_eq!(
            CellValue::text("''12").to_number(),
            Err(FormulaErrorKind::Value)
        );
        assert_eq!(
            CellValue::text("twelve").to_number(),
            Err(FormulaErrorKind::Value)
        );
        assert_eq!(CellValue::text("").to_number(), Err(FormulaErrorKind::Value));
        assert_eq!(
            CellValue::Error(FormulaErrorKind::Div0).to_number(),
            Err(FormulaErrorKind::Div0)
        );
        assert_eq!(CellValue::default().to_number(), Ok(0.0));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(FormulaErrorKind::Ref.to_string(), "#REF!");
        assert_eq!(FormulaErrorKind::Value.to_string(), "#VALUE!");
        assert_eq!(FormulaErrorKind::Div0.to_string(), "#DIV/0!");
        assert_eq!(FormulaErrorKind::Overflow.to_string(), "#ARITHM!");
    }

    #[test]
    fn test_value_display() {
        assert_eq!(CellValue::Number(12.0).to_string(), "12");
        assert_eq!(CellValue::Number(0.25).to_string(), "0.25");
        assert_eq!(CellValue::text("hi").to_string(), "hi");
        assert_eq!(
            CellValue::from(Err::<f64, _>(FormulaErrorKind::Div0)),
            CellValue::Error(FormulaErrorKind::Div0)
        );
        assert_eq!(CellValue::from(Ok::<_, FormulaErrorKind>(2.5)), CellValue::Number(2.5));
        assert_eq!(CellValue::Error(FormulaErrorKind::Ref).to_string(), "#REF!");
    }
}
