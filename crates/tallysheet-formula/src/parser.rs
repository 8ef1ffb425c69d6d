//! Formula parser
//!
//! A recursive descent parser for formula expressions with proper operator
//! precedence. The input is the expression alone, without the leading `=`
//! that marks a cell as a formula.

use tallysheet_core::{CellAddress, CellRange};

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::Function;

/// Limits applied while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Largest number of cells a single range may cover
    pub max_range_cells: u64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_range_cells: 65_536,
        }
    }
}

/// Parse a formula expression into an AST
///
/// # Example
/// ```rust
/// use tallysheet_formula::parse_formula;
///
/// let ast = parse_formula("1+2").unwrap();
/// let ast = parse_formula("SUM(A1:A10)*2").unwrap();
/// assert!(parse_formula("1+").is_err());
/// ```
pub fn parse_formula(expression: &str) -> FormulaResult<FormulaExpr> {
    parse_formula_with(expression, &ParseOptions::default())
}

/// Parse a formula expression with explicit limits
pub fn parse_formula_with(
    expression: &str,
    options: &ParseOptions,
) -> FormulaResult<FormulaExpr> {
    let mut parser = FormulaParser::new(expression, options)?;
    let expr = parser.parse_expression()?;

    if !matches!(parser.current_token(), Token::Eof) {
        return Err(FormulaError::Parse(format!(
            "Unexpected {} after expression",
            parser.current_token().describe()
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    CellRef(String),    // Cell reference like A1, $A$1
    Identifier(String), // Function name

    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Colon,
    Comma,

    LeftParen,
    RightParen,

    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::CellRef(s) => format!("reference '{}'", s),
            Token::Identifier(s) => format!("name '{}'", s),
            Token::Plus => "'+'".into(),
            Token::Minus => "'-'".into(),
            Token::Star => "'*'".into(),
            Token::Slash => "'/'".into(),
            Token::Caret => "'^'".into(),
            Token::Colon => "':'".into(),
            Token::Comma => "','".into(),
            Token::LeftParen => "'('".into(),
            Token::RightParen => "')'".into(),
            Token::Eof => "end of formula".into(),
        }
    }
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Token,
    options: &'a ParseOptions,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str, options: &'a ParseOptions) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: Token::Eof,
            options,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.current_token = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        let Some(c) = self.peek_char() else {
            return Ok(Token::Eof);
        };

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '^' => Some(Token::Caret),
            ':' => Some(Token::Colon),
            ',' => Some(Token::Comma),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).is_some_and(|c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            return Ok(self.scan_identifier_or_ref());
        }

        Err(FormulaError::Parse(format!(
            "Unexpected character '{}' at offset {}",
            c, self.pos
        )))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        self.skip_digits();
        if self.peek_char() == Some('.') {
            self.advance();
            self.skip_digits();
        }

        if self.peek_char().is_some_and(|c| c == 'e' || c == 'E') {
            self.advance();
            if self.peek_char().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            let exponent_start = self.pos;
            self.skip_digits();
            if self.pos == exponent_start {
                return Err(FormulaError::Parse(format!(
                    "Malformed number '{}'",
                    &self.input[start..self.pos]
                )));
            }
        }

        let num_str = &self.input[start..self.pos];
        match num_str.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Token::Number(n)),
            _ => Err(FormulaError::Parse(format!("Malformed number '{}'", num_str))),
        }
    }

    fn scan_identifier_or_ref(&mut self) -> Token {
        let start = self.pos;

        while self
            .peek_char()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        {
            self.advance();
        }

        let text = &self.input[start..self.pos];

        // Letters followed by digits is a reference, unless it is called like a function
        if Self::is_cell_reference(text) && self.peek_char() != Some('(') {
            return Token::CellRef(text.to_string());
        }

        Token::Identifier(text.to_string())
    }

    fn is_cell_reference(text: &str) -> bool {
        // [$]letters[$]digits
        let bytes = text.as_bytes();
        let mut i = 0;

        if bytes.get(i) == Some(&b'$') {
            i += 1;
        }

        let letter_start = i;
        while i < bytes.len() && bytes[i].is_ascii_alphabetic() {
            i += 1;
        }
        if i == letter_start {
            return false;
        }

        if bytes.get(i) == Some(&b'$') {
            i += 1;
        }

        let digit_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == digit_start {
            return false;
        }

        i == bytes.len()
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn skip_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        &self.current_token
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {}, got {}",
                expected.describe(),
                self.current_token().describe()
            )))
        }
    }

    // === Expression parsing with precedence ===
    // Precedence (lowest to highest):
    // 1. Addition/Subtraction: +, -
    // 2. Multiplication/Division: *, /
    // 3. Exponentiation: ^ (right associative)
    // 4. Unary: +, -
    // 5. Primary: numbers, references, function calls, parentheses

    fn parse_expression(&mut self) -> FormulaResult<FormulaExpr> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_multiplicative()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<FormulaExpr> {
        let mut left = self.parse_exponent()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume()?;
            let right = self.parse_exponent()?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_exponent(&mut self) -> FormulaResult<FormulaExpr> {
        let left = self.parse_unary()?;

        if matches!(self.current_token(), Token::Caret) {
            self.consume()?;
            let right = self.parse_exponent()?; // Right associative
            return Ok(FormulaExpr::BinaryOp {
                op: BinaryOperator::Power,
                left: Box::new(left),
                right: Box::new(right),
            });
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> FormulaResult<FormulaExpr> {
        let op = match self.current_token() {
            Token::Minus => UnaryOperator::Negate,
            Token::Plus => UnaryOperator::Plus,
            _ => return self.parse_primary(),
        };

        self.consume()?;
        let operand = self.parse_unary()?;
        Ok(FormulaExpr::UnaryOp {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_primary(&mut self) -> FormulaResult<FormulaExpr> {
        match self.consume()? {
            Token::Number(n) => Ok(FormulaExpr::Number(n)),

            Token::LeftParen => {
                let expr = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                Ok(expr)
            }

            Token::CellRef(ref_str) => Ok(Self::cell_reference(&ref_str)),

            Token::Identifier(name) => {
                if matches!(self.current_token(), Token::LeftParen) {
                    self.parse_function_call(name)
                } else {
                    Err(FormulaError::Parse(format!("Unknown name '{}'", name)))
                }
            }

            other => Err(FormulaError::Parse(format!(
                "Unexpected {}",
                other.describe()
            ))),
        }
    }

    fn parse_function_call(&mut self, name: String) -> FormulaResult<FormulaExpr> {
        let func =
            Function::from_name(&name).ok_or_else(|| FormulaError::UnknownFunction(name.clone()))?;

        self.expect(&Token::LeftParen)?;

        let mut args = Vec::new();
        if !matches!(self.current_token(), Token::RightParen) {
            args.push(self.parse_argument()?);

            while matches!(self.current_token(), Token::Comma) {
                self.consume()?;
                args.push(self.parse_argument()?);
            }
        }

        self.expect(&Token::RightParen)?;

        if args.len() < func.min_args() {
            return Err(FormulaError::ArgumentCount {
                function: func.name().to_string(),
                expected: format!("at least {}", func.min_args()),
                actual: args.len(),
            });
        }

        Ok(FormulaExpr::Function { func, args })
    }

    /// A function argument: an expression, or a `ref:ref` range
    fn parse_argument(&mut self) -> FormulaResult<FormulaExpr> {
        let expr = self.parse_expression()?;

        if !matches!(self.current_token(), Token::Colon) {
            return Ok(expr);
        }
        self.consume()?;

        let end = match self.consume()? {
            Token::CellRef(ref_str) => Self::cell_reference(&ref_str),
            other => {
                return Err(FormulaError::Parse(format!(
                    "Expected reference after ':', got {}",
                    other.describe()
                )))
            }
        };

        match (expr, end) {
            (FormulaExpr::CellRef(start), FormulaExpr::CellRef(end)) => {
                let range = CellRange::new(start, end);
                if range.cell_count() > self.options.max_range_cells {
                    return Err(FormulaError::RangeTooLarge {
                        range: range.to_string(),
                        cells: range.cell_count(),
                        limit: self.options.max_range_cells,
                    });
                }
                Ok(FormulaExpr::RangeRef(range))
            }
            (start @ (FormulaExpr::CellRef(_) | FormulaExpr::InvalidRef(_)), end) => {
                Ok(FormulaExpr::InvalidRef(format!("{}:{}", start, end)))
            }
            _ => Err(FormulaError::Parse(
                "Range must start with a cell reference".into(),
            )),
        }
    }

    /// Resolve reference text; references outside the grid evaluate to #REF!
    fn cell_reference(ref_str: &str) -> FormulaExpr {
        match CellAddress::parse(ref_str) {
            Ok(addr) => FormulaExpr::CellRef(addr),
            Err(_) => FormulaExpr::InvalidRef(ref_str.replace('$', "").to_ascii_uppercase()),
        }
    }
}
