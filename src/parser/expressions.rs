//! Expression parsing implementation
//!
//! Binary operators are parsed with precedence climbing; operators are left
//! associative. Unary `-`, `!` and `~` bind tighter than any binary operator.
//!
//! # Grammar
//!
//! ```text
//! expression ::= primary (binop primary)*
//! primary    ::= ("-" | "!" | "~") primary
//!              | "(" expression ")"
//!              | identifier "(" (expression ("," expression)*)? ")"
//!              | identifier "[" expression "]"
//!              | identifier | number | char
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::Token;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse an expression at the lowest precedence, so every binary
    /// operator can be consumed
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_expression_prec(LOWEST_PRECEDENCE)
    }

    /// Precedence climbing: consume operators binding at least as tightly as
    /// `min_prec`
    pub(crate) fn parse_expression_prec(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_primary()?;

        loop {
            let (op, prec) = match self.peek() {
                Token::Operator(spelling, _) => match BinOp::from_spelling(spelling) {
                    Some(op) => (op, op.precedence()),
                    None => break,
                },
                _ => break,
            };
            if prec < min_prec {
                break;
            }
            self.advance();

            if !self.starts_operand() {
                return Err(ParseError::syntax(
                    format!("Expected right operand after operator '{}'", op.spelling()),
                    self.current_line(),
                ));
            }
            let right = self.parse_expression_prec(prec + 1)?;
            left = Expr::binary(op, left, right);
        }

        Ok(left)
    }

    fn starts_operand(&self) -> bool {
        match self.peek() {
            Token::Number(..) | Token::CharLiteral(..) | Token::Ident(..) | Token::LParen(_) => true,
            Token::Operator(op, _) => matches!(*op, "-" | "!" | "~"),
            _ => false,
        }
    }

    /// Parse primary expressions
    pub(crate) fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        if self.match_operator("!") {
            return Ok(Expr::unary(UnOp::Not, self.parse_primary()?));
        }
        if self.match_operator("~") {
            return Ok(Expr::unary(UnOp::BitNot, self.parse_primary()?));
        }
        if self.match_operator("-") {
            return Ok(Expr::unary(UnOp::Neg, self.parse_primary()?));
        }

        let loc = self.current_location();
        match self.peek().clone() {
            Token::LParen(_) => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect_rparen("after expression")?;
                Ok(expr)
            }
            Token::Number(text, _) => {
                self.advance();
                Ok(Expr::Number(text))
            }
            Token::CharLiteral(c, _) => {
                self.advance();
                Ok(Expr::Number(u32::from(c).to_string()))
            }
            Token::Ident(name, _) => {
                self.advance();
                if self.check(&Token::LParen(loc)) {
                    self.parse_call(name, loc)
                } else if self.check(&Token::LBracket(loc)) {
                    Ok(Expr::Index(self.parse_array_access(name)?))
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            other => Err(ParseError::syntax(
                format!("Expected expression, found {}", other),
                loc.line,
            )),
        }
    }

    /// Arguments of a call; the cursor is on the `(`
    fn parse_call(&mut self, name: String, location: SourceLocation) -> Result<Expr, ParseError> {
        self.advance(); // '('
        let mut args = Vec::new();

        if !self.check(&Token::RParen(location)) {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(&Token::Comma(location)) {
                    break;
                }
            }
        }

        self.expect_token(
            &Token::RParen(location),
            &format!("Expected ')' after function call arguments for '{}'", name),
        )?;

        Ok(Expr::Call(Call {
            name,
            args,
            instance: None,
            location,
        }))
    }

    /// `base[index]`; the cursor is on the `[`.
    ///
    /// The raw index text is captured first, tracking nested parentheses and
    /// brackets to find the matching `]`. A literal index (optionally negated)
    /// is checked against the declared size before the index is parsed.
    pub(crate) fn parse_array_access(&mut self, base: String) -> Result<ArrayAccess, ParseError> {
        let line = self.current_line();
        self.advance(); // '['

        let index_tokens = self.scan_index_tokens()?;
        if index_tokens.is_empty() {
            return Err(ParseError::syntax(
                format!("Expected array index for '{}'", base),
                line,
            ));
        }
        let index_text: String = index_tokens.iter().map(Token::lexeme).collect();

        let literal = match index_tokens.as_slice() {
            [Token::Number(n, _)] => n.parse::<i64>().ok(),
            [Token::Operator("-", _), Token::Number(n, _)] => n.parse::<i64>().ok().map(|v| -v),
            _ => None,
        };
        if let Some(index) = literal {
            if !self.arrays.in_bounds(&base, index) {
                return Err(ParseError::ArrayIndexOutOfBounds {
                    size: self.arrays.size_of(&base).unwrap_or(0),
                    name: base,
                    index,
                    line,
                });
            }
        }

        let index = self.parse_expression()?;
        self.expect_token(
            &Token::RBracket(self.current_location()),
            "Expected ']' after array index",
        )?;

        Ok(ArrayAccess {
            base,
            index: Box::new(index),
            index_text,
        })
    }

    /// Tokens between the cursor and the matching `]`, without consuming them
    fn scan_index_tokens(&self) -> Result<Vec<Token>, ParseError> {
        let mut depth = 0usize;
        let mut tokens = Vec::new();

        for token in &self.tokens[self.position..] {
            match token {
                Token::LParen(_) | Token::LBracket(_) => depth += 1,
                Token::RBracket(_) if depth == 0 => return Ok(tokens),
                Token::RParen(_) | Token::RBracket(_) => depth = depth.saturating_sub(1),
                Token::Semicolon(_) | Token::Eof(_) => break,
                _ => {}
            }
            tokens.push(token.clone());
        }

        Err(ParseError::syntax(
            "Expected ']' after array index",
            self.current_line(),
        ))
    }
}
