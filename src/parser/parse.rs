//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: Parsing the program, functions and variable declarations
//! - `statements`: Parsing statements (if, while, for, etc.)
//! - `expressions`: Parsing expressions with precedence climbing
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state. The state that only makes
//! sense inside one function (the array table and the loop depth) lives on the
//! parser and is reset whenever a new function starts.

use crate::parser::arrays::ArrayTable;
use crate::parser::ast::*;
use crate::parser::lexer::{Keyword, LexError, Lexer, Token};
use std::fmt;

/// Fatal parse error. Every variant carries the line it was detected on.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The source could not be tokenized
    Lex { message: String, line: usize },
    /// Missing or unexpected token, malformed list, missing operand
    Syntax { message: String, line: usize },
    /// Literal array index outside `0..size`
    ArrayIndexOutOfBounds {
        name: String,
        index: i64,
        size: usize,
        line: usize,
    },
    /// `break` or `continue` with no enclosing loop
    LoopControlOutsideLoop { keyword: &'static str, line: usize },
}

impl ParseError {
    pub(crate) fn syntax(message: impl Into<String>, line: usize) -> Self {
        ParseError::Syntax {
            message: message.into(),
            line,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            ParseError::Lex { line, .. }
            | ParseError::Syntax { line, .. }
            | ParseError::ArrayIndexOutOfBounds { line, .. }
            | ParseError::LoopControlOutsideLoop { line, .. } => *line,
        }
    }

    /// The cause, without the `Error (line N)` prefix
    pub fn message(&self) -> String {
        match self {
            ParseError::Lex { message, .. } | ParseError::Syntax { message, .. } => {
                message.clone()
            }
            ParseError::ArrayIndexOutOfBounds {
                name, index, size, ..
            } => format!(
                "Array index {} out of bounds for '{}' with size {}",
                index, name, size
            ),
            ParseError::LoopControlOutsideLoop { keyword, .. } => {
                format!("'{}' not within a loop", keyword)
            }
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error (line {}): {}", self.line(), self.message())
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::Lex {
            message: err.message,
            line: err.location.line,
        }
    }
}

/// Recursive descent parser for the C subset
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    /// Arrays declared in the function being parsed
    pub(crate) arrays: ArrayTable,
    /// Number of enclosing `while`/`for` bodies
    pub(crate) loop_depth: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self::from_tokens(tokens))
    }

    /// Build a parser over an existing token stream. A missing trailing
    /// [`Token::Eof`] is supplied.
    pub fn from_tokens(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(Token::Eof(_))) {
            let loc = tokens.last().map(Token::location).unwrap_or_default();
            tokens.push(Token::Eof(loc));
        }
        Self {
            tokens,
            position: 0,
            arrays: ArrayTable::new(),
            loop_depth: 0,
        }
    }

    // ===== Helper methods =====

    /// Type keyword usable for a variable (`void` excluded)
    pub(crate) fn is_var_type_keyword(&self) -> bool {
        matches!(self.peek(), Token::Keyword(kw, _) if kw.is_type() && *kw != Keyword::Void)
    }

    pub(crate) fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek(), Token::Keyword(kw, _) if *kw == keyword)
    }

    pub(crate) fn match_keyword(&mut self, keyword: Keyword) -> bool {
        if self.check_keyword(keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check_operator(&self, spelling: &str) -> bool {
        matches!(self.peek(), Token::Operator(op, _) if *op == spelling)
    }

    pub(crate) fn match_operator(&mut self, spelling: &str) -> bool {
        if self.check_operator(spelling) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_token(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof(_))
    }

    pub(crate) fn peek(&self) -> &Token {
        // the stream always ends in Eof and `advance` never steps past it
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location()
    }

    pub(crate) fn current_line(&self) -> usize {
        self.peek().line()
    }

    pub(crate) fn expect_token(&mut self, token: &Token, message: &str) -> Result<(), ParseError> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::syntax(message, self.current_line()))
        }
    }

    pub(crate) fn expect_lparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LParen(self.current_location()),
            &format!("Expected '(' {ctx}"),
        )
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::RParen(self.current_location()),
            &format!("Expected ')' {ctx}"),
        )
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::LBrace(self.current_location()),
            &format!("Expected '{{' {ctx}"),
        )
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect_token(
            &Token::Semicolon(self.current_location()),
            &format!("Expected ';' {ctx}"),
        )
    }

    pub(crate) fn expect_identifier(&mut self, message: &str) -> Result<String, ParseError> {
        if let Token::Ident(name, _) = self.peek() {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(ParseError::syntax(message, self.current_line()))
        }
    }

    /// Skip tokens through the next `;`. Used to resynchronize after a
    /// construct the translator does not support.
    pub(crate) fn skip_past_semicolon(&mut self) {
        while !self.is_at_end() {
            if matches!(self.advance(), Token::Semicolon(_)) {
                return;
            }
        }
    }

    /// Skip tokens up to the next `;` (consumed) or `}` (left in place)
    pub(crate) fn skip_statement(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                Token::Semicolon(_) => {
                    self.advance();
                    return;
                }
                Token::RBrace(_) => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
