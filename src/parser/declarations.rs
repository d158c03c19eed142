//! Declaration parsing implementation
//!
//! This module handles the program level and declarations:
//!
//! - Function definitions: `type name(params) { ... }`
//! - Local variable declarations: scalars and fixed-size arrays
//! - Brace-delimited array initializers
//!
//! Global variables are not supported; they are skipped with a warning.
//!
//! # Grammar
//!
//! ```text
//! program      ::= function_def*
//! function_def ::= type identifier "(" params ")" "{" statements "}"
//! params       ::= "void"? | type identifier ("," type identifier)*
//! var_decl     ::= type identifier ("[" number "]")? ("=" initializer)? ";"
//! initializer  ::= expression | "{" element ("," element)* "}"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::{Keyword, Token};
use crate::parser::parse::{ParseError, Parser};

fn ctype_of(keyword: Keyword) -> Option<CType> {
    match keyword {
        Keyword::Int => Some(CType::Int),
        Keyword::Float => Some(CType::Float),
        Keyword::Char => Some(CType::Char),
        Keyword::Double => Some(CType::Double),
        Keyword::Void => Some(CType::Void),
        _ => None,
    }
}

impl Parser {
    /// Parse the entire program (top-level declarations)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        while !self.is_at_end() {
            let Some(return_type) = self.peek_type() else {
                log::trace!("skipping top-level token {}", self.peek());
                self.advance();
                continue;
            };

            let name = match self.peek_ahead(1) {
                Some(Token::Ident(name, _)) => Some(name.clone()),
                _ => None,
            };
            let is_function = matches!(self.peek_ahead(2), Some(Token::LParen(_)));

            match name {
                Some(_) if is_function => {
                    self.advance(); // type
                    let func = self.parse_function(return_type)?;
                    log::debug!("parsed function '{}'", func.name);
                    program.functions.push(func);
                }
                Some(name) => {
                    log::warn!(
                        "Global variable declarations not yet supported (skipping '{}')",
                        name
                    );
                    self.skip_past_semicolon();
                }
                None => {
                    log::warn!("Expected identifier after type");
                    self.advance();
                }
            }
        }

        Ok(program)
    }

    /// Type keyword at the cursor, without consuming it
    pub(crate) fn peek_type(&self) -> Option<CType> {
        match self.peek() {
            Token::Keyword(kw, _) => ctype_of(*kw),
            _ => None,
        }
    }

    /// Parse a function definition; the return type has been consumed and
    /// the cursor is on the name.
    pub(crate) fn parse_function(&mut self, return_type: CType) -> Result<FunctionDecl, ParseError> {
        let location = self.current_location();
        let name = self.expect_identifier("Expected function name")?;

        // array sizes and loop nesting are per function
        self.arrays.clear();
        self.loop_depth = 0;

        self.expect_lparen("after function name")?;
        let params = self.parse_parameter_list()?;
        self.expect_rparen("after parameter list")?;
        self.expect_lbrace("to start function body")?;

        let body = self.parse_body("at end of function body")?;

        Ok(FunctionDecl {
            name,
            return_type,
            params,
            body,
            location,
        })
    }

    /// Parse `type name` pairs up to (not including) the closing `)`
    fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();

        if self.check(&Token::RParen(self.current_location())) {
            return Ok(params);
        }

        // `f(void)`
        if self.check_keyword(Keyword::Void)
            && matches!(self.peek_ahead(1), Some(Token::RParen(_)))
        {
            self.advance();
            return Ok(params);
        }

        loop {
            let param_type = match self.peek_type() {
                Some(ty) if ty != CType::Void => ty,
                _ => {
                    return Err(ParseError::syntax(
                        format!("Expected parameter type, found {}", self.peek()),
                        self.current_line(),
                    ))
                }
            };
            self.advance();
            let line = self.current_line();
            let name = self.expect_identifier("Expected parameter name")?;
            self.arrays
                .declare_scalar(&name)
                .map_err(|conflict| ParseError::syntax(conflict.to_string(), line))?;
            params.push(Param { name, param_type });

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        Ok(params)
    }

    /// Parse a local declaration starting at its type keyword, through the
    /// terminating `;`.
    pub(crate) fn parse_var_decl(&mut self) -> Result<VarDecl, ParseError> {
        let location = self.current_location();
        let var_type = match self.peek_type() {
            Some(ty) if ty != CType::Void => ty,
            _ => {
                return Err(ParseError::syntax(
                    "Expected variable type",
                    self.current_line(),
                ))
            }
        };
        self.advance();
        let line = self.current_line();
        let name = self.expect_identifier("Expected variable name after type")?;

        let mut array_size = None;
        if self.match_token(&Token::LBracket(self.current_location())) {
            let size = match self.peek() {
                Token::Number(text, _) => text.parse::<usize>().ok(),
                _ => None,
            };
            let Some(size) = size else {
                return Err(ParseError::syntax(
                    "Expected array size after '['",
                    self.current_line(),
                ));
            };
            self.advance();
            self.expect_token(
                &Token::RBracket(self.current_location()),
                "Expected ']' after array size",
            )?;
            self.arrays
                .declare(&name, size)
                .map_err(|conflict| ParseError::syntax(conflict.to_string(), line))?;
            array_size = Some(size);
        } else {
            self.arrays
                .declare_scalar(&name)
                .map_err(|conflict| ParseError::syntax(conflict.to_string(), line))?;
        }

        let init = if self.match_operator("=") {
            if array_size.is_some() {
                Some(Initializer::List(self.parse_initializer_list()?))
            } else {
                Some(Initializer::Expr(self.parse_expression()?))
            }
        } else {
            None
        };

        self.expect_semicolon("after variable declaration")?;

        Ok(VarDecl {
            name,
            var_type,
            array_size,
            init,
            location,
        })
    }

    /// `{ elem, elem, ... }` where each element is a (possibly negated)
    /// number, a character literal or an identifier
    fn parse_initializer_list(&mut self) -> Result<Vec<InitElement>, ParseError> {
        self.expect_lbrace("for array initializer")?;

        let mut elements = Vec::new();
        if self.match_token(&Token::RBrace(self.current_location())) {
            return Ok(elements);
        }

        loop {
            let negate = self.match_operator("-");
            let element = match self.peek() {
                Token::Number(text, _) if negate => InitElement::Number(format!("-{}", text)),
                Token::Number(text, _) => InitElement::Number(text.clone()),
                Token::CharLiteral(c, _) if !negate => InitElement::Char(*c),
                Token::Ident(name, _) if !negate => InitElement::Ident(name.clone()),
                other => {
                    return Err(ParseError::syntax(
                        format!("Expected number or identifier in array initializer, found {}", other),
                        self.current_line(),
                    ))
                }
            };
            self.advance();
            elements.push(element);

            if !self.match_token(&Token::Comma(self.current_location())) {
                break;
            }
        }

        self.expect_token(
            &Token::RBrace(self.current_location()),
            "Expected '}' after array initializer",
        )?;

        Ok(elements)
    }
}
