//! Statement parsing implementation
//!
//! This module handles parsing of the statement forms of the C subset:
//!
//! - Variable declarations: `int x = 42;`, `int a[4] = {1, 2};`
//! - Assignments: `x = e;`, `a[i] = e;`
//! - Control flow: `if` / `else if` / `else`, `while`, `for`
//! - Jump statements: `return`, `break`, `continue`
//!
//! Anything else is skipped up to the next `;` or `}` with a warning, so one
//! unsupported statement does not stop the translation.
//!
//! # Grammar
//!
//! ```text
//! statement ::= var_decl | assignment | return_stmt | if_stmt
//!             | while_stmt | for_stmt | break_stmt | continue_stmt
//! body      ::= "{" (statement | "{" | "}")* "}"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::{Keyword, Token};
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    /// Parse statements after an opening `{` up to its matching `}`.
    ///
    /// Nested bare braces only adjust the depth, so their statements are
    /// flattened into this body.
    pub(crate) fn parse_body(&mut self, ctx: &str) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        let mut depth = 1usize;

        loop {
            match self.peek() {
                Token::LBrace(_) => {
                    self.advance();
                    depth += 1;
                }
                Token::RBrace(_) => {
                    self.advance();
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Token::Eof(_) => {
                    return Err(ParseError::syntax(
                        format!("Expected '}}' {ctx}"),
                        self.current_line(),
                    ));
                }
                _ => {
                    if let Some(stmt) = self.parse_statement()? {
                        statements.push(stmt);
                    }
                }
            }
        }

        Ok(statements)
    }

    /// Parse a statement. `None` means the statement was not recognized and
    /// has been skipped.
    pub(crate) fn parse_statement(&mut self) -> Result<Option<Stmt>, ParseError> {
        let loc = self.current_location();

        if self.is_var_type_keyword() {
            return Ok(Some(Stmt::VarDecl(self.parse_var_decl()?)));
        }

        if matches!(self.peek(), Token::Ident(..)) {
            return self.parse_assignment_statement();
        }

        if self.match_keyword(Keyword::Return) {
            let value = if self.check(&Token::Semicolon(loc)) {
                None
            } else {
                Some(self.parse_expression()?)
            };
            self.expect_semicolon("after return statement")?;
            return Ok(Some(Stmt::Return {
                value,
                location: loc,
            }));
        }

        if self.match_keyword(Keyword::If) {
            return self.parse_if_statement(loc).map(Some);
        }

        if self.match_keyword(Keyword::While) {
            return self.parse_while_statement(loc).map(Some);
        }

        if self.match_keyword(Keyword::For) {
            return self.parse_for_statement(loc).map(Some);
        }

        if self.check_keyword(Keyword::Break) || self.check_keyword(Keyword::Continue) {
            return self.parse_loop_control(loc).map(Some);
        }

        log::warn!(
            "Unrecognized statement at line {} starting with {}; skipping",
            loc.line,
            self.peek()
        );
        self.skip_statement();
        Ok(None)
    }

    /// `name = expr;` or `name[index] = expr;`
    fn parse_assignment_statement(&mut self) -> Result<Option<Stmt>, ParseError> {
        let loc = self.current_location();
        let name = self.expect_identifier("Expected identifier")?;

        let target = if self.check(&Token::LBracket(loc)) {
            LValue::Index(self.parse_array_access(name)?)
        } else {
            LValue::Var(name)
        };

        if !self.match_operator("=") {
            log::warn!(
                "Unrecognized statement at line {} ('{}' is not followed by '='); skipping",
                loc.line,
                target.base_name()
            );
            self.skip_statement();
            return Ok(None);
        }

        let value = self.parse_expression()?;
        self.expect_semicolon("after assignment")?;

        Ok(Some(Stmt::Assign(Assignment {
            target,
            value,
            location: loc,
        })))
    }

    /// Parse if statement (the `if` keyword has been consumed)
    fn parse_if_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        self.expect_lparen("after 'if'")?;
        let condition = self.parse_expression()?;
        self.expect_rparen("after if condition")?;
        self.expect_lbrace("after if condition")?;
        let then_body = self.parse_body("after if block")?;

        let mut else_ifs = Vec::new();
        let mut else_body = None;

        while self.check_keyword(Keyword::Else) {
            let clause_loc = self.current_location();
            self.advance();

            if self.match_keyword(Keyword::If) {
                self.expect_lparen("after 'else if'")?;
                let condition = self.parse_expression()?;
                self.expect_rparen("after else if condition")?;
                self.expect_lbrace("after else if condition")?;
                let body = self.parse_body("after else if block")?;
                else_ifs.push(ElseIfClause {
                    condition,
                    body,
                    location: clause_loc,
                });
            } else {
                self.expect_lbrace("after else")?;
                else_body = Some(self.parse_body("after else block")?);
                // `else` ends the chain
                break;
            }
        }

        Ok(Stmt::If(IfStatement {
            condition,
            then_body,
            else_ifs,
            else_body,
            location: loc,
        }))
    }

    /// Parse while statement (the `while` keyword has been consumed)
    fn parse_while_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        self.expect_lparen("after 'while'")?;
        let condition = self.parse_expression()?;
        self.expect_rparen("after while condition")?;
        self.expect_lbrace("after while condition")?;
        let body = self.parse_loop_body("after while block")?;

        Ok(Stmt::While {
            condition,
            body,
            location: loc,
        })
    }

    /// Parse for statement (the `for` keyword has been consumed)
    fn parse_for_statement(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        self.expect_lparen("after 'for'")?;

        let init = self.parse_for_init()?;

        let condition = if self.check(&Token::Semicolon(self.current_location())) {
            Expr::number("1")
        } else {
            self.parse_expression()?
        };
        self.expect_semicolon("after for condition")?;

        let increment = self.parse_for_increment()?;

        self.expect_rparen("after for header")?;
        self.expect_lbrace("after for header")?;
        let body = self.parse_loop_body("after for body")?;

        Ok(Stmt::For(ForStatement {
            init,
            condition,
            body,
            increment,
            location: loc,
        }))
    }

    /// Initializer clause of a `for` header, through its `;`
    fn parse_for_init(&mut self) -> Result<Option<ForInit>, ParseError> {
        if self.match_token(&Token::Semicolon(self.current_location())) {
            return Ok(None);
        }

        if self.is_var_type_keyword() {
            return Ok(Some(ForInit::Decl(self.parse_var_decl()?)));
        }

        let is_assignment = matches!(self.peek(), Token::Ident(..))
            && matches!(self.peek_ahead(1), Some(Token::Operator("=", _)));
        if !is_assignment {
            log::warn!(
                "Unsupported for-loop initializer at line {}; skipping",
                self.current_line()
            );
            self.skip_past_semicolon();
            return Ok(None);
        }

        let location = self.current_location();
        let name = self.expect_identifier("Expected identifier")?;
        self.advance(); // '='
        let value = self.parse_expression()?;
        self.expect_semicolon("after for-init assignment")?;

        Ok(Some(ForInit::Assign(Assignment {
            target: LValue::Var(name),
            value,
            location,
        })))
    }

    /// Increment clause of a `for` header. `i++`, `++i`, `i--`, `--i` and
    /// `i = expr` are accepted; other forms are skipped up to the header's `)`.
    fn parse_for_increment(&mut self) -> Result<Option<Assignment>, ParseError> {
        let location = self.current_location();

        if self.check(&Token::RParen(location)) {
            return Ok(None);
        }

        let step = |op: &str| match op {
            "++" => Some(BinOp::Add),
            "--" => Some(BinOp::Sub),
            _ => None,
        };

        let desugared = match (self.peek(), self.peek_ahead(1)) {
            // i++ / i--
            (Token::Ident(name, _), Some(Token::Operator(op, _))) if step(op).is_some() => {
                step(op).map(|binop| (name.clone(), binop))
            }
            // ++i / --i
            (Token::Operator(op, _), Some(Token::Ident(name, _))) if step(op).is_some() => {
                step(op).map(|binop| (name.clone(), binop))
            }
            _ => None,
        };

        if let Some((name, op)) = desugared {
            self.advance();
            self.advance();
            return Ok(Some(Assignment {
                target: LValue::Var(name.clone()),
                value: Expr::binary(op, Expr::ident(name), Expr::number("1")),
                location,
            }));
        }

        let is_assignment = matches!(self.peek(), Token::Ident(..))
            && matches!(self.peek_ahead(1), Some(Token::Operator("=", _)));
        if is_assignment {
            let name = self.expect_identifier("Expected identifier")?;
            self.advance(); // '='
            let value = self.parse_expression()?;
            return Ok(Some(Assignment {
                target: LValue::Var(name),
                value,
                location,
            }));
        }

        log::warn!(
            "Unsupported for-loop increment at line {}; skipping",
            location.line
        );
        let mut depth = 0usize;
        while !self.is_at_end() {
            match self.peek() {
                Token::LParen(_) => depth += 1,
                Token::RParen(_) if depth == 0 => break,
                Token::RParen(_) => depth -= 1,
                _ => {}
            }
            self.advance();
        }
        Ok(None)
    }

    /// Loop body with the loop depth raised for `break`/`continue` checks
    fn parse_loop_body(&mut self, ctx: &str) -> Result<Vec<Stmt>, ParseError> {
        self.loop_depth += 1;
        let body = self.parse_body(ctx);
        self.loop_depth -= 1;
        body
    }

    /// `break;` or `continue;`, valid only inside a loop body
    fn parse_loop_control(&mut self, loc: SourceLocation) -> Result<Stmt, ParseError> {
        let is_break = self.check_keyword(Keyword::Break);
        let keyword = if is_break { "break" } else { "continue" };

        if self.loop_depth == 0 {
            return Err(ParseError::LoopControlOutsideLoop {
                keyword,
                line: loc.line,
            });
        }
        self.advance();
        self.expect_semicolon(&format!("after '{}'", keyword))?;

        Ok(if is_break {
            Stmt::Break { location: loc }
        } else {
            Stmt::Continue { location: loc }
        })
    }
}
