//! Lexer (tokenizer) for C source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the parser.
//! Preprocessor directives are skipped rather than parsed; the translator has
//! no include or macro model.

use super::ast::SourceLocation;
use std::fmt;

/// Reserved words of the C subset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Int,
    Float,
    Char,
    Double,
    Void,
    Return,
    If,
    Else,
    While,
    For,
    Break,
    Continue,
}

impl Keyword {
    fn from_ident(ident: &str) -> Option<Keyword> {
        let kw = match ident {
            "int" => Keyword::Int,
            "float" => Keyword::Float,
            "char" => Keyword::Char,
            "double" => Keyword::Double,
            "void" => Keyword::Void,
            "return" => Keyword::Return,
            "if" => Keyword::If,
            "else" => Keyword::Else,
            "while" => Keyword::While,
            "for" => Keyword::For,
            "break" => Keyword::Break,
            "continue" => Keyword::Continue,
            _ => return None,
        };
        Some(kw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::Int => "int",
            Keyword::Float => "float",
            Keyword::Char => "char",
            Keyword::Double => "double",
            Keyword::Void => "void",
            Keyword::Return => "return",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::For => "for",
            Keyword::Break => "break",
            Keyword::Continue => "continue",
        }
    }

    /// Type keywords that can start a declaration or function signature
    pub fn is_type(self) -> bool {
        matches!(
            self,
            Keyword::Int | Keyword::Float | Keyword::Char | Keyword::Double | Keyword::Void
        )
    }
}

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can report
/// an accurate line without a separate token→location table. Operators keep
/// their spelling; the parser looks up binary precedence from it.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    Number(String, SourceLocation),
    CharLiteral(char, SourceLocation),
    StringLiteral(String, SourceLocation),

    // Identifiers
    Ident(String, SourceLocation),

    // Keywords
    Keyword(Keyword, SourceLocation),

    // Operators (single and multi-character)
    Operator(&'static str, SourceLocation),

    // Punctuation
    LParen(SourceLocation),    // (
    RParen(SourceLocation),    // )
    LBrace(SourceLocation),    // {
    RBrace(SourceLocation),    // }
    LBracket(SourceLocation),  // [
    RBracket(SourceLocation),  // ]
    Semicolon(SourceLocation), // ;
    Comma(SourceLocation),     // ,

    // End of file
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::Number(_, loc)
            | Token::CharLiteral(_, loc)
            | Token::StringLiteral(_, loc)
            | Token::Ident(_, loc)
            | Token::Keyword(_, loc)
            | Token::Operator(_, loc)
            | Token::LParen(loc)
            | Token::RParen(loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::LBracket(loc)
            | Token::RBracket(loc)
            | Token::Semicolon(loc)
            | Token::Comma(loc)
            | Token::Eof(loc) => *loc,
        }
    }

    pub fn line(&self) -> usize {
        self.location().line
    }

    /// Source spelling of the token. Used where raw text is captured
    /// verbatim, such as array index text.
    pub fn lexeme(&self) -> String {
        match self {
            Token::Number(text, _) | Token::Ident(text, _) => text.clone(),
            Token::CharLiteral(c, _) => format!("'{}'", c),
            Token::StringLiteral(s, _) => format!("\"{}\"", s),
            Token::Keyword(kw, _) => kw.as_str().to_string(),
            Token::Operator(op, _) => op.to_string(),
            Token::LParen(_) => "(".to_string(),
            Token::RParen(_) => ")".to_string(),
            Token::LBrace(_) => "{".to_string(),
            Token::RBrace(_) => "}".to_string(),
            Token::LBracket(_) => "[".to_string(),
            Token::RBracket(_) => "]".to_string(),
            Token::Semicolon(_) => ";".to_string(),
            Token::Comma(_) => ",".to_string(),
            Token::Eof(_) => String::new(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n, _) => write!(f, "number {}", n),
            Token::CharLiteral(c, _) => write!(f, "char literal '{}'", c),
            Token::StringLiteral(s, _) => write!(f, "string literal \"{}\"", s),
            Token::Ident(s, _) => write!(f, "identifier '{}'", s),
            Token::Keyword(kw, _) => write!(f, "'{}'", kw.as_str()),
            Token::Operator(op, _) => write!(f, "'{}'", op),
            Token::Eof(_) => write!(f, "end of file"),
            other => write!(f, "'{}'", other.lexeme()),
        }
    }
}

/// Lexer error type
#[derive(Debug)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error (line {}): {}", self.location.line, self.message)
    }
}

impl std::error::Error for LexError {}

/// Lexer for C source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input. The returned stream always ends with
    /// [`Token::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia()?;
            if self.is_at_end() {
                tokens.push(Token::Eof(self.current_location()));
                break;
            }
            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        match ch {
            '"' => self.string_literal(loc),
            '\'' => self.char_literal(loc),
            '0'..='9' => Ok(self.number_literal(ch, loc)),
            'a'..='z' | 'A'..='Z' | '_' => Ok(self.identifier_or_keyword(ch, loc)),

            '+' => Ok(self.operator(loc, &[('+', "++"), ('=', "+=")], "+")),
            '-' => Ok(self.operator(loc, &[('-', "--"), ('=', "-=")], "-")),
            '*' => Ok(self.operator(loc, &[('=', "*=")], "*")),
            '/' => Ok(self.operator(loc, &[('=', "/=")], "/")),
            '%' => Ok(self.operator(loc, &[('=', "%=")], "%")),
            '=' => Ok(self.operator(loc, &[('=', "==")], "=")),
            '!' => Ok(self.operator(loc, &[('=', "!=")], "!")),
            '<' => {
                if self.peek() == Some('<') && self.peek_ahead(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::Operator("<<=", loc))
                } else {
                    Ok(self.operator(loc, &[('=', "<="), ('<', "<<")], "<"))
                }
            }
            '>' => {
                if self.peek() == Some('>') && self.peek_ahead(1) == Some('=') {
                    self.advance();
                    self.advance();
                    Ok(Token::Operator(">>=", loc))
                } else {
                    Ok(self.operator(loc, &[('=', ">="), ('>', ">>")], ">"))
                }
            }
            '&' => Ok(self.operator(loc, &[('&', "&&"), ('=', "&=")], "&")),
            '|' => Ok(self.operator(loc, &[('|', "||"), ('=', "|=")], "|")),
            '^' => Ok(self.operator(loc, &[('=', "^=")], "^")),
            '~' => Ok(Token::Operator("~", loc)),
            '?' => Ok(Token::Operator("?", loc)),
            ':' => Ok(Token::Operator(":", loc)),
            '.' => Ok(Token::Operator(".", loc)),

            '(' => Ok(Token::LParen(loc)),
            ')' => Ok(Token::RParen(loc)),
            '{' => Ok(Token::LBrace(loc)),
            '}' => Ok(Token::RBrace(loc)),
            '[' => Ok(Token::LBracket(loc)),
            ']' => Ok(Token::RBracket(loc)),
            ';' => Ok(Token::Semicolon(loc)),
            ',' => Ok(Token::Comma(loc)),

            _ => Err(LexError {
                message: format!("Unexpected character: '{}'", ch),
                location: loc,
            }),
        }
    }

    /// Longest-match operator: `follow` lists the two-character spellings
    /// keyed by their second character.
    fn operator(
        &mut self,
        loc: SourceLocation,
        follow: &[(char, &'static str)],
        single: &'static str,
    ) -> Token {
        if let Some(next) = self.peek() {
            if let Some((_, spelling)) = follow.iter().find(|(c, _)| *c == next) {
                self.advance();
                return Token::Operator(spelling, loc);
            }
        }
        Token::Operator(single, loc)
    }

    /// Parse string literal
    fn string_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == '"' {
                self.advance(); // consume closing quote
                return Ok(Token::StringLiteral(string, loc));
            }
            if ch == '\n' {
                break;
            }

            self.advance();
            if ch == '\\' {
                if let Some(escaped) = self.advance() {
                    string.push('\\');
                    string.push(escaped);
                }
            } else {
                string.push(ch);
            }
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Parse character literal
    fn char_literal(&mut self, loc: SourceLocation) -> Result<Token, LexError> {
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file in character literal".to_string(),
            location: loc,
        })?;

        let value = if ch == '\\' {
            let escaped = self.advance().ok_or_else(|| LexError {
                message: "Unexpected end of file in character literal".to_string(),
                location: loc,
            })?;

            match escaped {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                '\\' => '\\',
                '\'' => '\'',
                '0' => '\0',
                _ => {
                    return Err(LexError {
                        message: format!("Unknown escape sequence: \\{}", escaped),
                        location: loc,
                    });
                }
            }
        } else {
            ch
        };

        if self.advance() != Some('\'') {
            return Err(LexError {
                message: "Expected closing quote in character literal".to_string(),
                location: loc,
            });
        }

        Ok(Token::CharLiteral(value, loc))
    }

    /// Parse numeric literal: digits with an optional fractional part
    fn number_literal(&mut self, first_digit: char, loc: SourceLocation) -> Token {
        let mut num_str = String::new();
        num_str.push(first_digit);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else if ch == '.'
                && !num_str.contains('.')
                && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit())
            {
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::Number(num_str, loc)
    }

    /// Parse identifier or keyword
    fn identifier_or_keyword(&mut self, first_char: char, loc: SourceLocation) -> Token {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        match Keyword::from_ident(&ident) {
            Some(kw) => Token::Keyword(kw, loc),
            None => Token::Ident(ident, loc),
        }
    }

    /// Whitespace, comments and preprocessor lines carry nothing the
    /// translator uses
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        while let Some(ch) = self.peek() {
            match (ch, self.peek_ahead(1)) {
                (c, _) if c.is_whitespace() => {
                    self.advance();
                }
                ('/', Some('/')) | ('#', _) => self.skip_to_line_end(),
                ('/', Some('*')) => self.skip_block_comment()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_to_line_end(&mut self) {
        while let Some(ch) = self.advance() {
            if ch == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.current_location();
        self.position_after("/*");

        loop {
            match (self.peek(), self.peek_ahead(1)) {
                (Some('*'), Some('/')) => {
                    self.position_after("*/");
                    return Ok(());
                }
                (Some(_), _) => {
                    self.advance();
                }
                (None, _) => {
                    return Err(LexError {
                        message: "Unterminated comment".to_string(),
                        location: start,
                    })
                }
            }
        }
    }

    /// Step over `text`, which the caller has already matched
    fn position_after(&mut self, text: &str) {
        for _ in text.chars() {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = *self.input.get(self.position)?;
        self.position += 1;

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source).tokenize().unwrap()
    }

    fn operators(tokens: &[Token]) -> Vec<&'static str> {
        tokens
            .iter()
            .filter_map(|t| match t {
                Token::Operator(op, _) => Some(*op),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_function_header() {
        let tokens = lex("char f(double d) { }");

        assert!(matches!(tokens[0], Token::Keyword(Keyword::Char, _)));
        assert!(matches!(tokens[1], Token::Ident(ref s, _) if s == "f"));
        assert!(matches!(tokens[2], Token::LParen(_)));
        assert!(matches!(tokens[3], Token::Keyword(Keyword::Double, _)));
        assert!(matches!(tokens[5], Token::RParen(_)));
        assert!(matches!(tokens.last(), Some(Token::Eof(_))));
        assert_eq!(tokens.len(), 9);
    }

    #[test]
    fn test_longest_match_operators() {
        let tokens = lex("i <<= 2; j >>= k; a<=b && c||!d; ++i; x % y");

        assert_eq!(
            operators(&tokens),
            vec!["<<=", ">>=", "<=", "&&", "||", "!", "++", "%"]
        );
    }

    #[test]
    fn test_loop_keywords() {
        let tokens = lex("for while break continue if else");
        let keywords: Vec<&str> = tokens
            .iter()
            .filter_map(|t| match t {
                Token::Keyword(kw, _) => Some(kw.as_str()),
                _ => None,
            })
            .collect();

        assert_eq!(keywords, vec!["for", "while", "break", "continue", "if", "else"]);
    }

    #[test]
    fn test_number_text_is_preserved() {
        let tokens = lex("007 3.5 9.e");

        assert_eq!(tokens[0].lexeme(), "007");
        assert_eq!(tokens[1].lexeme(), "3.5");
        // `9.` without fraction digits stops before the dot
        assert!(matches!(tokens[2], Token::Number(ref n, _) if n == "9"));
    }

    #[test]
    fn test_trivia_and_line_numbers() {
        let source = "#define N 4\n/* header\n spans */ int a; // tail\n  return a;";
        let tokens = lex(source);

        assert!(matches!(tokens[0], Token::Keyword(Keyword::Int, _)));
        assert_eq!(tokens[0].line(), 3);
        assert!(matches!(tokens[3], Token::Keyword(Keyword::Return, _)));
        assert_eq!(tokens[3].line(), 4);
        assert_eq!(tokens[3].location().column, 3);
    }

    #[test]
    fn test_char_escapes() {
        let tokens = lex(r"'A' '\0' '\''");

        assert!(matches!(tokens[0], Token::CharLiteral('A', _)));
        assert!(matches!(tokens[1], Token::CharLiteral('\0', _)));
        assert!(matches!(tokens[2], Token::CharLiteral('\'', _)));
    }

    #[test]
    fn test_lex_errors() {
        let err = Lexer::new("int f() {\n  return $;\n}").tokenize().unwrap_err();
        assert_eq!(err.location.line, 2);
        assert!(err.message.contains('$'));

        let err = Lexer::new("int a; /* open").tokenize().unwrap_err();
        assert_eq!(err.message, "Unterminated comment");
    }
}
