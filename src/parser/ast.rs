// AST (Abstract Syntax Tree) definitions for the C-to-VHDL translator

use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Scalar C types accepted in declarations, parameters and return types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CType {
    Int,
    Float,
    Char,
    Double,
    Void,
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CType::Int => "int",
            CType::Float => "float",
            CType::Char => "char",
            CType::Double => "double",
            CType::Void => "void",
        };
        f.write_str(name)
    }
}

/// Lowest binary precedence. Top-level, parenthesized and call-argument
/// expressions all start here so `||`, `&&` and `|` are always consumed.
pub const LOWEST_PRECEDENCE: u8 = 1;

/// Binary precedence for an operator spelling, or `None` if the spelling
/// is not a binary operator (`=`, `++`, `!`, ...).
pub fn binary_precedence(spelling: &str) -> Option<u8> {
    BinOp::from_spelling(spelling).map(BinOp::precedence)
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    // Comparison
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    // Logical
    And,
    Or,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinOp {
    pub fn from_spelling(spelling: &str) -> Option<BinOp> {
        let op = match spelling {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "%" => BinOp::Mod,
            "==" => BinOp::Eq,
            "!=" => BinOp::Ne,
            "<" => BinOp::Lt,
            "<=" => BinOp::Le,
            ">" => BinOp::Gt,
            ">=" => BinOp::Ge,
            "&&" => BinOp::And,
            "||" => BinOp::Or,
            "&" => BinOp::BitAnd,
            "|" => BinOp::BitOr,
            "^" => BinOp::BitXor,
            "<<" => BinOp::Shl,
            ">>" => BinOp::Shr,
            _ => return None,
        };
        Some(op)
    }

    pub fn spelling(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            BinOp::Or => 1,
            BinOp::And => 2,
            BinOp::BitOr => 3,
            BinOp::BitXor => 4,
            BinOp::BitAnd => 5,
            BinOp::Eq | BinOp::Ne => 6,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 7,
            BinOp::Shl | BinOp::Shr => 8,
            BinOp::Add | BinOp::Sub => 9,
            BinOp::Mul | BinOp::Div | BinOp::Mod => 10,
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::And | BinOp::Or)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,    // -x
    Not,    // !x
    BitNot, // ~x
}

impl UnOp {
    pub fn spelling(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Not => "!",
            UnOp::BitNot => "~",
        }
    }
}

/// Array element access `base[index]`.
///
/// `index_text` is the raw token spelling between the brackets, kept for
/// diagnostics and the AST dump; `index` is the same tokens parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccess {
    pub base: String,
    pub index: Box<Expr>,
    pub index_text: String,
}

/// Call to a sibling function. `instance` is filled in by
/// [`crate::codegen::annotate_func_calls`] and identifies one hardware
/// instantiation of the callee.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Expr>,
    pub instance: Option<usize>,
    pub location: SourceLocation,
}

/// Expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal kept as written (`42`, `0.25`)
    Number(String),
    Ident(String),
    Index(ArrayAccess),
    Call(Call),
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn number(text: impl Into<String>) -> Self {
        Expr::Number(text.into())
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Integer value of a plain or negated integer literal.
    pub fn integer_literal(&self) -> Option<i64> {
        match self {
            Expr::Number(text) => text.parse().ok(),
            Expr::Unary {
                op: UnOp::Neg,
                operand,
            } => match operand.as_ref() {
                Expr::Number(text) => text.parse::<i64>().ok().map(|v| -v),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Element of a brace-delimited array initializer
#[derive(Debug, Clone, PartialEq)]
pub enum InitElement {
    /// Numeric literal, optionally negated (`-3`)
    Number(String),
    /// Character literal, stored as its character
    Char(char),
    Ident(String),
}

/// Declaration initializer
#[derive(Debug, Clone, PartialEq)]
pub enum Initializer {
    Expr(Expr),
    List(Vec<InitElement>),
}

/// Local variable declaration: `type name[size]? (= init)?;`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub var_type: CType,
    pub array_size: Option<usize>,
    pub init: Option<Initializer>,
    pub location: SourceLocation,
}

impl VarDecl {
    pub fn is_array(&self) -> bool {
        self.array_size.is_some()
    }
}

/// Assignment target
#[derive(Debug, Clone, PartialEq)]
pub enum LValue {
    Var(String),
    Index(ArrayAccess),
}

impl LValue {
    pub fn base_name(&self) -> &str {
        match self {
            LValue::Var(name) => name,
            LValue::Index(access) => &access.base,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: LValue,
    pub value: Expr,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElseIfClause {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

/// `if` with its chained `else if` clauses and optional trailing `else`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expr,
    pub then_body: Vec<Stmt>,
    pub else_ifs: Vec<ElseIfClause>,
    pub else_body: Option<Vec<Stmt>>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Decl(VarDecl),
    Assign(Assignment),
}

/// `for (init; condition; increment) { body }`.
///
/// An absent condition is stored as the constant `1`. The increment runs
/// after the body, so it is kept apart from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub init: Option<ForInit>,
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub increment: Option<Assignment>,
    pub location: SourceLocation,
}

/// Statements
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    VarDecl(VarDecl),
    Assign(Assignment),
    Return {
        value: Option<Expr>,
        location: SourceLocation,
    },
    If(IfStatement),
    While {
        condition: Expr,
        body: Vec<Stmt>,
        location: SourceLocation,
    },
    For(ForStatement),
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
}

impl Stmt {
    /// Get the source location of this statement
    pub fn location(&self) -> SourceLocation {
        match self {
            Stmt::VarDecl(decl) => decl.location,
            Stmt::Assign(assign) => assign.location,
            Stmt::Return { location, .. } => *location,
            Stmt::If(stmt) => stmt.location,
            Stmt::While { location, .. } => *location,
            Stmt::For(stmt) => stmt.location,
            Stmt::Break { location } => *location,
            Stmt::Continue { location } => *location,
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub param_type: CType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub return_type: CType,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub location: SourceLocation,
}

impl FunctionDecl {
    pub fn is_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub functions: Vec<FunctionDecl>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// Visits every declaration in `body` in source order, descending into nested
/// bodies and `for` initializers.
pub fn walk_decls<'a>(body: &'a [Stmt], visit_decl: &mut dyn FnMut(&'a VarDecl)) {
    for stmt in body {
        match stmt {
            Stmt::VarDecl(decl) => visit_decl(decl),
            Stmt::If(stmt) => {
                walk_decls(&stmt.then_body, visit_decl);
                for clause in &stmt.else_ifs {
                    walk_decls(&clause.body, visit_decl);
                }
                if let Some(body) = &stmt.else_body {
                    walk_decls(body, visit_decl);
                }
            }
            Stmt::While { body, .. } => walk_decls(body, visit_decl),
            Stmt::For(stmt) => {
                if let Some(ForInit::Decl(decl)) = &stmt.init {
                    visit_decl(decl);
                }
                walk_decls(&stmt.body, visit_decl);
            }
            Stmt::Assign(_) | Stmt::Return { .. } | Stmt::Break { .. } | Stmt::Continue { .. } => {}
        }
    }
}
