//! Operator and condition lowering.
//!
//! A subexpression is boolean-valued when it is a comparison, a `&&`/`||`
//! combination or a `!`; everything else is numeric. Numeric values used
//! where VHDL needs a boolean are compared against zero.

use super::tracker::{VariableTracker, RESULT_PORT};
use crate::parser::ast::{ArrayAccess, BinOp, Call, Expr, UnOp};

/// Maps a source identifier to the VHDL name that holds its current value
pub trait Names {
    fn vhdl_name<'a>(&'a self, name: &'a str) -> &'a str;
}

/// Names outside the process: every identifier is its own signal or port
pub struct SignalNames;

impl Names for SignalNames {
    fn vhdl_name<'a>(&'a self, name: &'a str) -> &'a str {
        name
    }
}

/// Inside the process, tracked scalars read their process variable and a
/// local `result` reads the signal standing in for the port
impl Names for VariableTracker {
    fn vhdl_name<'a>(&'a self, name: &'a str) -> &'a str {
        match self.resolve(name) {
            Some(var) => &var.gen_name,
            None if name == RESULT_PORT => self.result_signal(),
            None => name,
        }
    }
}

pub fn is_boolean(expr: &Expr) -> bool {
    match expr {
        Expr::Binary { op, .. } => op.is_comparison() || op.is_logical(),
        Expr::Unary { op: UnOp::Not, .. } => true,
        _ => false,
    }
}

/// Lower an expression used as a value
pub fn lower_expr(expr: &Expr, names: &dyn Names) -> String {
    match expr {
        Expr::Number(text) => text.clone(),
        Expr::Ident(name) => names.vhdl_name(name).to_string(),
        Expr::Index(access) => lower_index(access, names),
        Expr::Call(call) => call_result_signal(call),
        Expr::Unary { op, operand } => lower_unary(*op, operand, names),
        Expr::Binary { op, left, right } => lower_binary(*op, left, right, names),
    }
}

/// Lower an expression used as an `if`/`elsif`/`while` condition
pub fn lower_condition(expr: &Expr, names: &dyn Names) -> String {
    if is_boolean(expr) {
        return lower_expr(expr, names);
    }
    match expr.integer_literal() {
        Some(0) => "false".to_string(),
        Some(_) => "true".to_string(),
        None => format!("unsigned({}) /= 0", lower_expr(expr, names)),
    }
}

/// Signal carrying the result of an annotated call
pub fn call_result_signal(call: &Call) -> String {
    match call.instance {
        Some(index) => format!("call_{}_{}_res", call.name, index),
        None => format!("{}_result", call.name),
    }
}

/// `a(2)` for a literal index, `a(to_integer(unsigned(i)))` otherwise
pub fn lower_index(access: &ArrayAccess, names: &dyn Names) -> String {
    match access.index.integer_literal() {
        Some(index) => format!("{}({})", access.base, index),
        None => format!(
            "{}(to_integer(unsigned({})))",
            access.base,
            lower_expr(&access.index, names)
        ),
    }
}

fn lower_unary(op: UnOp, operand: &Expr, names: &dyn Names) -> String {
    match op {
        UnOp::Neg => match operand {
            Expr::Number(text) => format!("to_signed(-{}, 32)", text),
            Expr::Ident(_) | Expr::Index(_) => {
                format!("-unsigned({})", lower_expr(operand, names))
            }
            _ => format!("0 - ({})", lower_expr(operand, names)),
        },
        UnOp::Not if is_boolean(operand) => format!("not ({})", lower_expr(operand, names)),
        UnOp::Not => format!("(unsigned({}) = 0)", lower_expr(operand, names)),
        UnOp::BitNot => format!("not unsigned({})", lower_expr(operand, names)),
    }
}

fn lower_binary(op: BinOp, left: &Expr, right: &Expr, names: &dyn Names) -> String {
    match op {
        BinOp::And | BinOp::Or => {
            let joiner = if op == BinOp::And { "and" } else { "or" };
            format!(
                "({} {} {})",
                logical_operand(left, names),
                joiner,
                logical_operand(right, names)
            )
        }
        BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => format!(
            "{} {} {}",
            comparison_operand(left, names),
            vhdl_operator(op),
            comparison_operand(right, names)
        ),
        BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor => format!(
            "unsigned({}) {} unsigned({})",
            lower_expr(left, names),
            vhdl_operator(op),
            lower_expr(right, names)
        ),
        BinOp::Shl | BinOp::Shr => {
            let func = if op == BinOp::Shl {
                "shift_left"
            } else {
                "shift_right"
            };
            let count = match right.integer_literal() {
                Some(n) => n.to_string(),
                None => format!("to_integer(unsigned({}))", lower_expr(right, names)),
            };
            format!("{}(unsigned({}), {})", func, lower_expr(left, names), count)
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => format!(
            "{} {} {}",
            arithmetic_operand(left, names),
            vhdl_operator(op),
            arithmetic_operand(right, names)
        ),
    }
}

fn vhdl_operator(op: BinOp) -> &'static str {
    match op {
        BinOp::Eq => "=",
        BinOp::Ne => "/=",
        BinOp::Mod => "mod",
        BinOp::BitAnd => "and",
        BinOp::BitOr => "or",
        BinOp::BitXor => "xor",
        other => other.spelling(),
    }
}

/// Operand of `and`/`or`: boolean subexpressions are parenthesized, numeric
/// ones are tested against zero
fn logical_operand(expr: &Expr, names: &dyn Names) -> String {
    if is_boolean(expr) {
        format!("({})", lower_expr(expr, names))
    } else {
        format!("unsigned({}) /= 0", lower_expr(expr, names))
    }
}

/// Operand of a comparison, converted to a numeric_std type
fn comparison_operand(expr: &Expr, names: &dyn Names) -> String {
    match expr {
        Expr::Number(text) => format!("to_unsigned({}, 32)", text),
        Expr::Unary {
            op: UnOp::Neg,
            operand,
        } if matches!(operand.as_ref(), Expr::Number(_)) => lower_expr(expr, names),
        _ => format!("unsigned({})", lower_expr(expr, names)),
    }
}

fn arithmetic_operand(expr: &Expr, names: &dyn Names) -> String {
    match expr {
        Expr::Binary { .. } => format!("({})", lower_expr(expr, names)),
        _ => lower_expr(expr, names),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn lower(source: &str) -> String {
        let expr = Parser::new(source).unwrap().parse_expression().unwrap();
        lower_expr(&expr, &SignalNames)
    }

    fn condition(source: &str) -> String {
        let expr = Parser::new(source).unwrap().parse_expression().unwrap();
        lower_condition(&expr, &SignalNames)
    }

    #[test]
    fn test_boolean_classification() {
        let parse = |s: &str| Parser::new(s).unwrap().parse_expression().unwrap();
        assert!(is_boolean(&parse("a == b")));
        assert!(is_boolean(&parse("a && b")));
        assert!(is_boolean(&parse("!a")));
        assert!(!is_boolean(&parse("a + b")));
        assert!(!is_boolean(&parse("~a")));
        assert!(!is_boolean(&parse("a & b")));
    }

    #[test]
    fn test_conditions() {
        assert_eq!(condition("a == b"), "unsigned(a) = unsigned(b)");
        assert_eq!(condition("a + b"), "unsigned(a + b) /= 0");
        assert_eq!(
            condition("a == b && c"),
            "((unsigned(a) = unsigned(b)) and unsigned(c) /= 0)"
        );
        assert_eq!(condition("x"), "unsigned(x) /= 0");
        assert_eq!(condition("1"), "true");
        assert_eq!(condition("0"), "false");
    }

    #[test]
    fn test_comparison_literals() {
        assert_eq!(condition("i < 10"), "unsigned(i) < to_unsigned(10, 32)");
        assert_eq!(condition("i != -1"), "unsigned(i) /= to_signed(-1, 32)");
        assert_eq!(condition("a[2] >= b"), "unsigned(a(2)) >= unsigned(b)");
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(lower("a + b"), "a + b");
        assert_eq!(lower("a % 4"), "a mod 4");
        assert_eq!(lower("(a + b) * c"), "(a + b) * c");
        assert_eq!(lower("a - b - c"), "(a - b) - c");
    }

    #[test]
    fn test_bitwise_and_shifts() {
        assert_eq!(lower("a & b"), "unsigned(a) and unsigned(b)");
        assert_eq!(lower("a ^ b"), "unsigned(a) xor unsigned(b)");
        assert_eq!(lower("a << 2"), "shift_left(unsigned(a), 2)");
        assert_eq!(
            lower("a >> n"),
            "shift_right(unsigned(a), to_integer(unsigned(n)))"
        );
    }

    #[test]
    fn test_unary() {
        assert_eq!(lower("-5"), "to_signed(-5, 32)");
        assert_eq!(lower("-y"), "-unsigned(y)");
        assert_eq!(lower("-(a + b)"), "0 - (a + b)");
        assert_eq!(lower("!(a < b)"), "not (unsigned(a) < unsigned(b))");
        assert_eq!(lower("!a"), "(unsigned(a) = 0)");
        assert_eq!(lower("~a"), "not unsigned(a)");
    }

    #[test]
    fn test_index_and_calls() {
        assert_eq!(lower("a[i + 1]"), "a(to_integer(unsigned(i + 1)))");
        assert_eq!(lower("a[0]"), "a(0)");
        assert_eq!(lower("g(x)"), "g_result");
    }
}
