//! Indented tree dump of a parsed [`Program`], used by `--dump-ast`

use crate::parser::ast::*;
use std::fmt::{self, Display, Formatter, Write};

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "Program")?;
        let mut printer = TreePrinter { out: f, depth: 1 };
        for func in &self.functions {
            printer.function(func)?;
        }
        Ok(())
    }
}

/// Renders an expression back into C-like infix form, fully parenthesized
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(text) | Expr::Ident(text) => write!(f, "{}", text),
            Expr::Index(access) => write!(f, "{}[{}]", access.base, access.index),
            Expr::Call(call) => {
                write!(f, "{}", call.name)?;
                if let Some(instance) = call.instance {
                    write!(f, "#{}", instance)?;
                }
                f.write_char('(')?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_char(')')
            }
            Expr::Unary { op, operand } => write!(f, "{}{}", op.spelling(), operand),
            Expr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.spelling(), right)
            }
        }
    }
}

struct TreePrinter<'a, 'b> {
    out: &'a mut Formatter<'b>,
    depth: usize,
}

impl TreePrinter<'_, '_> {
    fn line(&mut self, text: impl Display) -> fmt::Result {
        writeln!(self.out, "{:indent$}{}", "", text, indent = self.depth * 2)
    }

    fn nested(&mut self, body: &[Stmt]) -> fmt::Result {
        self.depth += 1;
        for stmt in body {
            self.stmt(stmt)?;
        }
        self.depth -= 1;
        Ok(())
    }

    fn function(&mut self, func: &FunctionDecl) -> fmt::Result {
        let params: Vec<String> = func
            .params
            .iter()
            .map(|p| format!("{} {}", p.param_type, p.name))
            .collect();
        self.line(format_args!(
            "Function {} {}({}) [line {}]",
            func.return_type,
            func.name,
            params.join(", "),
            func.location.line
        ))?;
        self.nested(&func.body)
    }

    fn decl(&mut self, decl: &VarDecl) -> fmt::Result {
        let size = decl
            .array_size
            .map(|n| format!("[{}]", n))
            .unwrap_or_default();
        match &decl.init {
            None => self.line(format_args!("VarDecl {} {}{}", decl.var_type, decl.name, size)),
            Some(Initializer::Expr(e)) => self.line(format_args!(
                "VarDecl {} {}{} = {}",
                decl.var_type, decl.name, size, e
            )),
            Some(Initializer::List(elems)) => {
                let elems: Vec<String> = elems
                    .iter()
                    .map(|e| match e {
                        InitElement::Number(n) | InitElement::Ident(n) => n.clone(),
                        InitElement::Char(c) => format!("'{}'", c),
                    })
                    .collect();
                self.line(format_args!(
                    "VarDecl {} {}{} = {{{}}}",
                    decl.var_type,
                    decl.name,
                    size,
                    elems.join(", ")
                ))
            }
        }
    }

    fn assignment(&mut self, label: &str, assign: &Assignment) -> fmt::Result {
        let target = match &assign.target {
            LValue::Var(name) => name.clone(),
            LValue::Index(access) => format!("{}[{}]", access.base, access.index_text),
        };
        self.line(format_args!("{} {} = {}", label, target, assign.value))
    }

    fn stmt(&mut self, stmt: &Stmt) -> fmt::Result {
        match stmt {
            Stmt::VarDecl(decl) => self.decl(decl),
            Stmt::Assign(assign) => self.assignment("Assign", assign),
            Stmt::Return { value: Some(v), .. } => self.line(format_args!("Return {}", v)),
            Stmt::Return { value: None, .. } => self.line("Return"),
            Stmt::If(stmt) => {
                self.line(format_args!("If {}", stmt.condition))?;
                self.nested(&stmt.then_body)?;
                for clause in &stmt.else_ifs {
                    self.line(format_args!("ElseIf {}", clause.condition))?;
                    self.nested(&clause.body)?;
                }
                if let Some(body) = &stmt.else_body {
                    self.line("Else")?;
                    self.nested(body)?;
                }
                Ok(())
            }
            Stmt::While {
                condition, body, ..
            } => {
                self.line(format_args!("While {}", condition))?;
                self.nested(body)
            }
            Stmt::For(stmt) => {
                self.line(format_args!("For {}", stmt.condition))?;
                self.depth += 1;
                match &stmt.init {
                    Some(ForInit::Decl(decl)) => self.decl(decl)?,
                    Some(ForInit::Assign(assign)) => self.assignment("Init", assign)?,
                    None => {}
                }
                self.depth -= 1;
                self.nested(&stmt.body)?;
                if let Some(incr) = &stmt.increment {
                    self.depth += 1;
                    self.assignment("Increment", incr)?;
                    self.depth -= 1;
                }
                Ok(())
            }
            Stmt::Break { .. } => self.line("Break"),
            Stmt::Continue { .. } => self.line("Continue"),
        }
    }
}
