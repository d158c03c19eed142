//! Call annotation: gives every call expression in a function a unique
//! instance index, which names its hardware instantiation.
//!
//! Indices are function scoped and assigned in pre-order (a call is numbered
//! before the calls in its arguments). Calls that already carry an index are
//! left alone, so running the pass twice changes nothing.

use crate::parser::ast::*;

/// Annotate every function of `program`
pub fn annotate_program(program: &mut Program) {
    for func in &mut program.functions {
        annotate_func_calls(func);
    }
}

/// Assign instance indices to the calls of one function that have none yet.
/// Returns the number of calls that were newly annotated.
pub fn annotate_func_calls(func: &mut FunctionDecl) -> usize {
    let mut next = collect_calls(func)
        .iter()
        .filter_map(|call| call.instance)
        .max()
        .map_or(0, |max| max + 1);
    let first = next;

    visit_body_exprs_mut(&mut func.body, &mut |expr| annotate_expr(expr, &mut next));

    next - first
}

/// `true` when some call in `func` has no instance index
pub fn needs_annotation(func: &FunctionDecl) -> bool {
    collect_calls(func).iter().any(|call| call.instance.is_none())
}

fn annotate_expr(expr: &mut Expr, next: &mut usize) {
    match expr {
        Expr::Call(call) => {
            if call.instance.is_none() {
                call.instance = Some(*next);
                *next += 1;
            }
            for arg in &mut call.args {
                annotate_expr(arg, next);
            }
        }
        Expr::Index(access) => annotate_expr(&mut access.index, next),
        Expr::Unary { operand, .. } => annotate_expr(operand, next),
        Expr::Binary { left, right, .. } => {
            annotate_expr(left, next);
            annotate_expr(right, next);
        }
        Expr::Number(_) | Expr::Ident(_) => {}
    }
}

/// All calls of `func` in pre-order
pub fn collect_calls(func: &FunctionDecl) -> Vec<&Call> {
    let mut calls = Vec::new();
    visit_body_exprs(&func.body, &mut |expr| collect_expr(expr, &mut calls));
    calls
}

fn collect_expr<'a>(expr: &'a Expr, calls: &mut Vec<&'a Call>) {
    match expr {
        Expr::Call(call) => {
            calls.push(call);
            for arg in &call.args {
                collect_expr(arg, calls);
            }
        }
        Expr::Index(access) => collect_expr(&access.index, calls),
        Expr::Unary { operand, .. } => collect_expr(operand, calls),
        Expr::Binary { left, right, .. } => {
            collect_expr(left, calls);
            collect_expr(right, calls);
        }
        Expr::Number(_) | Expr::Ident(_) => {}
    }
}

/// Calls `visit` on every top-level expression of `body` in source order
fn visit_body_exprs<'a>(body: &'a [Stmt], visit: &mut dyn FnMut(&'a Expr)) {
    fn decl<'a>(decl: &'a VarDecl, visit: &mut dyn FnMut(&'a Expr)) {
        if let Some(Initializer::Expr(init)) = &decl.init {
            visit(init);
        }
    }
    fn assign<'a>(assign: &'a Assignment, visit: &mut dyn FnMut(&'a Expr)) {
        if let LValue::Index(access) = &assign.target {
            visit(&*access.index);
        }
        visit(&assign.value);
    }

    for stmt in body {
        match stmt {
            Stmt::VarDecl(d) => decl(d, visit),
            Stmt::Assign(a) => assign(a, visit),
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    visit(value);
                }
            }
            Stmt::If(stmt) => {
                visit(&stmt.condition);
                visit_body_exprs(&stmt.then_body, visit);
                for clause in &stmt.else_ifs {
                    visit(&clause.condition);
                    visit_body_exprs(&clause.body, visit);
                }
                if let Some(body) = &stmt.else_body {
                    visit_body_exprs(body, visit);
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                visit(condition);
                visit_body_exprs(body, visit);
            }
            Stmt::For(stmt) => {
                match &stmt.init {
                    Some(ForInit::Decl(d)) => decl(d, visit),
                    Some(ForInit::Assign(a)) => assign(a, visit),
                    None => {}
                }
                visit(&stmt.condition);
                visit_body_exprs(&stmt.body, visit);
                if let Some(incr) = &stmt.increment {
                    assign(incr, visit);
                }
            }
            Stmt::Break { .. } | Stmt::Continue { .. } => {}
        }
    }
}

/// Mutable twin of [`visit_body_exprs`]; must visit in the same order
fn visit_body_exprs_mut(body: &mut [Stmt], visit: &mut dyn FnMut(&mut Expr)) {
    fn decl(decl: &mut VarDecl, visit: &mut dyn FnMut(&mut Expr)) {
        if let Some(Initializer::Expr(init)) = &mut decl.init {
            visit(init);
        }
    }
    fn assign(assign: &mut Assignment, visit: &mut dyn FnMut(&mut Expr)) {
        if let LValue::Index(access) = &mut assign.target {
            visit(&mut *access.index);
        }
        visit(&mut assign.value);
    }

    for stmt in body {
        match stmt {
            Stmt::VarDecl(d) => decl(d, visit),
            Stmt::Assign(a) => assign(a, visit),
            Stmt::Return { value, .. } => {
                if let Some(value) = value {
                    visit(value);
                }
            }
            Stmt::If(stmt) => {
                visit(&mut stmt.condition);
                visit_body_exprs_mut(&mut stmt.then_body, visit);
                for clause in &mut stmt.else_ifs {
                    visit(&mut clause.condition);
                    visit_body_exprs_mut(&mut clause.body, visit);
                }
                if let Some(body) = &mut stmt.else_body {
                    visit_body_exprs_mut(body, visit);
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                visit(condition);
                visit_body_exprs_mut(body, visit);
            }
            Stmt::For(stmt) => {
                match &mut stmt.init {
                    Some(ForInit::Decl(d)) => decl(d, visit),
                    Some(ForInit::Assign(a)) => assign(a, visit),
                    None => {}
                }
                visit(&mut stmt.condition);
                visit_body_exprs_mut(&mut stmt.body, visit);
                if let Some(incr) = &mut stmt.increment {
                    assign(incr, visit);
                }
            }
            Stmt::Break { .. } | Stmt::Continue { .. } => {}
        }
    }
}
