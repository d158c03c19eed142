//! Variable tracking for the clocked process.
//!
//! Scalar locals are "variableized": inside the process every scalar gets a
//! process variable so that sequential assignments within one clock edge
//! observe each other, and the variables are copied back to their signals
//! when the edge is done.
//!
//! Every scalar declaration of the function, nested ones included, gets its
//! own variable. Repeated declarations of one name are told apart by an
//! ordinal; see [`build_gen_name`].

use super::types::ctype_to_vhdl;
use crate::parser::ast::{walk_decls, FunctionDecl, VarDecl};
use rustc_hash::FxHashMap;
use std::ptr;

/// Name of the output port
pub const RESULT_PORT: &str = "result";

/// Signal standing in for a local named `result`; it drives the output port
/// so the process never reads an `out` port
pub const INTERNAL_RESULT: &str = "internal_result";

/// Whether `func` declares a scalar local named `result`
pub fn declares_result_local(func: &FunctionDecl) -> bool {
    let mut found = false;
    walk_decls(&func.body, &mut |decl| {
        found |= !decl.is_array() && decl.name == RESULT_PORT;
    });
    found
}

/// Process variable name for the `ordinal`-th declaration of `original`.
///
/// Names already following the `_v` / `_v<digits>` convention get the
/// ordinal appended as a bare number (`foo_v` → `foo_v0`, `foo_v1` →
/// `foo_v10`); other names get `_v` for the first declaration and
/// `_v<ordinal>` after that.
pub fn build_gen_name(original: &str, ordinal: usize) -> String {
    let stem = original.trim_end_matches(|c: char| c.is_ascii_digit());
    let has_suffix = stem.ends_with("_v");

    match (has_suffix, ordinal) {
        (true, _) => format!("{}{}", original, ordinal),
        (false, 0) => format!("{}_v", original),
        (false, n) => format!("{}_v{}", original, n),
    }
}

/// A scalar local and the process variable standing in for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedVar {
    pub original: String,
    pub gen_name: String,
    pub vhdl_type: &'static str,
    /// How many declarations of `original` precede this one
    pub ordinal: usize,
    /// Declared with the name of a parameter; has no signal of its own
    pub shadows_param: bool,
}

impl TrackedVar {
    /// Whether the variable is copied back to a signal at the end of the edge
    pub fn has_signal(&self) -> bool {
        !self.shadows_param
    }
}

/// Tracked scalars of one function, plus the lexical scopes used while the
/// process body is emitted.
///
/// Declarations are identified by address, so [`bind`](Self::bind) must be
/// given nodes of the same tree that was passed to
/// [`collect`](Self::collect).
#[derive(Debug, Default)]
pub struct VariableTracker {
    vars: Vec<TrackedVar>,
    by_decl: FxHashMap<*const VarDecl, usize>,
    scopes: Vec<FxHashMap<String, usize>>,
    internal_result: bool,
}

impl VariableTracker {
    /// Collect the scalar declarations of `func` in source order.
    pub fn collect(func: &FunctionDecl) -> Self {
        let mut tracker = VariableTracker {
            internal_result: declares_result_local(func),
            ..VariableTracker::default()
        };
        let mut seen: FxHashMap<&str, usize> = FxHashMap::default();

        walk_decls(&func.body, &mut |decl| {
            if decl.is_array() {
                return;
            }
            if decl.name == RESULT_PORT {
                log::warn!(
                    "local '{}' in '{}' is kept in signal '{}', which drives the output port",
                    RESULT_PORT,
                    func.name,
                    INTERNAL_RESULT
                );
                return;
            }

            let count = seen.entry(decl.name.as_str()).or_insert(0);
            let ordinal = *count;
            *count += 1;

            let var = TrackedVar {
                original: decl.name.clone(),
                gen_name: build_gen_name(&decl.name, ordinal),
                vhdl_type: ctype_to_vhdl(decl.var_type),
                ordinal,
                shadows_param: func.is_param(&decl.name),
            };
            log::trace!("tracking '{}' as '{}'", var.original, var.gen_name);
            tracker.by_decl.insert(ptr::from_ref(decl), tracker.vars.len());
            tracker.vars.push(var);
        });

        tracker
    }

    pub fn vars(&self) -> &[TrackedVar] {
        &self.vars
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Bring the variable of `decl` into the innermost scope. Returns `None`
    /// for declarations that are not tracked (arrays, `result`).
    pub fn bind(&mut self, decl: &VarDecl) -> Option<&TrackedVar> {
        let index = *self.by_decl.get(&ptr::from_ref(decl))?;
        if self.scopes.is_empty() {
            self.push_scope();
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(decl.name.clone(), index);
        }
        self.vars.get(index)
    }

    /// The variable `name` currently refers to, innermost scope first.
    /// `None` means the name is a port, an array or a not-yet-declared local.
    pub fn resolve(&self, name: &str) -> Option<&TrackedVar> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .and_then(|&index| self.vars.get(index))
    }

    /// Signal written by `return` and by a local named `result`
    pub fn result_signal(&self) -> &'static str {
        if self.internal_result {
            INTERNAL_RESULT
        } else {
            RESULT_PORT
        }
    }

    /// Drop all per-function state
    pub fn clear(&mut self) {
        self.vars.clear();
        self.by_decl.clear();
        self.scopes.clear();
        self.internal_result = false;
    }
}
