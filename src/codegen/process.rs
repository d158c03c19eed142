//! Lowering of a function body into one clocked process.
//!
//! Tracked scalars are read into process variables at the start of the
//! clocked branch, updated with `:=` while the statements run in textual
//! order, and written back to their signals at the end. Arrays, ports and
//! untracked names always use signal assignment.

use super::expr::{lower_condition, lower_expr, lower_index, Names};
use super::tracker::VariableTracker;
use crate::parser::ast::*;
use std::io::{self, Write};

/// Base indentation of statements inside the clocked branch
const BODY_INDENT: usize = 3;

pub struct ProcessWriter<'a, W: Write> {
    out: &'a mut W,
    tracker: VariableTracker,
    /// Increment of each enclosing loop (`None` for `while`), innermost last
    loops: Vec<Option<&'a Assignment>>,
    depth: usize,
}

impl<'a, W: Write> ProcessWriter<'a, W> {
    pub fn new(out: &'a mut W, tracker: VariableTracker) -> Self {
        Self {
            out,
            tracker,
            loops: Vec::new(),
            depth: BODY_INDENT,
        }
    }

    /// Emit the whole process for `func`
    pub fn write_process(mut self, func: &'a FunctionDecl) -> io::Result<()> {
        writeln!(self.out, "  process(clk, reset)")?;
        for var in self.tracker.vars() {
            writeln!(self.out, "    variable {} : {};", var.gen_name, var.vhdl_type)?;
        }
        writeln!(self.out, "  begin")?;
        writeln!(self.out, "    if reset = '1' then")?;
        writeln!(self.out, "      -- Reset logic")?;
        writeln!(self.out, "    elsif rising_edge(clk) then")?;

        for var in self.tracker.vars() {
            writeln!(self.out, "      {} := {};", var.gen_name, var.original)?;
        }

        self.tracker.push_scope();
        self.body(&func.body)?;
        self.tracker.pop_scope();

        // the outermost declaration of a name is written last and wins
        for var in self.tracker.vars().iter().rev() {
            if var.has_signal() {
                writeln!(self.out, "      {} <= {};", var.original, var.gen_name)?;
            }
        }

        writeln!(self.out, "    end if;")?;
        writeln!(self.out, "  end process;")?;

        self.tracker.clear();
        Ok(())
    }

    fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{:indent$}{}", "", text, indent = self.depth * 2)
    }

    fn body(&mut self, body: &'a [Stmt]) -> io::Result<()> {
        for stmt in body {
            self.stmt(stmt)?;
        }
        Ok(())
    }

    /// A nested body with its own declaration scope
    fn scoped_body(&mut self, body: &'a [Stmt]) -> io::Result<()> {
        self.depth += 1;
        self.tracker.push_scope();
        let result = self.body(body);
        self.tracker.pop_scope();
        self.depth -= 1;
        result
    }

    fn stmt(&mut self, stmt: &'a Stmt) -> io::Result<()> {
        match stmt {
            Stmt::VarDecl(decl) => self.var_decl(decl),
            Stmt::Assign(assign) => self.assignment(assign),
            Stmt::Return { value, .. } => match value {
                Some(value) => {
                    let value = lower_expr(value, &self.tracker);
                    let target = self.tracker.result_signal();
                    self.line(&format!("{} <= {};", target, value))
                }
                None => Ok(()),
            },
            Stmt::If(stmt) => self.if_statement(stmt),
            Stmt::While {
                condition, body, ..
            } => {
                let condition = lower_condition(condition, &self.tracker);
                self.line(&format!("while {} loop", condition))?;
                self.loops.push(None);
                self.scoped_body(body)?;
                self.loops.pop();
                self.line("end loop;")
            }
            Stmt::For(stmt) => self.for_statement(stmt),
            Stmt::Break { .. } => self.line("exit;"),
            Stmt::Continue { .. } => {
                // a desugared `for` must still advance before the next iteration
                if let Some(Some(increment)) = self.loops.last().copied() {
                    self.assignment(increment)?;
                }
                self.line("next;")
            }
        }
    }

    fn var_decl(&mut self, decl: &'a VarDecl) -> io::Result<()> {
        // arrays live in the architecture; their initializer is a constant
        if decl.is_array() {
            return Ok(());
        }

        let init = match &decl.init {
            Some(Initializer::Expr(expr)) => Some(lower_expr(expr, &self.tracker)),
            _ => None,
        };

        let target = match self.tracker.bind(decl).map(|var| var.gen_name.clone()) {
            Some(gen_name) => format!("{} :=", gen_name),
            None => format!("{} <=", self.tracker.vhdl_name(&decl.name)),
        };

        match init {
            Some(init) => self.line(&format!("{} {};", target, init)),
            None => Ok(()),
        }
    }

    fn assignment(&mut self, assign: &Assignment) -> io::Result<()> {
        let value = lower_expr(&assign.value, &self.tracker);
        let target = match &assign.target {
            LValue::Var(name) => match self.tracker.resolve(name) {
                Some(var) => format!("{} :=", var.gen_name),
                None => format!("{} <=", self.tracker.vhdl_name(name)),
            },
            LValue::Index(access) => format!("{} <=", lower_index(access, &self.tracker)),
        };
        self.line(&format!("{} {};", target, value))
    }

    fn if_statement(&mut self, stmt: &'a IfStatement) -> io::Result<()> {
        let condition = lower_condition(&stmt.condition, &self.tracker);
        self.line(&format!("if {} then", condition))?;
        self.scoped_body(&stmt.then_body)?;

        for clause in &stmt.else_ifs {
            let condition = lower_condition(&clause.condition, &self.tracker);
            self.line(&format!("elsif {} then", condition))?;
            self.scoped_body(&clause.body)?;
        }

        if let Some(body) = &stmt.else_body {
            self.line("else")?;
            self.scoped_body(body)?;
        }

        self.line("end if;")
    }

    /// `for` becomes its initializer followed by a `while` loop whose body
    /// ends with the increment
    fn for_statement(&mut self, stmt: &'a ForStatement) -> io::Result<()> {
        self.tracker.push_scope();

        match &stmt.init {
            Some(ForInit::Decl(decl)) => self.var_decl(decl)?,
            Some(ForInit::Assign(assign)) => self.assignment(assign)?,
            None => {}
        }

        let condition = lower_condition(&stmt.condition, &self.tracker);
        self.line(&format!("while {} loop", condition))?;

        self.loops.push(stmt.increment.as_ref());
        self.scoped_body(&stmt.body)?;
        self.loops.pop();

        if let Some(increment) = &stmt.increment {
            self.depth += 1;
            self.assignment(increment)?;
            self.depth -= 1;
        }
        self.line("end loop;")?;

        self.tracker.pop_scope();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn process_for(source: &str) -> String {
        let program = Parser::new(source).unwrap().parse_program().unwrap();
        let func = &program.functions[0];
        let mut out = Vec::new();
        ProcessWriter::new(&mut out, VariableTracker::collect(func))
            .write_process(func)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_process_frame() {
        let text = process_for("int add(int a, int b) { return a + b; }");
        let expected = "  process(clk, reset)
  begin
    if reset = '1' then
      -- Reset logic
    elsif rising_edge(clk) then
      result <= a + b;
    end if;
  end process;
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_variableized_sequence() {
        let text = process_for("int f(int a) { int x = a; x = x + 1; return x; }");

        assert!(text.contains("    variable x_v : std_logic_vector(31 downto 0);\n"));
        assert!(text.contains("      x_v := x;\n"));
        assert!(text.contains("      x_v := a;\n"));
        assert!(text.contains("      x_v := x_v + 1;\n"));
        assert!(text.contains("      result <= x_v;\n"));
        assert!(text.contains("      x <= x_v;\n"));

        // copy-in, body, copy-out
        let copy_in = text.find("x_v := x;").unwrap();
        let update = text.find("x_v := x_v + 1;").unwrap();
        let copy_out = text.find("x <= x_v;").unwrap();
        assert!(copy_in < update && update < copy_out);
    }

    #[test]
    fn test_shadowed_declarations() {
        let text = process_for(
            "int f(int n) { int x = 1; if (n) { int x = 2; x = x + n; } return x; }",
        );

        assert!(text.contains("      x_v := 1;\n"));
        assert!(text.contains("        x_v1 := 2;\n"));
        assert!(text.contains("        x_v1 := x_v1 + n;\n"));
        assert!(text.contains("      result <= x_v;\n"));

        // reverse copy-out: the outer declaration is written last
        let inner = text.find("x <= x_v1;").unwrap();
        let outer = text.find("x <= x_v;").unwrap();
        assert!(inner < outer);
    }

    #[test]
    fn test_for_loop_desugaring() {
        let text = process_for(
            "int f(int n) { int sum = 0; for (int i = 0; i < n; i++) { sum = sum + i; } return sum; }",
        );
        let expected_loop = "      i_v := 0;
      while unsigned(i_v) < unsigned(n) loop
        sum_v := sum_v + i_v;
        i_v := i_v + 1;
      end loop;
";
        assert!(text.contains(expected_loop), "{}", text);
    }

    #[test]
    fn test_continue_runs_for_increment() {
        let text = process_for(
            "int f(int n) { int i = 0; for (i = 0; i < n; i++) { if (i == 2) { continue; } } return i; }",
        );
        let expected = "          i_v := i_v + 1;
          next;
";
        assert!(text.contains(expected), "{}", text);
    }

    #[test]
    fn test_while_break_and_arrays() {
        let text = process_for(
            "int f(int n) { int a[4]; int k = 0; while (k < 4) { a[k] = n; if (k == n) { break; } k = k + 1; } return a[0]; }",
        );

        assert!(text.contains("        a(to_integer(unsigned(k_v))) <= n;\n"));
        assert!(text.contains("          exit;\n"));
        assert!(text.contains("      result <= a(0);\n"));
        assert!(!text.contains("variable a"));
    }

    #[test]
    fn test_param_shadow_is_not_copied_out() {
        let text = process_for("int f(int n) { int n = 3; return n; }");
        assert!(text.contains("      n_v := n;\n"));
        assert!(text.contains("      result <= n_v;\n"));
        assert!(!text.contains("n <= n_v;"));
    }

    #[test]
    fn test_local_result_never_reads_port() {
        let text = process_for(
            "int f(int n) { int result = n; result = result + 1; if (result) { return result; } return 0; }",
        );
        assert!(text.contains("      internal_result <= n;\n"));
        assert!(text.contains("      internal_result <= internal_result + 1;\n"));
        assert!(text.contains("      if unsigned(internal_result) /= 0 then\n"));
        assert!(text.contains("        internal_result <= internal_result;\n"));
        assert!(text.contains("      internal_result <= 0;\n"));
        assert!(!text.contains("result <= result"));
        assert!(!text.contains("variable"));
    }
}
