//! Entity, architecture declarations and call instantiations

use super::annotate::collect_calls;
use super::expr::{call_result_signal, lower_expr, SignalNames};
use super::tracker::{declares_result_local, INTERNAL_RESULT, RESULT_PORT};
use super::types::{bit_width, ctype_to_vhdl, literal_bits, zero_bits};
use crate::parser::ast::*;
use rustc_hash::{FxHashMap, FxHashSet};
use std::io::{self, Write};

/// Return and parameter types of the functions of one program, used to type
/// call result signals and literal call arguments
pub type Signatures<'a> = FxHashMap<&'a str, &'a FunctionDecl>;

pub fn write_entity<W: Write>(out: &mut W, func: &FunctionDecl) -> io::Result<()> {
    writeln!(out, "-- Function: {}", func.name)?;
    writeln!(out, "entity {} is", func.name)?;
    writeln!(out, "  port (")?;
    writeln!(out, "    clk : in std_logic;")?;
    writeln!(out, "    reset : in std_logic;")?;
    for param in &func.params {
        writeln!(
            out,
            "    {} : in {};",
            param.name,
            ctype_to_vhdl(param.param_type)
        )?;
    }
    writeln!(
        out,
        "    {} : out {}",
        RESULT_PORT,
        ctype_to_vhdl(func.return_type)
    )?;
    writeln!(out, "  );")?;
    writeln!(out, "end entity;")?;
    writeln!(out)
}

/// Signal, array type and call result declarations of the architecture
pub fn write_declarations<W: Write>(
    out: &mut W,
    func: &FunctionDecl,
    signatures: &Signatures<'_>,
) -> io::Result<()> {
    let mut declared: FxHashSet<&str> = func.params.iter().map(|p| p.name.as_str()).collect();
    declared.insert(RESULT_PORT);

    let mut decls = Vec::new();
    walk_decls(&func.body, &mut |decl| decls.push(decl));

    for decl in decls {
        if !declared.insert(decl.name.as_str()) {
            continue;
        }
        match decl.array_size {
            Some(size) => write_array(out, decl, size)?,
            None => writeln!(
                out,
                "  signal {} : {};",
                decl.name,
                ctype_to_vhdl(decl.var_type)
            )?,
        }
    }

    if declares_result_local(func) {
        writeln!(
            out,
            "  signal {} : {};",
            INTERNAL_RESULT,
            ctype_to_vhdl(func.return_type)
        )?;
    }

    for call in collect_calls(func) {
        let ty = callee_return_type(call, signatures);
        writeln!(
            out,
            "  signal {} : {};",
            call_result_signal(call),
            ctype_to_vhdl(ty)
        )?;
    }

    Ok(())
}

fn write_array<W: Write>(out: &mut W, decl: &VarDecl, size: usize) -> io::Result<()> {
    let elem = ctype_to_vhdl(decl.var_type);
    writeln!(
        out,
        "  type {}_type is array (0 to {}) of {};",
        decl.name,
        size as i64 - 1,
        elem
    )?;

    let Some(Initializer::List(elements)) = &decl.init else {
        return writeln!(out, "  signal {} : {}_type;", decl.name, decl.name);
    };

    if elements.len() > size {
        log::warn!(
            "array '{}' has {} initializers for {} elements; extra values dropped",
            decl.name,
            elements.len(),
            size
        );
    }

    let mut values: Vec<String> = elements
        .iter()
        .take(size)
        .map(|element| format!("\"{}\"", element_bits(decl, element)))
        .collect();
    if values.len() < size {
        values.push("others => (others => '0')".to_string());
    }

    writeln!(out, "  -- Array initialization")?;
    writeln!(
        out,
        "  constant {}_init : {}_type := ({});",
        decl.name,
        decl.name,
        values.join(", ")
    )?;
    writeln!(
        out,
        "  signal {} : {}_type := {}_init;",
        decl.name, decl.name, decl.name
    )
}

fn element_bits(decl: &VarDecl, element: &InitElement) -> String {
    let bits = match element {
        InitElement::Number(text) => literal_bits(decl.var_type, text),
        InitElement::Char(c) => literal_bits(decl.var_type, &u32::from(*c).to_string()),
        InitElement::Ident(name) => {
            log::warn!(
                "identifier '{}' in initializer of array '{}' is not a constant; using zero",
                name,
                decl.name
            );
            None
        }
    };
    bits.unwrap_or_else(|| zero_bits(decl.var_type))
}

/// Concurrent assignment of the output port from the signal that replaces a
/// local named `result`
pub fn write_result_driver<W: Write>(out: &mut W, func: &FunctionDecl) -> io::Result<()> {
    if declares_result_local(func) {
        writeln!(out, "  {} <= {};", RESULT_PORT, INTERNAL_RESULT)?;
    }
    Ok(())
}

/// One comment per distinct array, stating that it is not variableized
pub fn write_array_notes<W: Write>(out: &mut W, func: &FunctionDecl) -> io::Result<()> {
    let mut seen = FxHashSet::default();
    let mut arrays = Vec::new();
    walk_decls(&func.body, &mut |decl| {
        if decl.is_array() && seen.insert(decl.name.as_str()) {
            arrays.push(decl.name.as_str());
        }
    });
    for name in arrays {
        writeln!(out, "  -- note: array {} kept as signal (not variableized)", name)?;
    }
    Ok(())
}

/// Concurrent entity instantiation for every annotated call.
///
/// Instances are wired unconditionally: a call reached only on some paths
/// still gets a permanent instance, only the use of its result is
/// conditional.
pub fn write_instances<W: Write>(
    out: &mut W,
    func: &FunctionDecl,
    signatures: &Signatures<'_>,
) -> io::Result<()> {
    for call in collect_calls(func) {
        let Some(index) = call.instance else {
            log::warn!("call to '{}' has no instance index; not instantiated", call.name);
            continue;
        };

        let callee = signatures.get(call.name.as_str());
        if callee.is_none() {
            log::warn!(
                "'{}' calls '{}', which is not defined in this program",
                func.name,
                call.name
            );
        }

        let mut ports = vec!["clk".to_string(), "reset".to_string()];
        for (position, arg) in call.args.iter().enumerate() {
            let width = callee
                .and_then(|f| f.params.get(position))
                .map_or(32, |p| bit_width(p.param_type));
            ports.push(lower_argument(arg, width));
        }
        ports.push(call_result_signal(call));

        writeln!(
            out,
            "  u_{}_{}: entity work.{} port map( {} );",
            call.name,
            index,
            call.name,
            ports.join(", ")
        )?;
    }
    Ok(())
}

/// Literal arguments are converted to a vector of the parameter width
fn lower_argument(arg: &Expr, width: u32) -> String {
    match arg {
        Expr::Number(text) if arg.integer_literal().is_some() => {
            format!("std_logic_vector(to_unsigned({}, {}))", text, width)
        }
        _ => match arg.integer_literal() {
            Some(value) if value < 0 => {
                format!("std_logic_vector(to_signed({}, {}))", value, width)
            }
            _ => lower_expr(arg, &SignalNames),
        },
    }
}

fn callee_return_type(call: &Call, signatures: &Signatures<'_>) -> CType {
    signatures
        .get(call.name.as_str())
        .map_or(CType::Int, |f| f.return_type)
}
