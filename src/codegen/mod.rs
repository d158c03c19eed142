//! VHDL code generation
//!
//! Every function becomes one entity and one architecture:
//! - [`entity`]: ports, signal and array declarations, call instances
//! - [`process`]: the clocked process holding the lowered body
//! - [`expr`]: operator and condition lowering
//! - [`tracker`]: process variables for scalar locals
//! - [`annotate`]: instance indices for calls
//! - [`types`]: C type to VHDL type mapping
//!
//! The generator trusts the parser's invariants (bounds, loop control) and
//! does not check them again.

pub mod annotate;
pub mod entity;
pub mod expr;
pub mod process;
pub mod tracker;
pub mod types;

pub use annotate::{annotate_func_calls, annotate_program};
pub use tracker::{build_gen_name, TrackedVar, VariableTracker};

use crate::parser::ast::{FunctionDecl, Program};
use entity::Signatures;
use process::ProcessWriter;
use std::borrow::Cow;
use std::io::{self, Write};

const HEADER: &str = "-- VHDL generated by cvhdl";

/// Generator configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Repeat the IEEE library and use clauses before every entity instead
    /// of once per program
    pub preamble_per_entity: bool,
}

fn write_preamble<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "library IEEE;")?;
    writeln!(out, "use IEEE.STD_LOGIC_1164.ALL;")?;
    writeln!(out, "use IEEE.NUMERIC_STD.ALL;")?;
    writeln!(out)
}

/// Write the VHDL for every function of `program`, in declaration order.
///
/// Calls that have not been annotated yet are annotated on a copy of their
/// function, so the output is the same whether or not
/// [`annotate_program`] ran first.
pub fn generate_vhdl<W: Write>(
    program: &Program,
    out: &mut W,
    options: &GeneratorOptions,
) -> io::Result<()> {
    let signatures: Signatures<'_> = program
        .functions
        .iter()
        .map(|f| (f.name.as_str(), f))
        .collect();

    writeln!(out, "{}", HEADER)?;
    writeln!(out)?;
    if !options.preamble_per_entity {
        write_preamble(out)?;
    }

    for func in &program.functions {
        let func: Cow<'_, FunctionDecl> = if annotate::needs_annotation(func) {
            let mut owned = func.clone();
            annotate_func_calls(&mut owned);
            Cow::Owned(owned)
        } else {
            Cow::Borrowed(func)
        };

        log::debug!("generating entity '{}'", func.name);
        if options.preamble_per_entity {
            write_preamble(out)?;
        }
        write_function(out, &func, &signatures)?;
    }

    Ok(())
}

/// Generate into a string
pub fn generate_vhdl_string(program: &Program, options: &GeneratorOptions) -> io::Result<String> {
    let mut buffer = Vec::new();
    generate_vhdl(program, &mut buffer, options)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn write_function<W: Write>(
    out: &mut W,
    func: &FunctionDecl,
    signatures: &Signatures<'_>,
) -> io::Result<()> {
    entity::write_entity(out, func)?;

    writeln!(out, "architecture behavioral of {} is", func.name)?;
    entity::write_declarations(out, func, signatures)?;
    writeln!(out, "begin")?;
    entity::write_result_driver(out, func)?;
    entity::write_instances(out, func, signatures)?;
    entity::write_array_notes(out, func)?;

    let tracker = VariableTracker::collect(func);
    ProcessWriter::new(out, tracker).write_process(func)?;

    writeln!(out, "end architecture;")?;
    writeln!(out)
}
