//! Driver for the translator: source text in, VHDL out.
use crate::cmdline::Opts;
use crate::codegen::{annotate_program, generate_vhdl, GeneratorOptions};
use crate::parser::ast::Program;
use crate::parser::{ParseError, Parser};
use std::fmt;
use std::fs;
use std::io::{self, BufWriter, Read, Write};

/// Anything that stops a translation
#[derive(Debug)]
pub enum TranslateError {
    Parse(ParseError),
    Io(io::Error),
}

impl TranslateError {
    /// Source line of a parse error
    pub fn line(&self) -> Option<usize> {
        match self {
            TranslateError::Parse(e) => Some(e.line()),
            TranslateError::Io(_) => None,
        }
    }
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::Parse(e) => write!(f, "{}", e),
            TranslateError::Io(e) => write!(f, "Error: {}", e),
        }
    }
}

impl std::error::Error for TranslateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TranslateError::Parse(e) => Some(e),
            TranslateError::Io(e) => Some(e),
        }
    }
}

impl From<ParseError> for TranslateError {
    fn from(err: ParseError) -> Self {
        TranslateError::Parse(err)
    }
}

impl From<io::Error> for TranslateError {
    fn from(err: io::Error) -> Self {
        TranslateError::Io(err)
    }
}

/// Parse `source` and annotate its calls
pub fn parse_source(source: &str) -> Result<Program, ParseError> {
    let mut program = Parser::new(source)?.parse_program()?;
    annotate_program(&mut program);
    log::debug!("parsed {} function(s)", program.functions.len());
    Ok(program)
}

/// Translate `source` into VHDL text
pub fn translate(source: &str, options: &GeneratorOptions) -> Result<String, TranslateError> {
    let mut buffer = Vec::new();
    translate_to(source, &mut buffer, options)?;
    String::from_utf8(buffer)
        .map_err(|e| TranslateError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Translate `source`, writing the VHDL to `out`. Nothing is written when
/// parsing fails.
pub fn translate_to<W: Write>(
    source: &str,
    out: &mut W,
    options: &GeneratorOptions,
) -> Result<(), TranslateError> {
    let program = parse_source(source)?;
    generate_vhdl(&program, out, options)?;
    Ok(())
}

fn read_input(opts: &Opts) -> io::Result<String> {
    match &opts.input {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn open_output(opts: &Opts) -> io::Result<Box<dyn Write>> {
    Ok(match &opts.output {
        Some(path) => Box::new(BufWriter::new(fs::File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// Run the translator from the command line.
pub fn run(opts: &Opts) -> Result<(), TranslateError> {
    let source = read_input(opts)?;
    let program = parse_source(&source)?;

    // the output file is only created once the input is known to be valid
    let mut out = open_output(opts)?;
    if opts.dump_ast {
        write!(out, "{}", program)?;
    } else {
        generate_vhdl(&program, &mut out, &opts.generator_options())?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_reports_parse_errors() {
        let err = translate("int f() { break; }", &GeneratorOptions::default()).unwrap_err();
        assert_eq!(err.line(), Some(1));
        assert_eq!(err.to_string(), "Error (line 1): 'break' not within a loop");
    }

    #[test]
    fn test_translate_to_writes_nothing_on_error() {
        let mut out = Vec::new();
        let result = translate_to("int f() { int a[2]; a[5] = 1; }", &mut out, &GeneratorOptions::default());
        assert!(matches!(
            result,
            Err(TranslateError::Parse(ParseError::ArrayIndexOutOfBounds { .. }))
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_parse_source_annotates() {
        let program = parse_source("int g() { return 1; } int f() { return g(); }").unwrap();
        assert!(!crate::codegen::annotate::needs_annotation(&program.functions[1]));
    }
}
