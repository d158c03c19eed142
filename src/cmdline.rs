use crate::codegen::GeneratorOptions;
use argh::FromArgs;
use std::path::PathBuf;

#[derive(FromArgs, Debug)]
/// Translate a restricted C subset into synthesizable VHDL.
pub struct Opts {
    /// input C source file (stdin when omitted)
    #[argh(positional)]
    pub input: Option<PathBuf>,

    /// output file (stdout when omitted)
    #[argh(option, short = 'o')]
    pub output: Option<PathBuf>,

    /// repeat the IEEE library and use clauses before every entity
    #[argh(switch)]
    pub preamble_per_entity: bool,

    /// print the parsed syntax tree instead of VHDL
    #[argh(switch)]
    pub dump_ast: bool,

    /// logging level: off, error, warn, info, debug or trace
    #[argh(option, default = "log::LevelFilter::Warn")]
    pub log_level: log::LevelFilter,
}

impl Opts {
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            preamble_per_entity: self.preamble_per_entity,
        }
    }
}
