// cvhdl: C subset to VHDL translator

use std::process::ExitCode;

use cvhdl::cmdline::Opts;
use cvhdl::{diagnostics, driver};

fn main() -> ExitCode {
    let opts: Opts = argh::from_env();

    diagnostics::init_logging(opts.log_level);

    match driver::run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            diagnostics::report_error(&err);
            ExitCode::FAILURE
        }
    }
}
