//! Diagnostic output: `Error (line N): <message>` for fatal errors and
//! `Warning: <message>` for recoverable anomalies, on stderr.
//!
//! Warnings travel through the `log` facade; the binary installs an
//! `env_logger` whose format prints them with the `Warning:` label. Labels are
//! colored only when stderr is a terminal.

use crate::driver::TranslateError;
use crossterm::style::{Color, Stylize};
use log::{Level, LevelFilter};
use std::io::{self, IsTerminal, Write};

pub struct Palette {
    pub error: Color,
    pub warning: Color,
    pub note: Color,
}

pub const DEFAULT_PALETTE: Palette = Palette {
    error: Color::Rgb {
        r: 243,
        g: 139,
        b: 168,
    },
    warning: Color::Rgb {
        r: 250,
        g: 179,
        b: 135,
    },
    note: Color::Rgb {
        r: 108,
        g: 112,
        b: 134,
    },
};

fn stderr_is_terminal() -> bool {
    io::stderr().is_terminal()
}

/// `text`, bold and colored when `styled`
pub fn label(text: &str, color: Color, styled: bool) -> String {
    if styled {
        text.with(color).bold().to_string()
    } else {
        text.to_string()
    }
}

/// One-line rendering of a fatal error
pub fn format_error(err: &TranslateError, styled: bool) -> String {
    let error = label("Error", DEFAULT_PALETTE.error, styled);
    match err {
        TranslateError::Parse(e) => format!("{} (line {}): {}", error, e.line(), e.message()),
        TranslateError::Io(e) => format!("{}: {}", error, e),
    }
}

/// Print a fatal error on stderr
pub fn report_error(err: &TranslateError) {
    let line = format_error(err, stderr_is_terminal());
    // nothing sensible is left to do if stderr itself fails
    let _ = writeln!(io::stderr(), "{}", line);
}

fn level_label(level: Level, styled: bool) -> String {
    match level {
        Level::Error => label("Error", DEFAULT_PALETTE.error, styled),
        Level::Warn => label("Warning", DEFAULT_PALETTE.warning, styled),
        Level::Info => label("Info", DEFAULT_PALETTE.note, styled),
        Level::Debug => label("Debug", DEFAULT_PALETTE.note, styled),
        Level::Trace => label("Trace", DEFAULT_PALETTE.note, styled),
    }
}

/// Install the stderr logger used by the binary
pub fn init_logging(level: LevelFilter) {
    let styled = stderr_is_terminal();
    env_logger::Builder::new()
        .format_timestamp(None)
        .filter_level(level)
        .target(env_logger::Target::Stderr)
        .format(move |buf, record| {
            writeln!(buf, "{}: {}", level_label(record.level(), styled), record.args())
        })
        .init();
}
