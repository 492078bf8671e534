//! Console logging for the `pomprops` executable.
//!
//! Messages go to stdout, either as `level: message` lines or, with `--json`, as one json object
//! per line.

use atty::Stream;
use colored::{ColoredString, Colorize};
use fern::{Dispatch, FormatCallback, Output};
use log::{Level, LevelFilter, Record, SetLoggerError};
use std::fmt;
use std::path::Path;

/// The log level and output flags of the command line
#[derive(Debug, clap::Args, Clone)]
#[clap(next_help_heading = "Log Level")]
pub struct LoggingOpts {
    /// Only display errors
    #[clap(short, long, group = "log-level", global = true, display_order = 1)]
    error: bool,

    /// Display warnings and errors
    #[clap(short, long, group = "log-level", global = true, display_order = 2)]
    warn: bool,

    /// Display which files were written. This is the default.
    #[clap(short, long, group = "log-level", global = true, display_order = 3)]
    info: bool,

    /// Also display the folders that were checked
    #[clap(short, long, group = "log-level", global = true, display_order = 4)]
    debug: bool,

    /// Display everything
    #[clap(long, group = "log-level", global = true, display_order = 5)]
    trace: bool,

    /// Prefix messages with the source file and line that logged them
    #[clap(long, global = true, help_heading = "Logging Settings")]
    pub show_source: bool,

    /// Write each message as a json object
    #[clap(long, global = true, help_heading = "Logging Settings")]
    pub json: bool,

    /// Whether messages are colored
    #[clap(long, value_enum, default_value_t = ConsoleMode::Auto)]
    #[clap(global = true, help_heading = "Logging Settings")]
    pub console: ConsoleMode,
}

#[derive(Debug, Copy, Clone, clap::ValueEnum, Eq, PartialEq)]
pub enum ConsoleMode {
    /// Colored when stdout is a terminal
    Auto,
    Rich,
    Plain,
}

impl ConsoleMode {
    /// Whether output should be colored
    pub fn colored(self) -> bool {
        match self {
            ConsoleMode::Auto => atty::is(Stream::Stdout),
            ConsoleMode::Rich => true,
            ConsoleMode::Plain => false,
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonLine<'a> {
    level: &'a str,
    target: &'a str,
    message: String,
}

impl LoggingOpts {
    pub fn log_level_filter(&self) -> LevelFilter {
        [
            (self.error, LevelFilter::Error),
            (self.warn, LevelFilter::Warn),
            (self.info, LevelFilter::Info),
            (self.debug, LevelFilter::Debug),
            (self.trace, LevelFilter::Trace),
        ]
        .into_iter()
        .find_map(|(set, level)| set.then_some(level))
        .unwrap_or(LevelFilter::Info)
    }

    /// Installs the logger described by these options as the global logger
    pub fn init_root_logger(&self) -> Result<(), SetLoggerError> {
        self.create_logger().apply()
    }

    pub fn create_logger(&self) -> Dispatch {
        if self.json || !self.console.colored() {
            colored::control::set_override(false);
        }
        let dispatch = Dispatch::new()
            .level(self.log_level_filter())
            .chain(Output::stdout("\n"));
        if self.json {
            dispatch.format(|out, message, record| {
                out.finish(format_args!("{}", json_line(message, record)))
            })
        } else {
            let show_source = self.show_source;
            dispatch.format(
                move |out: FormatCallback, message: &fmt::Arguments, record: &Record| {
                    out.finish(format_args!("{}", text_line(message, record, show_source)))
                },
            )
        }
    }
}

fn json_line(message: &fmt::Arguments, record: &Record) -> String {
    let level = record.level().as_str().to_lowercase();
    let line = JsonLine {
        level: &level,
        target: record.target(),
        message: message.to_string(),
    };
    serde_json::to_string(&line).unwrap_or(line.message)
}

fn text_line(message: &fmt::Arguments, record: &Record, show_source: bool) -> String {
    let level = level_label(record.level());
    let message = match record.level() {
        Level::Error => message.to_string().red(),
        Level::Warn => message.to_string().yellow(),
        Level::Trace => message.to_string().bright_blue(),
        Level::Info | Level::Debug => message.to_string().normal(),
    };
    if show_source {
        format!("{} {}: {}", source_of(record).italic(), level, message)
    } else {
        format!("{}: {}", level, message)
    }
}

fn level_label(level: Level) -> ColoredString {
    let label = level.as_str().to_lowercase();
    match level {
        Level::Error => label.red(),
        Level::Warn => label.yellow(),
        Level::Info => label.green(),
        Level::Debug => label.blue(),
        Level::Trace => label.bright_black(),
    }
}

/// `(crate :: path/in/src.rs:line)` of where a record was logged
fn source_of(record: &Record) -> String {
    let (module, file) = match record.module_path().zip(record.file()) {
        Some(found) => found,
        None => return "(<unknown source>)".to_string(),
    };
    let crate_name = module.split("::").next().unwrap_or(module);
    let in_src: std::path::PathBuf = Path::new(file)
        .iter()
        .skip_while(|part| *part != "src")
        .skip(1)
        .collect();
    let line = record.line().map(|l| format!(":{}", l)).unwrap_or_default();
    format!("({} :: {}{})", crate_name, in_src.display(), line)
}
