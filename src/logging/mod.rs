mod bridge;
mod combined;
mod error;
mod formatters;
mod logger;
mod operands;
mod queue;
mod registry;
mod sinks;
mod syslog;
mod terminate;

use std::{fmt, panic::Location, path::Path};

pub use bridge::{init_log_bridge, LogBridge};
pub use combined::CombinedSink;
pub use error::LoggerError;
pub use formatters::DefaultFormatter;
pub use logger::{Builder, Config, Logger};
pub use operands::{concat, concat_line, formatted, Operand, Value};
pub use queue::QueuedLogger;
pub use registry::{
    configure, default_registry, error, error_formatted, error_line, fatal, fatal_formatted,
    fatal_line, info, info_formatted, info_line, Registry,
};
pub use sinks::{FileSink, MemorySink, NullSink, StderrSink, StdoutSink, WriterSink};
pub use syslog::{NativeSystemLog, SystemLog, SystemLogSinks};
pub use terminate::{ProcessExit, RecordingTerminator, Terminate};

/// The three fixed severities a message can be logged with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Error,
    Fatal,
}

impl Severity {
    /// Label written at the very start of every line.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO : ",
            Severity::Error => "ERROR: ",
            Severity::Fatal => "FATAL: ",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "Info"),
            Severity::Error => write!(f, "Error"),
            Severity::Fatal => write!(f, "Fatal"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "error" => Ok(Severity::Error),
            "fatal" => Ok(Severity::Fatal),
            other => Err(eyre::eyre!("unknown severity {:?}", other)),
        }
    }
}

/// Source position a log line is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Callsite<'a> {
    pub file: &'a str,
    pub line: u32,
}

impl<'a> Callsite<'a> {
    pub fn new(file: &'a str, line: u32) -> Self {
        Self { file, line }
    }

    /// Only the file name, without its directories.
    pub fn short_file(&self) -> &'a str {
        Path::new(self.file)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(self.file)
    }
}

impl From<&'static Location<'static>> for Callsite<'static> {
    fn from(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line())
    }
}

/// A message that is ready to be formatted.
pub struct Record<'a> {
    pub severity: Severity,
    pub message: &'a str,
    pub callsite: Callsite<'a>,
}

pub trait LogFormatter: Sync + Send {
    /// Renders a record without the trailing line terminator.
    fn format(&self, record: &Record) -> String;
}

/// Anything that durably accepts already formatted text.
///
/// Sinks that own a releasable resource report it through [`LogSink::is_closable`];
/// loggers record those and close them when a fatal message is emitted.
pub trait LogSink: Sync + Send {
    fn write(&self, text: &str) -> eyre::Result<()>;

    fn flush(&self) {}

    fn is_closable(&self) -> bool {
        false
    }

    fn close(&self) -> eyre::Result<()> {
        Ok(())
    }
}

/// The nine severity methods shared by every logger flavour.
///
/// Implementors only provide [`Emit::emit`] and [`Emit::shutdown`]. Fatal methods
/// always emit first, then shut down, so resources are never released before the
/// fatal line reached every sink.
pub trait Emit {
    fn emit(&self, severity: Severity, message: String, callsite: Callsite);

    /// Closes owned resources and terminates the process.
    fn shutdown(&self);

    #[track_caller]
    fn info(&self, args: &[&dyn Operand]) {
        self.emit(Severity::Info, concat(args), Location::caller().into());
    }

    #[track_caller]
    fn info_line(&self, args: &[&dyn Operand]) {
        self.emit(Severity::Info, concat_line(args), Location::caller().into());
    }

    #[track_caller]
    fn info_formatted(&self, args: fmt::Arguments) {
        self.emit(Severity::Info, formatted(args), Location::caller().into());
    }

    #[track_caller]
    fn error(&self, args: &[&dyn Operand]) {
        self.emit(Severity::Error, concat(args), Location::caller().into());
    }

    #[track_caller]
    fn error_line(&self, args: &[&dyn Operand]) {
        self.emit(Severity::Error, concat_line(args), Location::caller().into());
    }

    #[track_caller]
    fn error_formatted(&self, args: fmt::Arguments) {
        self.emit(Severity::Error, formatted(args), Location::caller().into());
    }

    #[track_caller]
    fn fatal(&self, args: &[&dyn Operand]) {
        self.emit(Severity::Fatal, concat(args), Location::caller().into());
        self.shutdown();
    }

    #[track_caller]
    fn fatal_line(&self, args: &[&dyn Operand]) {
        self.emit(Severity::Fatal, concat_line(args), Location::caller().into());
        self.shutdown();
    }

    #[track_caller]
    fn fatal_formatted(&self, args: fmt::Arguments) {
        self.emit(Severity::Fatal, formatted(args), Location::caller().into());
        self.shutdown();
    }
}
