//! Cross platform logging that fans each message out to several sinks at once:
//! a caller supplied primary sink, the process error stream, optionally standard
//! output, and optionally the platform system log.
//!
//! ```no_run
//! use std::sync::Arc;
//! use multilog::{Builder, Emit, FileSink};
//!
//! # fn main() -> eyre::Result<()> {
//! let file = Arc::new(FileSink::new("app.log")?);
//! let logger = multilog::configure(Builder::new("app", file).verbose(true));
//!
//! logger.info(&[&"listening on port ", &8080]);
//! multilog::error_formatted(format_args!("retrying in {}s", 5));
//! # Ok(())
//! # }
//! ```

pub mod logging;
mod macros;

pub use logging::{
    configure, default_registry, error, error_formatted, error_line, fatal, fatal_formatted,
    fatal_line, info, info_formatted, info_line, init_log_bridge, Builder, Callsite,
    CombinedSink, Config, Emit, FileSink, LogSink, Logger, LoggerError, MemorySink, NullSink,
    Operand, QueuedLogger, Registry, Severity, StderrSink, StdoutSink, Value, WriterSink,
};
