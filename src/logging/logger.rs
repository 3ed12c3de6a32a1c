use std::sync::{Arc, Mutex};

use eyre::Context;

use super::{
    formatters::DefaultFormatter,
    sinks::{StderrSink, StdoutSink},
    syslog::{NativeSystemLog, SystemLog},
    terminate::{ProcessExit, Terminate},
    Callsite, CombinedSink, Emit, LogFormatter, LogSink, Record, Severity,
};

const UNCONFIGURED_PREFIX: &str = "LOGGING BEFORE CONFIGURATION: ";
pub(super) const DEFAULT_DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.6f";

#[derive(Debug, Clone)]
pub struct Config {
    pub datetime_format: String,
    pub with_callsite: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            with_callsite: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// A logger fanning every message out to a fixed set of sinks per severity.
///
/// Writes are serialised by a per-logger guard, so lines from concurrent callers
/// never interleave.
pub struct Logger {
    name: String,
    info: CombinedSink,
    error: CombinedSink,
    initialized: bool,
    closers: Vec<Arc<dyn LogSink>>,
    formatter: Box<dyn LogFormatter>,
    terminator: Arc<dyn Terminate>,
    guard: Mutex<()>,
}

impl Logger {
    /// The stand-in used before any configuration happened.
    ///
    /// Every severity goes to `fallback` only, with each line flagged as written
    /// before configuration.
    pub fn unconfigured(fallback: Arc<dyn LogSink>, terminator: Arc<dyn Terminate>) -> Self {
        let sinks = CombinedSink::new(vec![fallback]);
        let formatter = DefaultFormatter::new(Config::new()).with_prefix(UNCONFIGURED_PREFIX);

        Self {
            name: String::new(),
            info: sinks.clone(),
            error: sinks,
            initialized: false,
            closers: Vec::new(),
            formatter: Box::new(formatter),
            terminator,
            guard: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Formats and writes one line. Write failures are swallowed.
    pub fn output(&self, severity: Severity, message: &str, callsite: Callsite) {
        let _guard = self.guard.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut line = self.formatter.format(&Record {
            severity,
            message,
            callsite,
        });
        line.push('\n');

        let _ = self.sink_for(severity).write(&line);
    }

    pub fn flush(&self) {
        self.info.flush();
        self.error.flush();
    }

    /// Closes every owned closable sink. Close failures are ignored.
    pub fn close(&self) {
        let _guard = self.guard.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        for closer in &self.closers {
            closer.flush();
            let _ = closer.close();
        }
    }

    fn sink_for(&self, severity: Severity) -> &CombinedSink {
        match severity {
            Severity::Info => &self.info,
            Severity::Error | Severity::Fatal => &self.error,
        }
    }
}

impl Emit for Logger {
    fn emit(&self, severity: Severity, message: String, callsite: Callsite) {
        self.output(severity, &message, callsite);
    }

    fn shutdown(&self) {
        self.close();
        self.terminator.terminate(1);
    }
}

pub struct Builder {
    name: String,
    verbose: bool,
    system_log: bool,
    primary: Arc<dyn LogSink>,
    stdout: Arc<dyn LogSink>,
    stderr: Arc<dyn LogSink>,
    system_log_backend: Arc<dyn SystemLog>,
    terminator: Arc<dyn Terminate>,
    config: Config,
}

impl Builder {
    pub fn new(name: impl Into<String>, primary: Arc<dyn LogSink>) -> Self {
        Self {
            name: name.into(),
            verbose: false,
            system_log: false,
            primary,
            stdout: Arc::new(StdoutSink::new()),
            stderr: Arc::new(StderrSink::new()),
            system_log_backend: Arc::new(NativeSystemLog),
            terminator: Arc::new(ProcessExit),
            config: Config::new(),
        }
    }

    /// Also send info messages to standard output.
    pub fn verbose(self, verbose: bool) -> Self {
        Self { verbose, ..self }
    }

    pub fn system_log(self, system_log: bool) -> Self {
        Self { system_log, ..self }
    }

    pub fn with_stdout_sink(self, stdout: Arc<dyn LogSink>) -> Self {
        Self { stdout, ..self }
    }

    pub fn with_stderr_sink(self, stderr: Arc<dyn LogSink>) -> Self {
        Self { stderr, ..self }
    }

    pub fn with_system_log_backend(self, system_log_backend: Arc<dyn SystemLog>) -> Self {
        Self {
            system_log_backend,
            ..self
        }
    }

    pub fn with_terminator(self, terminator: Arc<dyn Terminate>) -> Self {
        Self { terminator, ..self }
    }

    pub fn with_config(self, config: Config) -> Self {
        Self { config, ..self }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stderr_sink(&self) -> Arc<dyn LogSink> {
        self.stderr.clone()
    }

    pub fn terminator(&self) -> Arc<dyn Terminate> {
        self.terminator.clone()
    }

    /// Builds the logger. Only fails when the system log was requested and could
    /// not be set up.
    pub fn build(&self) -> eyre::Result<Logger> {
        self.assemble(self.system_log)
    }

    /// Same configuration with the system log turned off.
    pub(super) fn build_without_system_log(&self) -> Logger {
        self.assemble(false)
            .unwrap_or_else(|_| Logger::unconfigured(self.stderr.clone(), self.terminator.clone()))
    }

    fn assemble(&self, system_log: bool) -> eyre::Result<Logger> {
        let mut info: Vec<Arc<dyn LogSink>> = vec![self.primary.clone()];
        let mut error: Vec<Arc<dyn LogSink>> = vec![self.primary.clone(), self.stderr.clone()];
        let mut closers: Vec<Arc<dyn LogSink>> = Vec::new();

        if self.verbose {
            info.push(self.stdout.clone());
        }

        if system_log {
            let sys = self
                .system_log_backend
                .setup(&self.name)
                .with_context(|| format!("Failed setting up system log for {:?}", self.name))?;

            info.push(sys.info.clone());
            error.push(sys.error.clone());

            for sink in [sys.info, sys.error] {
                if sink.is_closable() {
                    closers.push(sink);
                }
            }
        }

        if self.primary.is_closable() {
            closers.push(self.primary.clone());
        }

        Ok(Logger {
            name: self.name.clone(),
            info: CombinedSink::new(info),
            error: CombinedSink::new(error),
            initialized: true,
            closers,
            formatter: Box::new(DefaultFormatter::new(self.config.clone())),
            terminator: self.terminator.clone(),
            guard: Mutex::new(()),
        })
    }
}
