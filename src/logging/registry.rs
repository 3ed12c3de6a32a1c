use std::{
    fmt,
    sync::{Arc, LazyLock, Mutex, MutexGuard},
};

use super::{
    logger::{Builder, Logger},
    sinks::StderrSink,
    terminate::{ProcessExit, Terminate},
    Callsite, Emit, LogSink, Operand, Severity,
};

static DEFAULT: LazyLock<Registry> = LazyLock::new(Registry::new);

/// The process wide registry backing the free logging functions.
pub fn default_registry() -> &'static Registry {
    &DEFAULT
}

/// Configures a logger against the process wide registry.
pub fn configure(builder: Builder) -> Arc<Logger> {
    DEFAULT.configure(builder)
}

/// Holds the logger free-function calls resolve to.
///
/// The slot starts out with an unconfigured placeholder and is replaced at most
/// once, by the first successful [`Registry::configure`]. Later configurations
/// still return working loggers but leave the slot alone.
pub struct Registry {
    slot: Mutex<Arc<Logger>>,
    fallback: Arc<dyn LogSink>,
    terminator: Arc<dyn Terminate>,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_fallback(Arc::new(StderrSink::new()), Arc::new(ProcessExit))
    }

    /// Registry whose placeholder writes to `fallback` and ends the process via
    /// `terminator`.
    pub fn with_fallback(fallback: Arc<dyn LogSink>, terminator: Arc<dyn Terminate>) -> Self {
        let placeholder = Arc::new(Logger::unconfigured(fallback.clone(), terminator.clone()));

        Self {
            slot: Mutex::new(placeholder),
            fallback,
            terminator,
        }
    }

    fn slot(&self) -> MutexGuard<'_, Arc<Logger>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Builds a new, independent logger and installs it if the slot still holds
    /// the placeholder.
    ///
    /// A system log that was requested but cannot be set up is not recoverable:
    /// the error is reported on the builder's stderr sink and the process is
    /// terminated with status 1.
    pub fn configure(&self, builder: Builder) -> Arc<Logger> {
        let logger = match builder.build() {
            Ok(logger) => logger,
            Err(err) => {
                let report = format!("failed configuring logger {:?}: {:#}\n", builder.name(), err);
                let _ = builder.stderr_sink().write(&report);
                builder.terminator().terminate(1);
                // Only reached when termination is stubbed out.
                builder.build_without_system_log()
            }
        };
        let logger = Arc::new(logger);

        let mut slot = self.slot();
        if !slot.is_initialized() {
            *slot = logger.clone();
        }

        logger
    }

    /// The logger currently installed.
    pub fn current(&self) -> Arc<Logger> {
        self.slot().clone()
    }

    pub fn is_configured(&self) -> bool {
        self.slot().is_initialized()
    }

    /// Puts a fresh placeholder back into the slot.
    pub fn reset(&self) {
        *self.slot() = Arc::new(Logger::unconfigured(
            self.fallback.clone(),
            self.terminator.clone(),
        ));
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Emit for Registry {
    fn emit(&self, severity: Severity, message: String, callsite: Callsite) {
        self.current().emit(severity, message, callsite);
    }

    fn shutdown(&self) {
        self.current().shutdown();
    }

    // Fatal calls resolve the slot once, so the logger that received the fatal
    // line is the one that closes its resources and terminates.
    #[track_caller]
    fn fatal(&self, args: &[&dyn Operand]) {
        self.current().fatal(args)
    }

    #[track_caller]
    fn fatal_line(&self, args: &[&dyn Operand]) {
        self.current().fatal_line(args)
    }

    #[track_caller]
    fn fatal_formatted(&self, args: fmt::Arguments) {
        self.current().fatal_formatted(args)
    }
}

#[track_caller]
pub fn info(args: &[&dyn Operand]) {
    DEFAULT.info(args)
}

#[track_caller]
pub fn info_line(args: &[&dyn Operand]) {
    DEFAULT.info_line(args)
}

#[track_caller]
pub fn info_formatted(args: fmt::Arguments) {
    DEFAULT.info_formatted(args)
}

#[track_caller]
pub fn error(args: &[&dyn Operand]) {
    DEFAULT.error(args)
}

#[track_caller]
pub fn error_line(args: &[&dyn Operand]) {
    DEFAULT.error_line(args)
}

#[track_caller]
pub fn error_formatted(args: fmt::Arguments) {
    DEFAULT.error_formatted(args)
}

#[track_caller]
pub fn fatal(args: &[&dyn Operand]) {
    DEFAULT.fatal(args)
}

#[track_caller]
pub fn fatal_line(args: &[&dyn Operand]) {
    DEFAULT.fatal_line(args)
}

#[track_caller]
pub fn fatal_formatted(args: fmt::Arguments) {
    DEFAULT.fatal_formatted(args)
}
