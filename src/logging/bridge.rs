use eyre::Context;
use log::{Level, LevelFilter, Log};

use super::{registry::Registry, Callsite, Severity};

/// Routes records from the `log` facade into a [`Registry`].
///
/// `Level::Error` maps to [`Severity::Error`], every other level to
/// [`Severity::Info`]. The bridge never emits fatal messages.
pub struct LogBridge {
    registry: &'static Registry,
    filter: LevelFilter,
}

impl LogBridge {
    pub fn new(registry: &'static Registry, filter: LevelFilter) -> Self {
        Self { registry, filter }
    }

    pub fn init(self) -> eyre::Result<()> {
        log::set_max_level(self.filter);
        log::set_boxed_logger(Box::new(self)).context("Failed registering boxed logger")?;

        Ok(())
    }
}

fn severity(level: Level) -> Severity {
    match level {
        Level::Error => Severity::Error,
        Level::Warn | Level::Info | Level::Debug | Level::Trace => Severity::Info,
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.filter >= metadata.level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = record.args().to_string();
        let callsite = Callsite::new(
            record.file().unwrap_or(record.target()),
            record.line().unwrap_or(0),
        );

        self.registry
            .current()
            .output(severity(record.level()), &message, callsite);
    }

    fn flush(&self) {
        self.registry.current().flush()
    }
}

/// Installs a bridge from the `log` macros to the process default registry.
pub fn init_log_bridge(filter: LevelFilter) -> eyre::Result<()> {
    LogBridge::new(super::default_registry(), filter).init()
}
