use std::{path::PathBuf, sync::Arc};

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use multilog::{Builder, FileSink, LogSink, NullSink, Operand, Severity};

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Level {
    Info,
    Error,
    Fatal,
}

impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::Info => Severity::Info,
            Level::Error => Severity::Error,
            Level::Fatal => Severity::Fatal,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Style {
    Print,
    Line,
}

#[derive(Parser, Debug)]
#[command(version)]
#[command(about = "Write a message to a log file, stderr, stdout and the system log at once.", long_about = None)]
pub struct Args {
    #[arg(
        short,
        long,
        default_value = "multilog",
        help = "Name the logger reports itself as, also used as the syslog tag."
    )]
    pub name: String,

    #[arg(short, long, help = "Also write info messages to stdout.")]
    pub verbose: bool,

    #[arg(long, help = "Also write to the platform system log.")]
    pub syslog: bool,

    #[arg(short, long, value_name = "PATH", help = "Append messages to this file.")]
    pub file: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Level::Info)]
    pub severity: Level,

    #[arg(long, value_enum, default_value_t = Style::Print)]
    pub style: Style,

    #[arg(index = 1, required = true, value_name = "MESSAGE")]
    pub message: Vec<String>,
}

impl Args {
    fn primary_sink(&self) -> eyre::Result<Arc<dyn LogSink>> {
        match &self.file {
            Some(path) => Ok(Arc::new(FileSink::new(path)?)),
            None => Ok(Arc::new(NullSink::new())),
        }
    }

    pub fn run(self) -> eyre::Result<()> {
        let builder = Builder::new(&self.name, self.primary_sink()?)
            .verbose(self.verbose)
            .system_log(self.syslog);
        let logger = multilog::configure(builder);

        let filter = if self.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Off
        };
        multilog::init_log_bridge(filter)?;
        log::info!(target: "multilog", "configured logger {}", logger.name());

        let operands: Vec<&dyn Operand> = self.message.iter().map(|m| m as &dyn Operand).collect();

        match (Severity::from(self.severity), self.style) {
            (Severity::Info, Style::Print) => multilog::info(&operands),
            (Severity::Info, Style::Line) => multilog::info_line(&operands),
            (Severity::Error, Style::Print) => multilog::error(&operands),
            (Severity::Error, Style::Line) => multilog::error_line(&operands),
            (Severity::Fatal, Style::Print) => multilog::fatal(&operands),
            (Severity::Fatal, Style::Line) => multilog::fatal_line(&operands),
        }

        logger.flush();
        Ok(())
    }
}
