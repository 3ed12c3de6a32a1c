use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggerError {
    EmptyName,
    PlatformUnsupported,
    SystemLogUnavailable(String),
    SinkClosed,
    WorkerGone,
}

impl fmt::Display for LoggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use LoggerError::*;
        match self {
            EmptyName => write!(f, "null logger name"),
            PlatformUnsupported => write!(f, "system logging not implemented"),
            SystemLogUnavailable(reason) => write!(f, "system log unavailable: {reason}"),
            SinkClosed => write!(f, "sink already closed"),
            WorkerGone => write!(f, "logger worker is no longer running"),
        }
    }
}

impl std::error::Error for LoggerError {}
