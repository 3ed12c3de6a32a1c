use std::fmt::Write;

use super::{
    logger::{Config, DEFAULT_DATETIME_FORMAT},
    LogFormatter, Record,
};

pub struct DefaultFormatter {
    config: Config,
    prefix: Option<String>,
}

impl DefaultFormatter {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            prefix: None,
        }
    }

    /// Text placed in front of the severity label on every line.
    pub fn with_prefix(self, prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..self
        }
    }

    /// Falls back to the default layout when `datetime_format` has an invalid
    /// specifier.
    fn timestamp(&self) -> String {
        let now = chrono::Local::now();
        let mut out = String::new();

        if write!(out, "{}", now.format(&self.config.datetime_format)).is_err() {
            out.clear();
            let _ = write!(out, "{}", now.format(DEFAULT_DATETIME_FORMAT));
        }

        out
    }
}

impl LogFormatter for DefaultFormatter {
    fn format(&self, record: &Record) -> String {
        let prefix = self.prefix.as_deref().unwrap_or("");

        if self.config.with_callsite {
            format!(
                "{}{}{} {}:{}: {}",
                prefix,
                record.severity.label(),
                self.timestamp(),
                record.callsite.short_file(),
                record.callsite.line,
                record.message,
            )
        } else {
            format!(
                "{}{}{} {}",
                prefix,
                record.severity.label(),
                self.timestamp(),
                record.message,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{Callsite, Severity};

    fn record(message: &str) -> Record<'_> {
        Record {
            severity: Severity::Error,
            message,
            callsite: Callsite::new("src/bin/server.rs", 42),
        }
    }

    #[test]
    fn formats_label_timestamp_callsite_and_message() {
        let formatter = DefaultFormatter::new(Config {
            datetime_format: "TS".to_string(),
            with_callsite: true,
        });

        assert_eq!(
            formatter.format(&record("disk full")),
            "ERROR: TS server.rs:42: disk full"
        );
    }

    #[test]
    fn callsite_can_be_omitted() {
        let formatter = DefaultFormatter::new(Config {
            datetime_format: "TS".to_string(),
            with_callsite: false,
        });

        assert_eq!(formatter.format(&record("boom")), "ERROR: TS boom");
    }

    #[test]
    fn prefix_comes_first() {
        let formatter = DefaultFormatter::new(Config {
            datetime_format: "TS".to_string(),
            with_callsite: false,
        })
        .with_prefix("EARLY: ");

        assert_eq!(formatter.format(&record("x")), "EARLY: ERROR: TS x");
    }

    #[test]
    fn invalid_datetime_format_falls_back_to_default() {
        let formatter = DefaultFormatter::new(Config {
            datetime_format: "%Y %Q".to_string(),
            with_callsite: false,
        });
        let line = formatter.format(&record("m"));

        let stamp = &line["ERROR: ".len()..line.len() - " m".len()];
        assert_eq!(stamp.len(), "2006/01/02 15:04:05.000000".len());
        assert_eq!(&stamp[4..5], "/");
    }

    #[test]
    fn default_timestamp_has_microseconds() {
        let formatter = DefaultFormatter::new(Config::new());
        let line = formatter.format(&record("m"));

        // "ERROR: YYYY/MM/DD HH:MM:SS.ffffff server.rs:42: m"
        let stamp = &line["ERROR: ".len()..line.find(" server.rs").unwrap()];
        assert_eq!(stamp.len(), "2006/01/02 15:04:05.000000".len());
        assert_eq!(&stamp[4..5], "/");
        assert_eq!(&stamp[19..20], ".");
    }
}
