use std::sync::Arc;

use super::LogSink;

/// Fans one write out to every member sink, in insertion order.
///
/// Every member is attempted even if an earlier one fails; the first error is the
/// one reported back.
#[derive(Clone, Default)]
pub struct CombinedSink {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl CombinedSink {
    pub fn new(sinks: Vec<Arc<dyn LogSink>>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl LogSink for CombinedSink {
    fn write(&self, text: &str) -> eyre::Result<()> {
        let mut first_err = None;

        for sink in &self.sinks {
            if let Err(err) = sink.write(text) {
                first_err.get_or_insert(err);
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn flush(&self) {
        for sink in &self.sinks {
            sink.flush();
        }
    }
}
